//! nestsim Headless Simulation Harness
//!
//! Runs the hierarchy without a renderer and checks its invariants.
//!
//! Usage:
//!   cargo run -p nestsim-simtest
//!   cargo run -p nestsim-simtest -- --verbose --ticks 5000 --seed 7
//!   cargo run -p nestsim-simtest -- --config sim.json --dump

use clap::Parser;
use nestsim_core::presentation::{health_color, HoverState};
use nestsim_core::stats::HierarchyStats;
use nestsim_core::{SimConfig, Simulation, SimulationEngine, Snapshot};
use nestsim_logic::rules::{update_cell, update_organism, update_species};
use nestsim_logic::{Entity, LevelKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

// ── Command line ────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "nestsim-simtest")]
#[command(about = "Run the hierarchy headless and check its invariants")]
struct Options {
    /// Print per-check details
    #[arg(short, long)]
    verbose: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    dump: bool,

    /// Ticks for the long-run checks
    #[arg(short, long, default_value = "2000")]
    ticks: u64,

    /// Seed used when the config doesn't set one
    #[arg(long, default_value = "42")]
    seed: u64,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::parse();

    let mut config = match &options.config {
        Some(path) => match SimConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => SimConfig::default(),
    };
    if config.seed.is_none() {
        config.seed = Some(options.seed);
    }

    println!("=== nestsim Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Initial hierarchy
    results.extend(validate_initialization(&config, options.verbose));

    // 2. Single-rule scenarios
    results.extend(validate_rule_scenarios(options.verbose));

    // 3. Long-run invariants
    results.extend(validate_long_run(&config, options.ticks, options.verbose));

    // 4. Extinction edge cases
    results.extend(validate_extinction(options.verbose));

    // 5. Engine and presentation surface
    results.extend(validate_engine(&config, options.verbose));

    if options.dump {
        dump_snapshot(&config, options.ticks);
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn seeded_rng(config: &SimConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed.unwrap_or(0))
}

// ── 1. Initialization ───────────────────────────────────────────────────

fn validate_initialization(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Initialization ---");
    let mut results = Vec::new();

    let sim = Simulation::new(config.clone(), &mut seeded_rng(config));
    let counts: Vec<usize> = sim.levels().iter().map(|l| l.len()).collect();
    let expected = vec![
        config.cell_count,
        config.organism_count,
        config.species_count,
        1,
    ];
    results.push(TestResult {
        name: "init_level_counts".into(),
        passed: counts == expected,
        detail: format!("{:?}", counts),
    });

    let in_range = sim
        .levels()
        .iter()
        .flat_map(|l| l.entities.iter())
        .all(|e| (0.0..=1.0).contains(&e.health()));
    results.push(TestResult {
        name: "init_health_in_range".into(),
        passed: in_range,
        detail: "all initial health values in [0, 1]".into(),
    });

    let again = Simulation::new(config.clone(), &mut seeded_rng(config));
    results.push(TestResult {
        name: "init_zero_ticks_reproducible".into(),
        passed: sim.snapshot() == again.snapshot(),
        detail: "same seed yields identical initial snapshot".into(),
    });

    if verbose {
        println!("  {}", HierarchyStats::collect(&sim).summary());
    }

    results
}

// ── 2. Rule scenarios ───────────────────────────────────────────────────

fn validate_rule_scenarios(_verbose: bool) -> Vec<TestResult> {
    println!("--- Rule Scenarios ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0);

    let (h, _) = update_cell(0.5, 0.6, 0, &mut rng);
    results.push(TestResult {
        name: "cell_fed_tick_zero".into(),
        passed: (h - 0.51).abs() < 1e-6,
        detail: format!("0.5 → {:.4}", h),
    });

    let h = update_organism(0.4, 0.7);
    results.push(TestResult {
        name: "organism_healthy_cells".into(),
        passed: (h - 0.42).abs() < 1e-6,
        detail: format!("0.4 → {:.4}", h),
    });

    let (h, p) = update_species(0.6, 3, 0.6);
    results.push(TestResult {
        name: "species_growth".into(),
        passed: (h - 0.61).abs() < 1e-6 && p == 4,
        detail: format!("health {:.4}, population {}", h, p),
    });

    results
}

// ── 3. Long run ─────────────────────────────────────────────────────────

fn validate_long_run(config: &SimConfig, ticks: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Long Run ({} ticks) ---", ticks);
    let mut results = Vec::new();

    let mut rng = seeded_rng(config);
    let mut sim = Simulation::new(config.clone(), &mut rng);

    let mut health_violations = 0;
    let mut zero_population = 0;
    let mut over_cap = 0;
    let mut biodiversity_mismatch = 0;
    let mut extinctions = 0;
    let mut spawns = 0;

    for _ in 0..ticks {
        let report = sim.tick(&mut rng);
        extinctions += report.extinct;
        spawns += usize::from(report.spawned);

        health_violations += sim
            .levels()
            .iter()
            .flat_map(|l| l.entities.iter())
            .filter(|e| !(0.0..=1.0).contains(&e.health()))
            .count();

        let species = sim.level(LevelKind::Species);
        zero_population += species
            .entities
            .iter()
            .filter(|e| e.population() == Some(0))
            .count();
        if species.len() > config.max_species {
            over_cap += 1;
        }

        let eco = sim.level(LevelKind::Ecosystem).entities[0];
        if eco.biodiversity() != Some(report.species_before_filter as u32) {
            biodiversity_mismatch += 1;
        }

        if verbose && report.tick % 500 == 0 {
            println!("  {}", HierarchyStats::collect(&sim).summary());
        }
    }

    results.push(TestResult {
        name: "run_health_in_range".into(),
        passed: health_violations == 0,
        detail: format!("{} out-of-range health values", health_violations),
    });
    results.push(TestResult {
        name: "run_no_zero_population_species".into(),
        passed: zero_population == 0,
        detail: format!(
            "{} extinctions, {} spawns, {} zero-population survivors",
            extinctions, spawns, zero_population
        ),
    });
    results.push(TestResult {
        name: "run_species_cap".into(),
        passed: over_cap == 0,
        detail: format!("{} ticks above cap", over_cap),
    });
    results.push(TestResult {
        name: "run_biodiversity_pre_filter".into(),
        passed: biodiversity_mismatch == 0,
        detail: format!("{} mismatched ticks", biodiversity_mismatch),
    });
    results.push(TestResult {
        name: "run_tick_counter".into(),
        passed: sim.tick_count() == ticks,
        detail: format!("counter at {}", sim.tick_count()),
    });

    results
}

// ── 4. Extinction ───────────────────────────────────────────────────────

fn validate_extinction(_verbose: bool) -> Vec<TestResult> {
    println!("--- Extinction ---");
    let mut results = Vec::new();
    let config = SimConfig {
        spawn_probability: 0.0,
        ..SimConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(1);

    let mut snapshot = Simulation::new(config.clone(), &mut rng).snapshot();
    snapshot.levels[LevelKind::Species.index()].entities = vec![Entity::Species {
        health: 0.4,
        population: 1,
    }];
    match Simulation::from_snapshot(config.clone(), snapshot.clone()) {
        Ok(mut sim) => {
            let report = sim.tick(&mut rng);
            results.push(TestResult {
                name: "extinct_species_removed".into(),
                passed: report.extinct == 1 && sim.level(LevelKind::Species).is_empty(),
                detail: format!("{} removed", report.extinct),
            });
        }
        Err(e) => results.push(TestResult {
            name: "extinct_species_removed".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    snapshot.levels[LevelKind::Species.index()].entities.clear();
    match Simulation::from_snapshot(config, snapshot) {
        Ok(mut sim) => {
            sim.tick(&mut rng);
            let eco = sim.level(LevelKind::Ecosystem).entities[0];
            results.push(TestResult {
                name: "empty_species_ecosystem".into(),
                passed: eco.biodiversity() == Some(0) && eco.health().is_finite(),
                detail: format!(
                    "health {:.4}, biodiversity {:?}",
                    eco.health(),
                    eco.biodiversity()
                ),
            });
        }
        Err(e) => results.push(TestResult {
            name: "empty_species_ecosystem".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    results
}

// ── 5. Engine ───────────────────────────────────────────────────────────

fn validate_engine(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Engine ---");
    let mut results = Vec::new();

    let mut engine = match SimulationEngine::new(config.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(TestResult {
                name: "engine_config".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let mut ticks = 0;
    for _ in 0..60 {
        ticks += engine.update(1.0 / 60.0);
    }
    let expected = (1000 / config.tick_interval_ms.max(1)) as u32;
    results.push(TestResult {
        name: "engine_one_second".into(),
        passed: ticks + 1 >= expected && ticks <= expected,
        detail: format!("{} ticks in 1s (expected ~{})", ticks, expected),
    });

    engine.toggle_pause();
    let frozen = engine.snapshot();
    for _ in 0..60 {
        engine.update(1.0 / 60.0);
    }
    results.push(TestResult {
        name: "engine_pause_freezes".into(),
        passed: engine.snapshot() == frozen,
        detail: format!("paused at tick {}", frozen.tick),
    });

    let mut hover = HoverState::new();
    let cell = frozen
        .level(LevelKind::Cell)
        .and_then(|level| level.entities.first().copied());
    if let Some(cell) = cell {
        hover.enter(LevelKind::Cell, 0, cell);
    }
    let tooltip = hover
        .current()
        .map(|h| h.tooltip_lines())
        .unwrap_or_default();
    results.push(TestResult {
        name: "hover_tooltip".into(),
        passed: cell.is_none() || tooltip.first().map(String::as_str) == Some("Cell 1"),
        detail: tooltip.join(", "),
    });

    if verbose {
        let colors: Vec<_> = frozen
            .levels
            .iter()
            .map(|l| health_color(l.kind, l.mean_health()))
            .collect();
        println!("  mean-health colours: {:?}", colors);
    }

    results
}

// ── Snapshot dump ───────────────────────────────────────────────────────

fn dump_snapshot(config: &SimConfig, ticks: u64) {
    let mut rng = seeded_rng(config);
    let mut sim = Simulation::new(config.clone(), &mut rng);
    sim.run(ticks, &mut rng);
    let snapshot: Snapshot = sim.snapshot();
    match snapshot.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}
