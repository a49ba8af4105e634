//! Long-run invariant checks over the full hierarchy.
//!
//! Every test uses a seeded generator so failures reproduce.

use nestsim_core::{SimConfig, Simulation, SimulationEngine};
use nestsim_logic::{Entity, LevelKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

fn all_entities(sim: &Simulation) -> impl Iterator<Item = &Entity> {
    sim.levels().iter().flat_map(|level| level.entities.iter())
}

// ── Invariants ─────────────────────────────────────────────────────────

#[test]
fn test_health_stays_in_unit_range() {
    for seed in [1, 2, 3] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sim = Simulation::new(SimConfig::default(), &mut rng);
        for _ in 0..2000 {
            sim.tick(&mut rng);
            for entity in all_entities(&sim) {
                let h = entity.health();
                assert!((0.0..=1.0).contains(&h), "health {} out of range", h);
                if let Some(r) = entity.resource() {
                    assert!((0.0..=1.0).contains(&r), "resource {} out of range", r);
                }
            }
        }
    }
}

#[test]
fn test_no_zero_population_species_survive_a_tick() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut sim = Simulation::new(SimConfig::default(), &mut rng);
    for _ in 0..2000 {
        sim.tick(&mut rng);
        for species in &sim.level(LevelKind::Species).entities {
            assert!(species.population().unwrap() > 0);
        }
    }
}

#[test]
fn test_species_count_capped() {
    let config = SimConfig {
        spawn_probability: 0.5,
        ..SimConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(21);
    let mut sim = Simulation::new(config, &mut rng);
    for _ in 0..3000 {
        sim.tick(&mut rng);
        assert!(sim.level(LevelKind::Species).len() <= 7);
    }
}

#[test]
fn test_biodiversity_tracks_pre_filter_count() {
    let mut rng = StdRng::seed_from_u64(31);
    let mut sim = Simulation::new(SimConfig::default(), &mut rng);
    for _ in 0..2000 {
        let report = sim.tick(&mut rng);
        let eco = sim.level(LevelKind::Ecosystem).entities[0];
        assert_eq!(eco.biodiversity(), Some(report.species_before_filter as u32));

        let after = sim.level(LevelKind::Species).len();
        let spawned = usize::from(report.spawned);
        assert_eq!(after, report.species_before_filter - report.extinct + spawned);
    }
}

#[test]
fn test_fixed_level_counts_never_change() {
    let mut rng = StdRng::seed_from_u64(41);
    let mut sim = Simulation::new(SimConfig::default(), &mut rng);
    sim.run(1000, &mut rng);
    assert_eq!(sim.level(LevelKind::Cell).len(), 100);
    assert_eq!(sim.level(LevelKind::Organism).len(), 20);
    assert_eq!(sim.level(LevelKind::Ecosystem).len(), 1);
}

#[test]
fn test_mass_extinction_keeps_ticking() {
    // Species start unfit with one member each, so all die on the first tick
    let config = SimConfig {
        species_initial_population: 1,
        spawn_probability: 0.0,
        ..SimConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(51);
    let mut sim = Simulation::new(config, &mut rng);
    let unfit: Vec<_> = sim
        .level(LevelKind::Species)
        .entities
        .iter()
        .map(|e| e.health() <= 0.5)
        .collect();

    sim.tick(&mut rng);
    let survivors = unfit.iter().filter(|u| !**u).count();
    assert_eq!(sim.level(LevelKind::Species).len(), survivors);

    let mut sim = Simulation::from_snapshot(
        SimConfig {
            spawn_probability: 0.0,
            ..SimConfig::default()
        },
        {
            let mut snapshot = sim.snapshot();
            snapshot.levels[LevelKind::Species.index()].entities.clear();
            snapshot
        },
    )
    .unwrap();
    for _ in 0..100 {
        sim.tick(&mut rng);
        let eco = sim.level(LevelKind::Ecosystem).entities[0];
        assert_eq!(eco.biodiversity(), Some(0));
        assert!(eco.health().is_finite());
    }
    // Smoothing toward an empty level's zero aggregate
    assert!(sim.level(LevelKind::Ecosystem).entities[0].health() < 0.01);
}

#[test]
fn test_engine_drives_simulation_in_real_time() {
    let mut engine = SimulationEngine::new(SimConfig::seeded(61)).unwrap();
    // 10 seconds at 60 FPS with 100 ms ticks
    let mut ticks = 0;
    for _ in 0..600 {
        ticks += engine.update(1.0 / 60.0);
    }
    assert!((99..=100).contains(&ticks), "ran {} ticks", ticks);
    assert_eq!(engine.simulation().tick_count(), ticks as u64);

    engine.toggle_pause();
    for _ in 0..600 {
        engine.update(1.0 / 60.0);
    }
    assert_eq!(engine.simulation().tick_count(), ticks as u64);
}
