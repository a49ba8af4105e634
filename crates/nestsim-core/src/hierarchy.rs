//! The four-level hierarchy and its fixed-step tick.
//!
//! Each tick recomputes every level bottom-up, feeding each level the mean
//! health of the freshly updated level beneath it, then applies the species
//! extinction filter and the occasional speciation event. Replacement entity
//! vectors are built in full before any level is swapped, so a reader never
//! observes a half-updated hierarchy.

use nestsim_logic::{apply_rule, mean_health, Entity, LevelKind, RuleInput};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// One tier of the hierarchy and the entities currently in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub kind: LevelKind,
    /// Insertion order, replaced wholesale each tick
    pub entities: Vec<Entity>,
}

impl Level {
    pub fn new(kind: LevelKind, entities: Vec<Entity>) -> Self {
        Self { kind, entities }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Mean entity health, 0 for an empty level
    pub fn mean_health(&self) -> f32 {
        mean_health(&self.entities)
    }
}

/// Owned copy of the hierarchy at a given tick, for consumers that must not
/// touch the live simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub levels: Vec<Level>,
}

impl Snapshot {
    /// `None` when a hand-built snapshot is missing the level
    pub fn level(&self, kind: LevelKind) -> Option<&Level> {
        self.levels.get(kind.index())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        check_levels(&snapshot.levels)?;
        Ok(snapshot)
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Counter value after the tick
    pub tick: u64,
    /// Species present after the species rule, before extinctions were removed
    pub species_before_filter: usize,
    /// Species removed for reaching zero population
    pub extinct: usize,
    pub spawned: bool,
}

/// The simulation state: a tick counter and the four levels it exclusively owns.
#[derive(Debug, Clone)]
pub struct Simulation {
    tick: u64,
    levels: Vec<Level>,
    config: SimConfig,
}

impl Simulation {
    /// Build the initial hierarchy with randomized health (and cell resource).
    pub fn new(config: SimConfig, rng: &mut impl Rng) -> Self {
        let cells = (0..config.cell_count)
            .map(|_| Entity::random_cell(&mut *rng))
            .collect();
        let organisms = (0..config.organism_count)
            .map(|_| Entity::random_organism(&mut *rng))
            .collect();
        let species = (0..config.species_count)
            .map(|_| Entity::random_species(&mut *rng, config.species_initial_population))
            .collect();
        let ecosystem = vec![Entity::Ecosystem {
            health: config.ecosystem_initial_health,
            biodiversity: config.ecosystem_initial_biodiversity,
        }];

        log::info!(
            "Created hierarchy: {} cells, {} organisms, {} species, 1 ecosystem",
            config.cell_count,
            config.organism_count,
            config.species_count
        );

        Self {
            tick: 0,
            levels: vec![
                Level::new(LevelKind::Cell, cells),
                Level::new(LevelKind::Organism, organisms),
                Level::new(LevelKind::Species, species),
                Level::new(LevelKind::Ecosystem, ecosystem),
            ],
            config,
        }
    }

    /// Resume from a previously taken snapshot.
    pub fn from_snapshot(config: SimConfig, snapshot: Snapshot) -> Result<Self, SnapshotError> {
        check_levels(&snapshot.levels)?;
        Ok(Self {
            tick: snapshot.tick,
            levels: snapshot.levels,
            config,
        })
    }

    /// Advance the hierarchy by exactly one step.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickReport {
        // Rules see the counter as it was when the step began
        let phase = self.tick;
        self.tick += 1;

        let cells = update_level(
            &self.levels[LevelKind::Cell.index()].entities,
            RuleInput::new(0.0, phase),
            rng,
        );
        let organisms = update_level(
            &self.levels[LevelKind::Organism.index()].entities,
            RuleInput::new(mean_health(&cells), phase),
            rng,
        );
        let species = update_level(
            &self.levels[LevelKind::Species.index()].entities,
            RuleInput::new(mean_health(&organisms), phase),
            rng,
        );

        // Ecosystem reads the species list before extinctions are removed
        let species_before_filter = species.len();
        let ecosystem = update_level(
            &self.levels[LevelKind::Ecosystem.index()].entities,
            RuleInput::new(mean_health(&species), phase).with_species_count(species_before_filter),
            rng,
        );

        let mut species: Vec<Entity> = species.into_iter().filter(|e| !e.is_extinct()).collect();
        let extinct = species_before_filter - species.len();
        if extinct > 0 {
            log::debug!("Tick {}: {} species went extinct", self.tick, extinct);
        }

        let roll: f64 = rng.gen();
        let spawned = roll < self.config.spawn_probability && species.len() < self.config.max_species;
        if spawned {
            species.push(Entity::Species {
                health: self.config.spawn_health,
                population: self.config.spawn_population,
            });
            log::info!("Tick {}: new species emerged ({} total)", self.tick, species.len());
        }

        self.levels[LevelKind::Cell.index()].entities = cells;
        self.levels[LevelKind::Organism.index()].entities = organisms;
        self.levels[LevelKind::Species.index()].entities = species;
        self.levels[LevelKind::Ecosystem.index()].entities = ecosystem;

        TickReport {
            tick: self.tick,
            species_before_filter,
            extinct,
            spawned,
        }
    }

    /// Run `n` ticks back to back.
    pub fn run(&mut self, n: u64, rng: &mut impl Rng) {
        for _ in 0..n {
            self.tick(rng);
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Levels in hierarchy order (Cell first)
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, kind: LevelKind) -> &Level {
        &self.levels[kind.index()]
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            levels: self.levels.clone(),
        }
    }
}

fn update_level<R: Rng>(entities: &[Entity], input: RuleInput, rng: &mut R) -> Vec<Entity> {
    entities
        .iter()
        .map(|entity| apply_rule(entity, &input, &mut *rng))
        .collect()
}

/// Levels must be exactly Cell, Organism, Species, Ecosystem with matching entities.
fn check_levels(levels: &[Level]) -> Result<(), SnapshotError> {
    if levels.len() != LevelKind::ALL.len() {
        return Err(SnapshotError::LevelCount(levels.len()));
    }
    for (level, expected) in levels.iter().zip(LevelKind::ALL) {
        if level.kind != expected {
            return Err(SnapshotError::LevelOrder {
                expected,
                found: level.kind,
            });
        }
        if let Some(index) = level.entities.iter().position(|e| e.kind() != expected) {
            return Err(SnapshotError::MisplacedEntity {
                level: expected,
                index,
            });
        }
        for (index, entity) in level.entities.iter().enumerate() {
            if let Some(reason) = entity_fault(entity) {
                return Err(SnapshotError::InvalidEntity {
                    level: expected,
                    index,
                    reason,
                });
            }
        }
    }
    Ok(())
}

fn entity_fault(entity: &Entity) -> Option<&'static str> {
    let unit = 0.0..=1.0;
    if !unit.contains(&entity.health()) {
        return Some("health outside 0..=1");
    }
    if entity.resource().is_some_and(|r| !unit.contains(&r)) {
        return Some("resource outside 0..=1");
    }
    if entity.population() == Some(0) {
        return Some("species with zero population");
    }
    None
}

/// Errors from rebuilding a hierarchy out of a snapshot
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    LevelCount(usize),
    LevelOrder { expected: LevelKind, found: LevelKind },
    MisplacedEntity { level: LevelKind, index: usize },
    InvalidEntity {
        level: LevelKind,
        index: usize,
        reason: &'static str,
    },
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Json(e)
    }
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::Json(e) => write!(f, "Snapshot serialization error: {}", e),
            SnapshotError::LevelCount(n) => write!(f, "expected 4 levels, found {}", n),
            SnapshotError::LevelOrder { expected, found } => {
                write!(f, "level order mismatch: expected {}, found {}", expected, found)
            }
            SnapshotError::MisplacedEntity { level, index } => {
                write!(f, "entity {} in {} level belongs to another level", index, level)
            }
            SnapshotError::InvalidEntity {
                level,
                index,
                reason,
            } => write!(f, "entity {} in {} level is invalid: {}", index, level, reason),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn snapshot_with(
        cells: Vec<Entity>,
        organisms: Vec<Entity>,
        species: Vec<Entity>,
        ecosystem: Entity,
    ) -> Snapshot {
        Snapshot {
            tick: 0,
            levels: vec![
                Level::new(LevelKind::Cell, cells),
                Level::new(LevelKind::Organism, organisms),
                Level::new(LevelKind::Species, species),
                Level::new(LevelKind::Ecosystem, vec![ecosystem]),
            ],
        }
    }

    fn no_spawn() -> SimConfig {
        SimConfig {
            spawn_probability: 0.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_initial_counts() {
        let sim = Simulation::new(SimConfig::default(), &mut rng());
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.level(LevelKind::Cell).len(), 100);
        assert_eq!(sim.level(LevelKind::Organism).len(), 20);
        assert_eq!(sim.level(LevelKind::Species).len(), 5);
        assert_eq!(sim.level(LevelKind::Ecosystem).len(), 1);

        for species in &sim.level(LevelKind::Species).entities {
            assert_eq!(species.population(), Some(10));
        }
        let eco = sim.level(LevelKind::Ecosystem).entities[0];
        assert_eq!(eco, Entity::Ecosystem { health: 0.5, biodiversity: 5 });
    }

    #[test]
    fn test_levels_in_hierarchy_order() {
        let sim = Simulation::new(SimConfig::default(), &mut rng());
        let kinds: Vec<_> = sim.levels().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, LevelKind::ALL.to_vec());
    }

    #[test]
    fn test_zero_ticks_matches_initialization() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sim = Simulation::new(SimConfig::default(), &mut rng);
        let before = sim.snapshot();
        sim.run(0, &mut rng);
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn test_tick_increments_counter() {
        let mut rng = rng();
        let mut sim = Simulation::new(SimConfig::default(), &mut rng);
        let report = sim.tick(&mut rng);
        assert_eq!(report.tick, 1);
        assert_eq!(sim.tick_count(), 1);
        sim.run(9, &mut rng);
        assert_eq!(sim.tick_count(), 10);
    }

    #[test]
    fn test_fed_cells_first_tick() {
        let cells = vec![Entity::Cell { health: 0.5, resource: 0.6 }; 10];
        let snapshot = snapshot_with(
            cells,
            vec![Entity::Organism { health: 0.5 }],
            vec![Entity::Species { health: 0.5, population: 5 }],
            Entity::Ecosystem { health: 0.5, biodiversity: 1 },
        );
        let mut sim = Simulation::from_snapshot(no_spawn(), snapshot).unwrap();
        sim.tick(&mut rng());

        for cell in &sim.level(LevelKind::Cell).entities {
            assert!((cell.health() - 0.51).abs() < 1e-6);
        }
    }

    #[test]
    fn test_organism_reads_updated_cells() {
        // Cells start at 0.6 and are fed, so their mean after the update is 0.61 > 0.6
        let snapshot = snapshot_with(
            vec![Entity::Cell { health: 0.6, resource: 0.9 }; 4],
            vec![Entity::Organism { health: 0.4 }],
            vec![Entity::Species { health: 0.5, population: 5 }],
            Entity::Ecosystem { health: 0.5, biodiversity: 1 },
        );
        let mut sim = Simulation::from_snapshot(no_spawn(), snapshot).unwrap();
        sim.tick(&mut rng());
        let organism = sim.level(LevelKind::Organism).entities[0];
        assert!((organism.health() - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_extinct_species_removed_same_tick() {
        let snapshot = snapshot_with(
            vec![Entity::Cell { health: 0.5, resource: 0.5 }],
            vec![Entity::Organism { health: 0.5 }],
            vec![
                Entity::Species { health: 0.2, population: 1 },
                Entity::Species { health: 0.8, population: 3 },
                Entity::Species { health: 0.3, population: 1 },
            ],
            Entity::Ecosystem { health: 0.5, biodiversity: 3 },
        );
        let mut sim = Simulation::from_snapshot(no_spawn(), snapshot).unwrap();
        let report = sim.tick(&mut rng());

        assert_eq!(report.extinct, 2);
        assert_eq!(report.species_before_filter, 3);
        let species = &sim.level(LevelKind::Species).entities;
        assert_eq!(species.len(), 1);
        assert_eq!(species[0].population(), Some(4));

        // Biodiversity reflects the count before the filter
        let eco = sim.level(LevelKind::Ecosystem).entities[0];
        assert_eq!(eco.biodiversity(), Some(3));
    }

    #[test]
    fn test_empty_species_level() {
        let snapshot = snapshot_with(
            vec![Entity::Cell { health: 0.5, resource: 0.5 }],
            vec![Entity::Organism { health: 0.5 }],
            vec![],
            Entity::Ecosystem { health: 0.5, biodiversity: 0 },
        );
        let mut sim = Simulation::from_snapshot(no_spawn(), snapshot).unwrap();
        sim.tick(&mut rng());

        let eco = sim.level(LevelKind::Ecosystem).entities[0];
        assert_eq!(eco.biodiversity(), Some(0));
        assert!((eco.health() - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_when_certain() {
        let config = SimConfig {
            spawn_probability: 1.0,
            ..SimConfig::default()
        };
        let snapshot = snapshot_with(
            vec![Entity::Cell { health: 0.5, resource: 0.5 }],
            vec![Entity::Organism { health: 0.5 }],
            vec![Entity::Species { health: 0.9, population: 2 }],
            Entity::Ecosystem { health: 0.5, biodiversity: 1 },
        );
        let mut sim = Simulation::from_snapshot(config, snapshot).unwrap();
        let report = sim.tick(&mut rng());

        assert!(report.spawned);
        let species = &sim.level(LevelKind::Species).entities;
        assert_eq!(species.len(), 2);
        assert_eq!(species[1], Entity::Species { health: 0.5, population: 1 });
    }

    #[test]
    fn test_spawn_suppressed_at_cap() {
        let config = SimConfig {
            spawn_probability: 1.0,
            ..SimConfig::default()
        };
        let snapshot = snapshot_with(
            vec![Entity::Cell { health: 0.5, resource: 0.5 }],
            vec![Entity::Organism { health: 0.5 }],
            vec![Entity::Species { health: 0.9, population: 5 }; 7],
            Entity::Ecosystem { health: 0.5, biodiversity: 7 },
        );
        let mut sim = Simulation::from_snapshot(config, snapshot).unwrap();
        for _ in 0..20 {
            let report = sim.tick(&mut rng());
            assert!(!report.spawned);
            assert!(sim.level(LevelKind::Species).len() <= 7);
        }
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut rng = rng();
        let mut sim = Simulation::new(SimConfig::default(), &mut rng);
        sim.run(3, &mut rng);
        let snapshot = sim.snapshot();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"level\":\"Cell\""));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_from_snapshot_rejects_bad_layout() {
        let mut snapshot = snapshot_with(
            vec![],
            vec![],
            vec![],
            Entity::Ecosystem { health: 0.5, biodiversity: 0 },
        );
        snapshot.levels.swap(0, 1);
        let err = Simulation::from_snapshot(SimConfig::default(), snapshot).unwrap_err();
        assert!(matches!(err, SnapshotError::LevelOrder { .. }));

        let misplaced = snapshot_with(
            vec![Entity::Organism { health: 0.1 }],
            vec![],
            vec![],
            Entity::Ecosystem { health: 0.5, biodiversity: 0 },
        );
        let err = Simulation::from_snapshot(SimConfig::default(), misplaced).unwrap_err();
        assert!(matches!(err, SnapshotError::MisplacedEntity { index: 0, .. }));
    }

    #[test]
    fn test_from_snapshot_rejects_out_of_range_values() {
        let bad_health = snapshot_with(
            vec![Entity::Cell { health: 1.5, resource: 0.5 }],
            vec![],
            vec![],
            Entity::Ecosystem { health: 0.5, biodiversity: 0 },
        );
        let err = Simulation::from_snapshot(SimConfig::default(), bad_health).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InvalidEntity { level: LevelKind::Cell, index: 0, .. }
        ));
        assert!(err.to_string().contains("health"));

        let bad_resource = snapshot_with(
            vec![
                Entity::Cell { health: 0.5, resource: 0.5 },
                Entity::Cell { health: 0.5, resource: -0.2 },
            ],
            vec![],
            vec![],
            Entity::Ecosystem { health: 0.5, biodiversity: 0 },
        );
        let err = Simulation::from_snapshot(SimConfig::default(), bad_resource).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidEntity { index: 1, .. }));
        assert!(err.to_string().contains("resource"));
    }

    #[test]
    fn test_from_json_rejects_zero_population_species() {
        let snapshot = snapshot_with(
            vec![],
            vec![],
            vec![Entity::Species { health: 0.7, population: 0 }],
            Entity::Ecosystem { health: 0.5, biodiversity: 1 },
        );
        let json = snapshot.to_json().unwrap();
        let err = Snapshot::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InvalidEntity { level: LevelKind::Species, index: 0, .. }
        ));
    }

    #[test]
    fn test_snapshot_level_lookup_on_short_snapshot() {
        let snapshot = Snapshot {
            tick: 0,
            levels: vec![Level::new(LevelKind::Cell, vec![])],
        };
        assert!(snapshot.level(LevelKind::Cell).is_some());
        assert!(snapshot.level(LevelKind::Ecosystem).is_none());
    }
}
