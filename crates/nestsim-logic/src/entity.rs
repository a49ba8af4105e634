//! Hierarchy levels and the entity records that live in them.

use serde::{Deserialize, Serialize};

/// One tier of the biological hierarchy, ordered from base to apex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelKind {
    Cell,
    Organism,
    Species,
    Ecosystem,
}

impl LevelKind {
    /// All levels in hierarchy order (Cell first).
    pub const ALL: [LevelKind; 4] = [
        LevelKind::Cell,
        LevelKind::Organism,
        LevelKind::Species,
        LevelKind::Ecosystem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LevelKind::Cell => "Cell",
            LevelKind::Organism => "Organism",
            LevelKind::Species => "Species",
            LevelKind::Ecosystem => "Ecosystem",
        }
    }

    /// What entities on this level optimize for.
    pub fn description(self) -> &'static str {
        match self {
            LevelKind::Cell => "Energy efficiency and reproduction",
            LevelKind::Organism => "Survival and growth",
            LevelKind::Species => "Population growth and genetic diversity",
            LevelKind::Ecosystem => "Biodiversity and stability",
        }
    }

    /// Position in the hierarchy, 0 for Cell.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The level immediately beneath this one, `None` for Cell.
    pub fn below(self) -> Option<LevelKind> {
        match self {
            LevelKind::Cell => None,
            LevelKind::Organism => Some(LevelKind::Cell),
            LevelKind::Species => Some(LevelKind::Organism),
            LevelKind::Ecosystem => Some(LevelKind::Species),
        }
    }
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single simulated instance within a level.
///
/// Every variant carries `health` in `[0, 1]`; the remaining fields exist only
/// on the level that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level")]
pub enum Entity {
    Cell { health: f32, resource: f32 },
    Organism { health: f32 },
    Species { health: f32, population: u32 },
    Ecosystem { health: f32, biodiversity: u32 },
}

impl Entity {
    /// A cell with independently drawn health and resource in `[0, 1)`.
    pub fn random_cell(rng: &mut impl rand::Rng) -> Self {
        Entity::Cell {
            health: rng.gen(),
            resource: rng.gen(),
        }
    }

    pub fn random_organism(rng: &mut impl rand::Rng) -> Self {
        Entity::Organism { health: rng.gen() }
    }

    pub fn random_species(rng: &mut impl rand::Rng, population: u32) -> Self {
        Entity::Species {
            health: rng.gen(),
            population,
        }
    }

    pub fn kind(&self) -> LevelKind {
        match self {
            Entity::Cell { .. } => LevelKind::Cell,
            Entity::Organism { .. } => LevelKind::Organism,
            Entity::Species { .. } => LevelKind::Species,
            Entity::Ecosystem { .. } => LevelKind::Ecosystem,
        }
    }

    pub fn health(&self) -> f32 {
        match *self {
            Entity::Cell { health, .. }
            | Entity::Organism { health }
            | Entity::Species { health, .. }
            | Entity::Ecosystem { health, .. } => health,
        }
    }

    pub fn resource(&self) -> Option<f32> {
        match *self {
            Entity::Cell { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub fn population(&self) -> Option<u32> {
        match *self {
            Entity::Species { population, .. } => Some(population),
            _ => None,
        }
    }

    pub fn biodiversity(&self) -> Option<u32> {
        match *self {
            Entity::Ecosystem { biodiversity, .. } => Some(biodiversity),
            _ => None,
        }
    }

    /// Species with no population left are extinct. Other levels never are.
    pub fn is_extinct(&self) -> bool {
        matches!(self, Entity::Species { population: 0, .. })
    }
}
