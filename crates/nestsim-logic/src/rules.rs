//! Per-level update rules.
//!
//! Each rule maps an entity's prior state plus the aggregate health of the
//! level beneath it to a new state. Health is clamped to `[0, 1]` as the last
//! step of every computation. The only randomness (cell resource
//! replenishment) comes from the caller-supplied generator.

use rand::Rng;

use crate::constants::{cell, ecosystem, organism, species};
use crate::entity::Entity;

/// `min(1, max(0, x))`. NaN collapses to 0.
pub fn clamp01(x: f32) -> f32 {
    x.max(0.0).min(1.0)
}

/// Arithmetic mean of `health` across a level.
///
/// An empty level has no defined mean; it reports the neutral value 0 so
/// that upper levels keep updating after a mass extinction.
pub fn mean_health(entities: &[Entity]) -> f32 {
    if entities.is_empty() {
        return 0.0;
    }
    let sum: f32 = entities.iter().map(Entity::health).sum();
    sum / entities.len() as f32
}

/// Cross-level signal handed to a rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleInput {
    /// Mean health of the level beneath (ignored by cells).
    pub lower_health: f32,
    /// Tick counter value the step was started from.
    pub tick: u64,
    /// Species entities present after the species rule ran this tick.
    /// Only read by the ecosystem rule.
    pub species_count: usize,
}

impl RuleInput {
    pub fn new(lower_health: f32, tick: u64) -> Self {
        Self {
            lower_health,
            tick,
            species_count: 0,
        }
    }

    pub fn with_species_count(mut self, species_count: usize) -> Self {
        self.species_count = species_count;
        self
    }
}

/// Cell: feeds on its own resource and follows a slow global oscillation.
///
/// Returns `(health, resource)`. The health decision reads the resource value
/// from before this tick's drain.
pub fn update_cell(health: f32, resource: f32, tick: u64, rng: &mut impl Rng) -> (f32, f32) {
    let feeding = if resource > cell::RESOURCE_THRESHOLD {
        cell::HEALTH_DELTA
    } else {
        -cell::HEALTH_DELTA
    };
    let oscillation =
        ((tick as f64 / cell::OSCILLATION_PERIOD as f64).sin() as f32) * cell::OSCILLATION_AMPLITUDE;
    let new_health = clamp01(health + feeding + oscillation);

    let replenish = rng.gen_range(0.0..cell::RESOURCE_REPLENISH_MAX);
    let new_resource = clamp01(resource - cell::RESOURCE_DRAIN + replenish);

    (new_health, new_resource)
}

/// Organism: tracks whether its cells are, on average, healthy.
pub fn update_organism(health: f32, cell_health: f32) -> f32 {
    let delta = if cell_health > organism::CELL_HEALTH_THRESHOLD {
        organism::HEALTH_DELTA
    } else {
        -organism::HEALTH_DELTA
    };
    clamp01(health + delta)
}

/// Species: health follows the organisms, population follows prior fitness.
///
/// Returns `(health, population)`. The population decision uses `health` as it
/// was before this tick, so population lags fitness by one step.
pub fn update_species(health: f32, population: u32, organism_health: f32) -> (f32, u32) {
    let delta = if organism_health > species::ORGANISM_HEALTH_THRESHOLD {
        species::HEALTH_DELTA
    } else {
        -species::HEALTH_DELTA
    };
    let new_health = clamp01(health + delta);

    let new_population = if health > species::FITNESS_THRESHOLD {
        population.saturating_add(1)
    } else {
        population.saturating_sub(1)
    };

    (new_health, new_population)
}

/// Ecosystem: exponentially smoothed species health; biodiversity mirrors
/// the species count it was handed.
pub fn update_ecosystem(health: f32, species_health: f32, species_count: usize) -> (f32, u32) {
    let new_health =
        clamp01(health * ecosystem::HEALTH_DECAY + species_health * (1.0 - ecosystem::HEALTH_DECAY));
    let biodiversity = u32::try_from(species_count).unwrap_or(u32::MAX);
    (new_health, biodiversity)
}

/// Apply the rule belonging to the entity's level.
pub fn apply_rule(entity: &Entity, input: &RuleInput, rng: &mut impl Rng) -> Entity {
    match *entity {
        Entity::Cell { health, resource } => {
            let (health, resource) = update_cell(health, resource, input.tick, rng);
            Entity::Cell { health, resource }
        }
        Entity::Organism { health } => Entity::Organism {
            health: update_organism(health, input.lower_health),
        },
        Entity::Species { health, population } => {
            let (health, population) = update_species(health, population, input.lower_health);
            Entity::Species { health, population }
        }
        Entity::Ecosystem { health, .. } => {
            let (health, biodiversity) =
                update_ecosystem(health, input.lower_health, input.species_count);
            Entity::Ecosystem {
                health,
                biodiversity,
            }
        }
    }
}
