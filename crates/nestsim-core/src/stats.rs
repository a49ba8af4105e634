//! Per-level statistics over the current hierarchy.

use nestsim_logic::LevelKind;
use serde::{Deserialize, Serialize};

use crate::hierarchy::{Level, Simulation};

/// Summary of one level at a point in time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    pub kind: LevelKind,
    pub count: usize,
    pub mean_health: f32,
    pub min_health: f32,
    pub max_health: f32,
    /// Sum of species populations (0 on other levels)
    pub total_population: u64,
}

impl LevelStats {
    pub fn from_level(level: &Level) -> Self {
        if level.is_empty() {
            return Self {
                kind: level.kind,
                count: 0,
                mean_health: 0.0,
                min_health: 0.0,
                max_health: 0.0,
                total_population: 0,
            };
        }

        let mut min_health = f32::MAX;
        let mut max_health = f32::MIN;
        let mut total_population = 0u64;
        for entity in &level.entities {
            min_health = min_health.min(entity.health());
            max_health = max_health.max(entity.health());
            total_population += entity.population().unwrap_or(0) as u64;
        }

        Self {
            kind: level.kind,
            count: level.len(),
            mean_health: level.mean_health(),
            min_health,
            max_health,
            total_population,
        }
    }
}

/// Statistics for every level at one tick
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HierarchyStats {
    pub tick: u64,
    pub levels: Vec<LevelStats>,
}

impl HierarchyStats {
    pub fn collect(simulation: &Simulation) -> Self {
        Self {
            tick: simulation.tick_count(),
            levels: simulation.levels().iter().map(LevelStats::from_level).collect(),
        }
    }

    pub fn level(&self, kind: LevelKind) -> Option<&LevelStats> {
        self.levels.iter().find(|s| s.kind == kind)
    }

    /// One line per level, for logs and the headless harness
    pub fn summary(&self) -> String {
        let mut out = format!("tick {}", self.tick);
        for s in &self.levels {
            out.push_str(&format!(
                " | {} n={} health={:.3}",
                s.kind, s.count, s.mean_health
            ));
            if s.kind == LevelKind::Species {
                out.push_str(&format!(" pop={}", s.total_population));
            }
        }
        out
    }
}
