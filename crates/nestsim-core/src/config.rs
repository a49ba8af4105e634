//! Simulation configuration.
//!
//! Defaults reproduce the stock hierarchy: 100 cells, 20 organisms, 5 species
//! and one ecosystem ticking every 100 ms. Any field may be overridden from a
//! JSON document; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for building and driving a [`crate::Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub cell_count: usize,
    pub organism_count: usize,
    pub species_count: usize,
    /// Population every initial species starts with
    pub species_initial_population: u32,
    pub ecosystem_initial_health: f32,
    pub ecosystem_initial_biodiversity: u32,
    /// Spawning is suppressed once the species level holds this many entities
    pub max_species: usize,
    /// Per-tick chance of a new species appearing
    pub spawn_probability: f64,
    pub spawn_health: f32,
    pub spawn_population: u32,
    /// Nominal wall-clock interval between ticks
    pub tick_interval_ms: u64,
    /// Fixed seed for a reproducible run; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cell_count: 100,
            organism_count: 20,
            species_count: 5,
            species_initial_population: 10,
            ecosystem_initial_health: 0.5,
            ecosystem_initial_biodiversity: 5,
            max_species: 7,
            spawn_probability: 0.01,
            spawn_health: 0.5,
            spawn_population: 1,
            tick_interval_ms: 100,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration, returning all issues found.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !(0.0..=1.0).contains(&self.spawn_probability) {
            issues.push(ConfigIssue::SpawnProbabilityOutOfRange(self.spawn_probability));
        }
        if self.tick_interval_ms == 0 {
            issues.push(ConfigIssue::ZeroTickInterval);
        }
        if !(0.0..=1.0).contains(&self.ecosystem_initial_health) {
            issues.push(ConfigIssue::HealthOutOfRange {
                field: "ecosystem_initial_health",
                value: self.ecosystem_initial_health,
            });
        }
        if !(0.0..=1.0).contains(&self.spawn_health) {
            issues.push(ConfigIssue::HealthOutOfRange {
                field: "spawn_health",
                value: self.spawn_health,
            });
        }
        if self.max_species == 0 {
            issues.push(ConfigIssue::ZeroSpeciesCap);
        } else if self.species_count > self.max_species {
            issues.push(ConfigIssue::SpeciesAboveCap {
                species_count: self.species_count,
                max_species: self.max_species,
            });
        }

        issues
    }
}

/// A single problem found by [`SimConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    SpawnProbabilityOutOfRange(f64),
    ZeroTickInterval,
    HealthOutOfRange { field: &'static str, value: f32 },
    ZeroSpeciesCap,
    SpeciesAboveCap { species_count: usize, max_species: usize },
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::SpawnProbabilityOutOfRange(p) => {
                write!(f, "spawn_probability {} is outside [0, 1]", p)
            }
            ConfigIssue::ZeroTickInterval => write!(f, "tick_interval_ms must be positive"),
            ConfigIssue::HealthOutOfRange { field, value } => {
                write!(f, "{} {} is outside [0, 1]", field, value)
            }
            ConfigIssue::ZeroSpeciesCap => write!(f, "max_species must be at least 1"),
            ConfigIssue::SpeciesAboveCap {
                species_count,
                max_species,
            } => write!(
                f,
                "species_count {} exceeds max_species {}",
                species_count, max_species
            ),
        }
    }
}

/// Errors that can occur while loading a configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(Vec<ConfigIssue>),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(issues) => {
                write!(f, "Invalid config: ")?;
                for (i, issue) in issues.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}
