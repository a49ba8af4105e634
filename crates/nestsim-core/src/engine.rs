//! Simulation engine - fixed-timestep driver around the hierarchy

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ConfigError, SimConfig};
use crate::hierarchy::{Simulation, Snapshot, TickReport};

/// Upper bound on ticks run by a single `update` call. A longer stall (debugger,
/// suspended tab) drops the backlog instead of fast-forwarding through it.
pub const MAX_CATCH_UP_TICKS: u32 = 10;

/// Main simulation engine
pub struct SimulationEngine {
    /// Hierarchy being driven
    simulation: Simulation,
    /// Random source handed to every tick
    rng: StdRng,
    paused: bool,
    /// Seconds of scaled time not yet consumed by a tick
    accumulator: f64,
    time_scale: f32,
    config: SimConfig,
}

impl SimulationEngine {
    /// Create an engine with a freshly initialized hierarchy.
    ///
    /// Fails if `config.validate()` reports any issue.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(Self::build(config))
    }

    fn build(config: SimConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let simulation = Simulation::new(config.clone(), &mut rng);
        Self {
            simulation,
            rng,
            paused: false,
            accumulator: 0.0,
            time_scale: 1.0,
            config,
        }
    }

    /// Rebuild the initial hierarchy from the same config.
    ///
    /// A seeded engine reproduces its original starting state.
    pub fn reset(&mut self) {
        *self = Self {
            paused: self.paused,
            time_scale: self.time_scale,
            ..Self::build(self.config.clone())
        };
        log::info!("Simulation reset");
    }

    /// Advance by `delta_seconds` of wall-clock time, returning ticks run.
    pub fn update(&mut self, delta_seconds: f32) -> u32 {
        if self.paused {
            return 0;
        }

        let interval = self.tick_interval_seconds();
        if interval <= 0.0 {
            return 0;
        }
        self.accumulator += (delta_seconds * self.time_scale).max(0.0) as f64;

        let mut ticks = 0;
        while self.accumulator >= interval {
            if ticks == MAX_CATCH_UP_TICKS {
                let dropped = (self.accumulator / interval).floor();
                log::warn!("Simulation fell behind, dropping {} ticks", dropped);
                self.accumulator = 0.0;
                break;
            }
            self.simulation.tick(&mut self.rng);
            self.accumulator -= interval;
            ticks += 1;
        }
        ticks
    }

    /// Run exactly one tick now, regardless of pause state
    pub fn tick(&mut self) -> TickReport {
        self.simulation.tick(&mut self.rng)
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            log::info!(
                "Simulation {} at tick {}",
                if paused { "paused" } else { "resumed" },
                self.simulation.tick_count()
            );
        }
        self.paused = paused;
    }

    /// Flip the pause flag, returning the new state
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Get current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn tick_interval_seconds(&self) -> f64 {
        self.config.tick_interval_ms as f64 / 1000.0
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn snapshot(&self) -> Snapshot {
        self.simulation.snapshot()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
