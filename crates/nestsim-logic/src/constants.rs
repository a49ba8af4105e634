//! Tuning constants for the hierarchy update rules.
//!
//! Grouped by level in hierarchy order. Values are per tick.

/// Cell-level constants.
pub mod cell {
    /// Resource above this feeds the cell; at or below it starves.
    pub const RESOURCE_THRESHOLD: f32 = 0.5;
    /// Health change per tick from feeding or starving.
    pub const HEALTH_DELTA: f32 = 0.01;
    /// Amplitude of the global oscillation added to every cell.
    pub const OSCILLATION_AMPLITUDE: f32 = 0.005;
    /// Tick period divisor of the oscillation (`sin(tick / 20)`).
    pub const OSCILLATION_PERIOD: f32 = 20.0;
    /// Fixed resource drain per tick.
    pub const RESOURCE_DRAIN: f32 = 0.005;
    /// Upper bound of the uniform resource replenishment draw.
    pub const RESOURCE_REPLENISH_MAX: f32 = 0.01;
}

/// Organism-level constants.
pub mod organism {
    /// Mean cell health above this improves organisms.
    pub const CELL_HEALTH_THRESHOLD: f32 = 0.6;
    pub const HEALTH_DELTA: f32 = 0.02;
}

/// Species-level constants.
pub mod species {
    /// Mean organism health above this improves species.
    pub const ORGANISM_HEALTH_THRESHOLD: f32 = 0.5;
    pub const HEALTH_DELTA: f32 = 0.01;
    /// Prior-tick health above this grows the population, otherwise it shrinks.
    pub const FITNESS_THRESHOLD: f32 = 0.5;
}

/// Ecosystem-level constants.
pub mod ecosystem {
    /// Weight kept from the previous ecosystem health (exponential smoothing).
    pub const HEALTH_DECAY: f32 = 0.9;
}
