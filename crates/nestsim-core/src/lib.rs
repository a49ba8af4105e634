//! nestsim Core - Nested Biological Hierarchy Engine
//!
//! A fixed-timestep simulation of a four-level hierarchy where every level's
//! health responds to the mean health of the level beneath it:
//!
//! Cell → Organism → Species → Ecosystem
//!
//! # Architecture
//!
//! - **Rules** (`nestsim-logic`): pure per-level update functions
//! - **Hierarchy**: owns the levels and advances them one tick at a time
//! - **Engine**: timer-driven wrapper with pause, time scale, and a seeded
//!   or entropy-backed random source
//! - **Presentation**: colour, layout, and hover decisions for a renderer
//!   that only ever reads snapshots
//!
//! # Example
//!
//! ```rust,no_run
//! use nestsim_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(SimConfig::default())?;
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     let frame = engine.snapshot();
//!     // hand `frame` to the renderer
//! #   let _ = frame;
//! }
//! # Ok::<(), nestsim_core::ConfigError>(())
//! ```

pub mod config;
pub mod engine;
pub mod hierarchy;
pub mod presentation;
pub mod stats;

pub use config::{ConfigError, ConfigIssue, SimConfig};
pub use engine::SimulationEngine;
pub use hierarchy::{Level, Simulation, Snapshot, SnapshotError, TickReport};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::SimConfig;
    pub use crate::engine::SimulationEngine;
    pub use crate::hierarchy::{Level, Simulation, Snapshot};
    pub use nestsim_logic::{Entity, LevelKind};
}
