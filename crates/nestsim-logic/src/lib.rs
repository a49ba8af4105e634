//! Pure simulation logic for the nested biological hierarchy.
//!
//! This crate contains the per-level update rules and the entity data they
//! operate on. Functions take plain data plus an injected random source and
//! return new data, making them unit-testable with a seeded generator and
//! independent of any timer, renderer, or engine state.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Thresholds, deltas, and smoothing weights used by the rules |
//! | [`entity`] | `LevelKind` ordering and per-level `Entity` records |
//! | [`rules`] | Cell/Organism/Species/Ecosystem update rules, `clamp01`, `mean_health` |

pub mod constants;
pub mod entity;
pub mod rules;

pub use entity::{Entity, LevelKind};
pub use rules::{apply_rule, clamp01, mean_health, RuleInput};
