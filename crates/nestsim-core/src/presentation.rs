//! View model for an external renderer.
//!
//! Nothing here draws. These are the colour, layout, and tooltip decisions a
//! renderer needs to turn a [`Snapshot`](crate::Snapshot) into a frame: each
//! level is a titled band of coloured squares, one per entity, and hovering a
//! square shows that entity's fields.

use nestsim_logic::{Entity, LevelKind};
use serde::{Deserialize, Serialize};

use crate::hierarchy::Level;

/// Total width available to a level's grid of squares
pub const GRID_WIDTH: f32 = 600.0;
/// Vertical distance between level bands
pub const LEVEL_BAND_HEIGHT: f32 = 150.0;
/// Offset of the entity grid below the level's header text
pub const GRID_TOP: f32 = 70.0;

const CELL_COLORS: [&str; 4] = ["#E6F0FF", "#99C2FF", "#4D94FF", "#0066FF"];
const ORGANISM_COLORS: [&str; 4] = ["#E6FFF0", "#99FFD6", "#4DFFAD", "#00FF80"];
const SPECIES_COLORS: [&str; 4] = ["#FFF0E6", "#FFD699", "#FFAD4D", "#FF8000"];
const ECOSYSTEM_COLORS: [&str; 4] = ["#F0E6FF", "#D699FF", "#AD4DFF", "#8000FF"];

/// Light-to-saturated colour ramp for a level.
pub fn color_scheme(kind: LevelKind) -> &'static [&'static str; 4] {
    match kind {
        LevelKind::Cell => &CELL_COLORS,
        LevelKind::Organism => &ORGANISM_COLORS,
        LevelKind::Species => &SPECIES_COLORS,
        LevelKind::Ecosystem => &ECOSYSTEM_COLORS,
    }
}

/// Colour for an entity of `kind` with the given health.
pub fn health_color(kind: LevelKind, health: f32) -> &'static str {
    let scheme = color_scheme(kind);
    let index = (health.max(0.0) * scheme.len() as f32).floor() as usize;
    scheme[index.min(scheme.len() - 1)]
}

/// Side length of one entity square; higher levels draw smaller squares.
pub fn entity_size(kind: LevelKind) -> f32 {
    16.0 - 2.0 * kind.index() as f32
}

/// Squares per row for a level.
pub fn grid_columns(kind: LevelKind) -> usize {
    let spacing = entity_size(kind) + 2.0;
    ((GRID_WIDTH / spacing).floor() as usize).max(1)
}

/// Top-left corner of entity `index`, relative to the level's grid origin.
pub fn entity_position(kind: LevelKind, index: usize) -> (f32, f32) {
    let spacing = entity_size(kind) + 2.0;
    let columns = grid_columns(kind);
    (
        (index % columns) as f32 * spacing,
        (index / columns) as f32 * spacing,
    )
}

/// Vertical offset of a level's band.
pub fn level_offset(kind: LevelKind) -> f32 {
    kind.index() as f32 * LEVEL_BAND_HEIGHT
}

/// Header lines drawn above a level's grid.
pub fn level_header(level: &Level) -> [String; 3] {
    [
        level.name().to_string(),
        format!("Entities: {}", level.len()),
        format!("Optimizing for: {}", level.description()),
    ]
}

pub fn pause_button_label(paused: bool) -> &'static str {
    if paused {
        "Resume"
    } else {
        "Pause"
    }
}

/// The entity under the pointer, captured when the pointer entered it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoveredEntity {
    pub level: LevelKind,
    pub index: usize,
    pub entity: Entity,
}

impl HoveredEntity {
    pub fn tooltip_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} {}", self.level, self.index + 1),
            format!("Health: {:.2}", self.entity.health()),
        ];
        if let Some(resource) = self.entity.resource() {
            lines.push(format!("Resource: {:.2}", resource));
        }
        if let Some(population) = self.entity.population() {
            lines.push(format!("Population: {}", population));
        }
        if let Some(biodiversity) = self.entity.biodiversity() {
            lines.push(format!("Biodiversity: {}", biodiversity));
        }
        lines
    }
}

/// Pointer hover selection, set on enter and cleared on leave.
#[derive(Debug, Clone, Default)]
pub struct HoverState {
    current: Option<HoveredEntity>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, level: LevelKind, index: usize, entity: Entity) {
        self.current = Some(HoveredEntity {
            level,
            index,
            entity,
        });
    }

    pub fn leave(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&HoveredEntity> {
        self.current.as_ref()
    }

    /// Whether the tooltip belongs on this square.
    pub fn is_hovered(&self, level: LevelKind, index: usize) -> bool {
        self.current
            .map_or(false, |h| h.level == level && h.index == index)
    }
}
