//! # Rendering
//!
//! Turns cell records into pixels: `metatile` composes a single metatile
//! from its tile references, `map` keeps incrementally-updated pixel
//! buffers for the map, collision and border views.

pub mod map;
pub mod metatile;

pub use map::LayoutRenderer;
pub use metatile::{render_metatile, render_metatile_sheet, METATILE_PX, SENTINEL_COLOR};

use crate::tileset::metatile::{TILES_PER_METATILE, TILES_PER_METATILE_TRIPLE};

/// Global render settings that change how metatiles are composed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Three tile groups per metatile instead of two.
    pub triple_layer: bool,
    /// Border cells drawn around each map edge.
    pub border_distance: usize,
}

impl RenderConfig {
    pub fn tiles_per_metatile(&self) -> usize {
        if self.triple_layer {
            TILES_PER_METATILE_TRIPLE
        } else {
            TILES_PER_METATILE
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            triple_layer: false,
            border_distance: 2,
        }
    }
}
