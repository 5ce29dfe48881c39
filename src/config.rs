//! # Project Configuration
//!
//! The boundary with the project-config provider: every reconfigurable
//! constant (cell field masks, attribute format, layer mode, catalog
//! boundaries) lives in `CoreConfig`. Applying a settings change means
//! building the layout objects again and invalidating the renderer;
//! nothing in the core is process-global. Two vanilla presets stay
//! selectable next to any custom configuration.

use serde::{Deserialize, Serialize};

use crate::block::BlockLayout;
use crate::render::RenderConfig;
use crate::tileset::metatile::AttributeLayout;
use crate::tileset::AddressBounds;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub metatile_id_mask: u16,
    pub collision_mask: u16,
    pub elevation_mask: u16,
    pub behavior_mask: u32,
    pub terrain_type_mask: u32,
    pub encounter_type_mask: u32,
    pub layer_type_mask: u32,
    /// On-disk attribute word size in bytes: 1, 2 or 4.
    pub attribute_size: usize,
    pub triple_layer: bool,
    pub metatiles_primary: usize,
    pub tiles_primary: usize,
    pub palettes_primary: usize,
    pub palettes_total: usize,
    pub border_distance: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::vanilla_extended()
    }
}

impl CoreConfig {
    /// Defaults for the extended vanilla format: 32-bit attributes with
    /// terrain and encounter fields, larger primary catalogs.
    pub fn vanilla_extended() -> Self {
        CoreConfig {
            metatile_id_mask: 0x03FF,
            collision_mask: 0x0C00,
            elevation_mask: 0xF000,
            behavior_mask: 0x0000_01FF,
            terrain_type_mask: 0x0000_3E00,
            encounter_type_mask: 0x0700_0000,
            layer_type_mask: 0x6000_0000,
            attribute_size: 4,
            triple_layer: false,
            metatiles_primary: 640,
            tiles_primary: 640,
            palettes_primary: 7,
            palettes_total: 13,
            border_distance: 2,
        }
    }

    /// Defaults for the compact vanilla format: 16-bit attributes
    /// carrying behavior and layer type only.
    pub fn vanilla_compact() -> Self {
        CoreConfig {
            behavior_mask: 0x00FF,
            terrain_type_mask: 0,
            encounter_type_mask: 0,
            layer_type_mask: 0xF000,
            attribute_size: 2,
            metatiles_primary: 512,
            tiles_primary: 512,
            palettes_primary: 6,
            palettes_total: 12,
            ..Self::vanilla_extended()
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Builds the cell-record layout. Callers must re-derive any cached
    /// default blocks after applying a new configuration.
    pub fn block_layout(&self) -> BlockLayout {
        BlockLayout::new(self.metatile_id_mask, self.collision_mask, self.elevation_mask)
    }

    pub fn attribute_layout(&self) -> AttributeLayout {
        AttributeLayout::new(
            self.behavior_mask,
            self.terrain_type_mask,
            self.encounter_type_mask,
            self.layer_type_mask,
            self.attribute_size,
        )
    }

    pub fn address_bounds(&self) -> AddressBounds {
        AddressBounds {
            metatiles_primary: self.metatiles_primary,
            tiles_primary: self.tiles_primary,
            palettes_primary: self.palettes_primary,
            palettes_total: self.palettes_total,
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            triple_layer: self.triple_layer,
            border_distance: self.border_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_extended_preset() {
        assert_eq!(CoreConfig::default(), CoreConfig::vanilla_extended());
    }

    #[test]
    fn json_round_trips() {
        let config = CoreConfig::vanilla_compact();
        let text = config.to_json().unwrap();
        assert_eq!(CoreConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = CoreConfig::from_json(r#"{"triple_layer": true}"#).unwrap();
        assert!(config.triple_layer);
        assert_eq!(config.metatile_id_mask, 0x03FF);
    }

    #[test]
    fn built_layouts_reflect_the_masks() {
        let layout = CoreConfig::vanilla_extended().block_layout();
        assert_eq!(layout.max_metatile_id(), 1023);
        assert_eq!(layout.max_collision(), 3);
        assert_eq!(layout.max_elevation(), 15);

        let attrs = CoreConfig::vanilla_compact().attribute_layout();
        assert_eq!(attrs.attr_size(), 2);
        assert_eq!(attrs.max_behavior(), 255);
    }

    #[test]
    fn render_config_carries_the_layer_mode() {
        let mut config = CoreConfig::vanilla_extended();
        assert_eq!(config.render_config().tiles_per_metatile(), 8);
        config.triple_layer = true;
        assert_eq!(config.render_config().tiles_per_metatile(), 12);
    }
}
