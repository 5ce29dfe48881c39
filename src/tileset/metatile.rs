//! # Metatiles
//!
//! A metatile is the unit a map cell references: 2x2 groups of 8x8 tiles,
//! one group per render layer (two layers normally, three in triple-layer
//! mode), plus a packed attribute word carrying gameplay data.
//!
//! Attribute masks differ by target game version. Two vanilla layouts are
//! built in and stay selectable next to any custom configuration, so
//! foreign binary data can always be unpacked with the format it was
//! written in.

use std::io;

use log::warn;

use super::tile::Tile;
use crate::bitfield::BitField;

/// Tiles per 2x2 layer group.
pub const TILES_PER_LAYER: usize = 4;
/// Tile count for double-layer metatiles.
pub const TILES_PER_METATILE: usize = 8;
/// Tile count in triple-layer mode.
pub const TILES_PER_METATILE_TRIPLE: usize = 12;

/// Which render layers a double-layer metatile occupies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayerType {
    /// Middle + top.
    #[default]
    Normal = 0,
    /// Bottom + middle.
    Covered = 1,
    /// Bottom + top; the middle layer repeats the bottom group.
    Split = 2,
}

impl LayerType {
    pub fn from_value(value: u32) -> Self {
        match value {
            0 => LayerType::Normal,
            1 => LayerType::Covered,
            2 => LayerType::Split,
            other => {
                warn!("unknown layer type {}, treating as normal", other);
                LayerType::Normal
            }
        }
    }
}

/// One metatile: its tile references and unpacked attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metatile {
    pub tiles: Vec<Tile>,
    pub layer_type: LayerType,
    pub behavior: u32,
    pub terrain_type: u32,
    pub encounter_type: u32,
    /// Attribute bits not claimed by any known field, kept verbatim so
    /// foreign data survives a pack/unpack cycle.
    pub unused: u32,
}

impl Metatile {
    pub fn new(tile_count: usize) -> Self {
        Metatile {
            tiles: vec![Tile::default(); tile_count],
            ..Default::default()
        }
    }

    /// The 2x2 tile group for one layer slot, if the metatile has it.
    pub fn layer_tiles(&self, group: usize) -> Option<&[Tile]> {
        let start = group * TILES_PER_LAYER;
        self.tiles.get(start..start + TILES_PER_LAYER)
    }
}

/// Packed-attribute configuration: one `BitField` per known attribute kind
/// plus the unclaimed remainder, and the stored word size in bytes.
#[derive(Clone, Debug)]
pub struct AttributeLayout {
    behavior: BitField,
    terrain_type: BitField,
    encounter_type: BitField,
    layer_type: BitField,
    unused: BitField,
    attr_size: usize,
}

impl AttributeLayout {
    /// `attr_size` is the on-disk word size: 1, 2 or 4 bytes.
    pub fn new(
        behavior_mask: u32,
        terrain_type_mask: u32,
        encounter_type_mask: u32,
        layer_type_mask: u32,
        attr_size: usize,
    ) -> Self {
        let attr_size = match attr_size {
            1 | 2 | 4 => attr_size,
            other => {
                warn!("unsupported attribute size {}, falling back to 2", other);
                2
            }
        };
        let word_mask = match attr_size {
            1 => 0xFF,
            2 => 0xFFFF,
            _ => 0xFFFF_FFFF,
        };
        let claimed = behavior_mask | terrain_type_mask | encounter_type_mask | layer_type_mask;
        if claimed & !word_mask != 0 {
            warn!(
                "attribute masks {:#010x} exceed the {}-byte attribute word",
                claimed, attr_size
            );
        }
        AttributeLayout {
            behavior: BitField::new(behavior_mask),
            terrain_type: BitField::new(terrain_type_mask),
            encounter_type: BitField::new(encounter_type_mask),
            layer_type: BitField::new(layer_type_mask),
            unused: BitField::new(word_mask & !claimed),
            attr_size,
        }
    }

    /// 16-bit attribute word carrying behavior and layer type only.
    pub fn vanilla_compact() -> Self {
        Self::new(0x00FF, 0, 0, 0xF000, 2)
    }

    /// 32-bit attribute word with terrain and encounter fields.
    pub fn vanilla_extended() -> Self {
        Self::new(0x0000_01FF, 0x0000_3E00, 0x0700_0000, 0x6000_0000, 4)
    }

    pub fn attr_size(&self) -> usize {
        self.attr_size
    }

    pub fn max_behavior(&self) -> u32 {
        self.behavior.max_value()
    }

    pub fn max_terrain_type(&self) -> u32 {
        self.terrain_type.max_value()
    }

    pub fn max_encounter_type(&self) -> u32 {
        self.encounter_type.max_value()
    }

    /// Packs every attribute kind plus the preserved unused bits.
    pub fn pack(&self, metatile: &Metatile) -> u32 {
        self.behavior.pack(metatile.behavior)
            | self.terrain_type.pack(metatile.terrain_type)
            | self.encounter_type.pack(metatile.encounter_type)
            | self.layer_type.pack(metatile.layer_type as u32)
            | self.unused.pack(metatile.unused)
    }

    /// Unpacks `word` into the metatile's attribute fields.
    pub fn unpack(&self, metatile: &mut Metatile, word: u32) {
        metatile.behavior = self.behavior.unpack(word);
        metatile.terrain_type = self.terrain_type.unpack(word);
        metatile.encounter_type = self.encounter_type.unpack(word);
        metatile.layer_type = LayerType::from_value(self.layer_type.unpack(word));
        metatile.unused = self.unused.unpack(word);
    }

    /// Warns when the project's highest known constant per attribute kind
    /// does not fit its configured mask. Non-fatal: later edits truncate
    /// silently.
    pub fn check_masks(&self, max_behavior: u32, max_terrain_type: u32, max_encounter_type: u32) {
        if max_behavior > self.behavior.max_value() {
            warn!(
                "behavior mask {:#x} cannot hold highest behavior {}",
                self.behavior.mask(),
                max_behavior
            );
        }
        if max_terrain_type > self.terrain_type.max_value() {
            warn!(
                "terrain type mask {:#x} cannot hold highest terrain type {}",
                self.terrain_type.mask(),
                max_terrain_type
            );
        }
        if max_encounter_type > self.encounter_type.max_value() {
            warn!(
                "encounter type mask {:#x} cannot hold highest encounter type {}",
                self.encounter_type.mask(),
                max_encounter_type
            );
        }
        if self.layer_type.max_value() < 2 {
            warn!(
                "layer type mask {:#x} cannot represent all layer types",
                self.layer_type.mask()
            );
        }
    }
}

/// Parses fixed-size metatile records: `2 * tiles_per_metatile` bytes
/// each, one little-endian word per tile reference. Attributes are stored
/// separately; see `read_attributes`.
pub fn read_metatiles(data: &[u8], tiles_per_metatile: usize) -> Result<Vec<Metatile>, io::Error> {
    let record = tiles_per_metatile * 2;
    if record == 0 || data.len() % record != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "metatile data length {} not divisible by record size {}",
                data.len(),
                record
            ),
        ));
    }
    Ok(data
        .chunks_exact(record)
        .map(|rec| {
            let mut metatile = Metatile::new(tiles_per_metatile);
            for (i, w) in rec.chunks_exact(2).enumerate() {
                metatile.tiles[i] = Tile::from_raw(u16::from_le_bytes([w[0], w[1]]));
            }
            metatile
        })
        .collect())
}

/// Serializes metatile records back to the fixed-size binary format.
pub fn write_metatiles(metatiles: &[Metatile]) -> Vec<u8> {
    let mut out = Vec::new();
    for metatile in metatiles {
        for tile in &metatile.tiles {
            out.extend_from_slice(&tile.raw_value().to_le_bytes());
        }
    }
    out
}

/// Parses the per-metatile attribute array: 1, 2 or 4 little-endian bytes
/// per entry.
pub fn read_attributes(data: &[u8], attr_size: usize) -> Result<Vec<u32>, io::Error> {
    match attr_size {
        1 | 2 | 4 => {}
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported attribute size {}", other),
            ));
        }
    }
    if data.len() % attr_size != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "attribute data length {} not divisible by entry size {}",
                data.len(),
                attr_size
            ),
        ));
    }
    Ok(data
        .chunks_exact(attr_size)
        .map(|c| match attr_size {
            1 => c[0] as u32,
            2 => u16::from_le_bytes([c[0], c[1]]) as u32,
            _ => u32::from_le_bytes([c[0], c[1], c[2], c[3]]),
        })
        .collect())
}

/// Serializes attribute words, truncating each to the entry size.
pub fn write_attributes(words: &[u32], attr_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * attr_size);
    for &word in words {
        out.extend_from_slice(&word.to_le_bytes()[..attr_size.min(4)]);
    }
    out
}

/// Unpacks a parsed attribute array into its metatile list. Surplus
/// entries on either side are ignored.
pub fn apply_attributes(metatiles: &mut [Metatile], words: &[u32], layout: &AttributeLayout) {
    for (metatile, &word) in metatiles.iter_mut().zip(words) {
        layout.unpack(metatile, word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_attributes_round_trip() {
        let layout = AttributeLayout::vanilla_extended();
        let mut metatile = Metatile::new(TILES_PER_METATILE);
        // Layer bits of this word decode to Split, a valid variant.
        layout.unpack(&mut metatile, 0xDEAD_BEEF);
        assert_eq!(metatile.layer_type, LayerType::Split);
        assert_eq!(layout.pack(&metatile), 0xDEAD_BEEF);
    }

    #[test]
    fn compact_attributes_round_trip() {
        let layout = AttributeLayout::vanilla_compact();
        let mut metatile = Metatile::new(TILES_PER_METATILE);
        layout.unpack(&mut metatile, 0x2BCD);
        assert_eq!(metatile.behavior, 0xCD);
        assert_eq!(metatile.layer_type, LayerType::Split);
        // Unclaimed bits 0x0B00 survive in `unused`.
        assert_eq!(layout.pack(&metatile), 0x2BCD);
    }

    #[test]
    fn compact_layer_type_position() {
        let layout = AttributeLayout::vanilla_compact();
        let mut metatile = Metatile::new(TILES_PER_METATILE);
        metatile.layer_type = LayerType::Covered;
        assert_eq!(layout.pack(&metatile), 0x1000);
    }

    #[test]
    fn version_specific_unpack_ignores_active_layout() {
        // Importing foreign data goes through a preset directly, whatever
        // the custom layout says.
        let custom = AttributeLayout::new(0xF, 0, 0, 0x30, 1);
        let mut metatile = Metatile::new(TILES_PER_METATILE);
        AttributeLayout::vanilla_compact().unpack(&mut metatile, 0x10FF);
        assert_eq!(metatile.behavior, 0xFF);
        assert_eq!(metatile.layer_type, LayerType::Covered);
        assert_eq!(custom.attr_size(), 1);
    }

    #[test]
    fn metatile_records_round_trip() {
        let data: Vec<u8> = (0..TILES_PER_METATILE * 4)
            .map(|i| (i * 7 % 251) as u8)
            .collect();
        let metatiles = read_metatiles(&data, TILES_PER_METATILE).unwrap();
        assert_eq!(metatiles.len(), 2);
        assert_eq!(write_metatiles(&metatiles), data);
    }

    #[test]
    fn metatile_records_reject_partial_data() {
        assert!(read_metatiles(&[0u8; 15], TILES_PER_METATILE).is_err());
        assert!(read_metatiles(&[0u8; 20], TILES_PER_METATILE_TRIPLE).is_err());
    }

    #[test]
    fn attribute_arrays_round_trip_each_size() {
        for (attr_size, data) in [
            (1usize, vec![0x12u8, 0x34]),
            (2, vec![0x12, 0x34, 0x56, 0x78]),
            (4, vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0x0F]),
        ] {
            let words = read_attributes(&data, attr_size).unwrap();
            assert_eq!(words.len(), 2);
            assert_eq!(write_attributes(&words, attr_size), data);
        }
    }

    #[test]
    fn attribute_arrays_reject_bad_sizes() {
        assert!(read_attributes(&[0u8; 6], 3).is_err());
        assert!(read_attributes(&[0u8; 6], 4).is_err());
    }

    #[test]
    fn apply_attributes_zips_short_side() {
        let layout = AttributeLayout::vanilla_compact();
        let mut metatiles = vec![Metatile::new(TILES_PER_METATILE); 2];
        apply_attributes(&mut metatiles, &[0x0001, 0x0002, 0x0003], &layout);
        assert_eq!(metatiles[0].behavior, 1);
        assert_eq!(metatiles[1].behavior, 2);
    }

    #[test]
    fn layer_tiles_out_of_range_is_none() {
        let metatile = Metatile::new(TILES_PER_METATILE);
        assert!(metatile.layer_tiles(1).is_some());
        assert!(metatile.layer_tiles(2).is_none());
    }
}
