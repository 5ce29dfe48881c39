//! # Cell Records
//!
//! One map cell is a `Block`: a (metatile id, collision, elevation) triple
//! packed into a 16-bit word. Which bits belong to which field is a project
//! setting, so every operation that packs or unpacks takes the live
//! `BlockLayout` explicitly rather than consulting shared state.

use std::io;

use log::warn;

use crate::bitfield::BitField;

/// The three field configurations for packed cells.
///
/// Built once per project load or settings apply and never mutated in
/// place. The embedding application must not swap layouts while edits or
/// renders are in flight.
#[derive(Clone, Debug)]
pub struct BlockLayout {
    metatile_id: BitField,
    collision: BitField,
    elevation: BitField,
}

impl BlockLayout {
    pub fn new(metatile_id_mask: u16, collision_mask: u16, elevation_mask: u16) -> Self {
        if (metatile_id_mask & collision_mask)
            | (metatile_id_mask & elevation_mask)
            | (collision_mask & elevation_mask)
            != 0
        {
            warn!(
                "block layout masks overlap: {:#06x}/{:#06x}/{:#06x}",
                metatile_id_mask, collision_mask, elevation_mask
            );
        }
        BlockLayout {
            metatile_id: BitField::new(metatile_id_mask as u32),
            collision: BitField::new(collision_mask as u32),
            elevation: BitField::new(elevation_mask as u32),
        }
    }

    /// Vanilla 10/2/4 split: metatile id low, collision, elevation high.
    pub fn vanilla() -> Self {
        Self::new(0x03FF, 0x0C00, 0xF000)
    }

    pub fn max_metatile_id(&self) -> u16 {
        self.metatile_id.max_value() as u16
    }

    pub fn max_collision(&self) -> u16 {
        self.collision.max_value() as u16
    }

    pub fn max_elevation(&self) -> u16 {
        self.elevation.max_value() as u16
    }

    pub fn clamp_metatile_id(&self, value: u16) -> u16 {
        self.metatile_id.clamp(value as u32) as u16
    }

    pub fn clamp_collision(&self, value: u16) -> u16 {
        self.collision.clamp(value as u32) as u16
    }

    pub fn clamp_elevation(&self, value: u16) -> u16 {
        self.elevation.clamp(value as u32) as u16
    }
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self::vanilla()
    }
}

/// One map cell. Equality is field-wise; two blocks with equal fields are
/// the same cell value regardless of which layout produced them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub metatile_id: u16,
    pub collision: u16,
    pub elevation: u16,
}

impl Block {
    /// Clamp-construction: each field is reduced into its own range.
    pub fn new(metatile_id: u16, collision: u16, elevation: u16, layout: &BlockLayout) -> Self {
        Block {
            metatile_id: layout.clamp_metatile_id(metatile_id),
            collision: layout.clamp_collision(collision),
            elevation: layout.clamp_elevation(elevation),
        }
    }

    /// Unpacks all three fields from a packed cell word.
    pub fn from_raw(raw: u16, layout: &BlockLayout) -> Self {
        Block {
            metatile_id: layout.metatile_id.unpack(raw as u32) as u16,
            collision: layout.collision.unpack(raw as u32) as u16,
            elevation: layout.elevation.unpack(raw as u32) as u16,
        }
    }

    /// Re-packs all three fields into one cell word.
    /// `Block::from_raw(b.raw_value(l), l) == b` for any clamp-constructed
    /// block.
    pub fn raw_value(&self, layout: &BlockLayout) -> u16 {
        (layout.metatile_id.pack(self.metatile_id as u32)
            | layout.collision.pack(self.collision as u32)
            | layout.elevation.pack(self.elevation as u32)) as u16
    }
}

/// Row-major cell buffer for a map or border.
pub type Blockdata = Vec<Block>;

/// Parses a flat little-endian cell file: one 16-bit word per cell,
/// row-major, no header. The byte length must be even and match
/// `expected_cells` exactly; partial trailing bytes are refused.
pub fn read_blockdata(
    data: &[u8],
    expected_cells: usize,
    layout: &BlockLayout,
) -> Result<Blockdata, io::Error> {
    if data.len() % 2 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "blockdata length {} is not a whole number of 16-bit cells",
                data.len()
            ),
        ));
    }
    let cells = data.len() / 2;
    if cells != expected_cells {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("blockdata has {} cells, expected {}", cells, expected_cells),
        ));
    }
    Ok(data
        .chunks_exact(2)
        .map(|w| Block::from_raw(u16::from_le_bytes([w[0], w[1]]), layout))
        .collect())
}

/// Serializes cells back to the flat little-endian format.
pub fn write_blockdata(blocks: &[Block], layout: &BlockLayout) -> Vec<u8> {
    let mut out = Vec::with_capacity(blocks.len() * 2);
    for block in blocks {
        out.extend_from_slice(&block.raw_value(layout).to_le_bytes());
    }
    out
}
