//! # Tile Catalogs
//!
//! A `Tileset` is one catalog of metatiles, tile images and palettes. Two
//! catalogs are always active per layout, their id spaces glued at
//! configurable boundaries: ids below a boundary resolve into the primary
//! catalog, the rest into the secondary at `id - boundary`. The same
//! partition rule applies independently to metatile ids, tile-image ids
//! and palette ids.

pub mod metatile;
pub mod tile;

use metatile::Metatile;

/// Tiles are 8 pixels on a side.
pub const TILE_DIM: usize = 8;
/// 8x8 pixels at 4bpp.
pub const BYTES_PER_TILE: usize = 32;
pub const COLORS_PER_PALETTE: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub type Palette = [Rgb; COLORS_PER_PALETTE];

/// Raw 4bpp pixel data for one 8x8 tile, two pixels per byte.
#[derive(Clone, Copy)]
pub struct TileImage(pub [u8; BYTES_PER_TILE]);

impl TileImage {
    /// Decode into 64 palette indices (0-15), row-major.
    pub fn decode(&self) -> [u8; 64] {
        let mut pixels = [0u8; 64];
        for i in 0..BYTES_PER_TILE {
            pixels[i * 2] = self.0[i] & 0x0F;
            pixels[i * 2 + 1] = (self.0[i] >> 4) & 0x0F;
        }
        pixels
    }
}

/// One catalog: ordered metatiles, tile images and 16-color palettes.
pub struct Tileset {
    pub label: String,
    pub is_secondary: bool,
    pub metatiles: Vec<Metatile>,
    pub tiles: Vec<TileImage>,
    pub palettes: Vec<Palette>,
}

impl Tileset {
    pub fn new(label: impl Into<String>, is_secondary: bool) -> Self {
        Tileset {
            label: label.into(),
            is_secondary,
            metatiles: Vec::new(),
            tiles: Vec::new(),
            palettes: Vec::new(),
        }
    }
}

/// Where each combined id space switches from primary to secondary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressBounds {
    pub metatiles_primary: usize,
    pub tiles_primary: usize,
    pub palettes_primary: usize,
    pub palettes_total: usize,
}

/// Splits a combined-space id into (is_secondary, local index).
pub fn resolve_catalog(id: usize, boundary: usize) -> (bool, usize) {
    if id < boundary {
        (false, id)
    } else {
        (true, id - boundary)
    }
}

/// The two catalogs active for a layout.
pub struct TilesetPair {
    pub primary: Tileset,
    pub secondary: Tileset,
    pub bounds: AddressBounds,
}

impl TilesetPair {
    pub fn new(primary: Tileset, secondary: Tileset, bounds: AddressBounds) -> Self {
        TilesetPair {
            primary,
            secondary,
            bounds,
        }
    }

    fn catalog(&self, secondary: bool) -> &Tileset {
        if secondary {
            &self.secondary
        } else {
            &self.primary
        }
    }

    /// Resolved metatile for a combined-space id, if its catalog holds it.
    pub fn metatile(&self, id: u16) -> Option<&Metatile> {
        let (secondary, local) = resolve_catalog(id as usize, self.bounds.metatiles_primary);
        self.catalog(secondary).metatiles.get(local)
    }

    /// Resolved tile image for a combined-space tile id.
    pub fn tile_image(&self, id: u16) -> Option<&TileImage> {
        let (secondary, local) = resolve_catalog(id as usize, self.bounds.tiles_primary);
        self.catalog(secondary).tiles.get(local)
    }

    /// Combined-space palette lookup. Indices at or past the configured
    /// total are rejected even if a catalog happens to hold more.
    pub fn palette(&self, index: usize) -> Option<&Palette> {
        if index >= self.bounds.palettes_total {
            return None;
        }
        let (secondary, local) = resolve_catalog(index, self.bounds.palettes_primary);
        self.catalog(secondary).palettes.get(local)
    }

    /// Ids in the combined metatile space, counting the secondary catalog
    /// from its boundary.
    pub fn metatile_id_span(&self) -> usize {
        self.bounds.metatiles_primary + self.secondary.metatiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_partitions_without_overlap_or_gap() {
        let boundary = 4;
        let total = 10;
        let mut primary_seen = Vec::new();
        let mut secondary_seen = Vec::new();
        for id in 0..total {
            let (secondary, local) = resolve_catalog(id, boundary);
            if secondary {
                secondary_seen.push(local);
            } else {
                primary_seen.push(local);
            }
        }
        assert_eq!(primary_seen, vec![0, 1, 2, 3]);
        assert_eq!(secondary_seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn pair_lookup_respects_boundary() {
        let mut primary = Tileset::new("primary", false);
        primary.metatiles.push(Metatile::new(8));
        primary.metatiles.push(Metatile::new(8));
        let mut secondary = Tileset::new("secondary", true);
        secondary.metatiles.push(Metatile::new(8));
        let pair = TilesetPair::new(
            primary,
            secondary,
            AddressBounds {
                metatiles_primary: 4,
                tiles_primary: 4,
                palettes_primary: 2,
                palettes_total: 3,
            },
        );
        assert!(pair.metatile(0).is_some());
        // Inside the primary range but past the catalog's end.
        assert!(pair.metatile(2).is_none());
        // First secondary id.
        assert!(pair.metatile(4).is_some());
        assert!(pair.metatile(5).is_none());
        assert_eq!(pair.metatile_id_span(), 5);
    }

    #[test]
    fn palette_lookup_caps_at_total() {
        let mut primary = Tileset::new("primary", false);
        primary.palettes.push([Rgb::default(); COLORS_PER_PALETTE]);
        primary.palettes.push([Rgb::default(); COLORS_PER_PALETTE]);
        let mut secondary = Tileset::new("secondary", true);
        secondary.palettes.push([Rgb::default(); COLORS_PER_PALETTE]);
        secondary.palettes.push([Rgb::default(); COLORS_PER_PALETTE]);
        let pair = TilesetPair::new(
            primary,
            secondary,
            AddressBounds {
                metatiles_primary: 1,
                tiles_primary: 1,
                palettes_primary: 2,
                palettes_total: 3,
            },
        );
        assert!(pair.palette(1).is_some());
        assert!(pair.palette(2).is_some());
        // Held by the secondary catalog, but past the configured total.
        assert!(pair.palette(3).is_none());
    }

    #[test]
    fn tile_image_decode_order() {
        let mut bytes = [0u8; BYTES_PER_TILE];
        bytes[0] = 0x21; // pixel 0 = 1, pixel 1 = 2
        let pixels = TileImage(bytes).decode();
        assert_eq!(pixels[0], 1);
        assert_eq!(pixels[1], 2);
        assert_eq!(pixels[2], 0);
    }
}
