//! # Metatile Composition
//!
//! Draws one metatile into a 16x16 RGBA buffer by resolving each tile
//! reference through the combined tile and palette id spaces.
//!
//! Failures stay visible instead of erroring: a metatile id that cannot be
//! resolved renders as a solid sentinel color, a missing tile image leaves
//! its quadrant transparent, and an out-of-range palette leaves the tile
//! unrecolored. Maps legitimately reference future content while being
//! edited, so none of these conditions may crash a render.

use image::{Rgba, RgbaImage};
use log::warn;

use super::RenderConfig;
use crate::tileset::metatile::{LayerType, Metatile};
use crate::tileset::tile::Tile;
use crate::tileset::{TilesetPair, TILE_DIM};

/// Metatiles are 2x2 tiles: 16 pixels on a side.
pub const METATILE_PX: usize = TILE_DIM * 2;
/// Composition runs bottom, middle, top.
pub const RENDER_LAYERS: usize = 3;

/// Opaque magenta, the "fail visibly, don't crash" fallback.
pub const SENTINEL_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Which tile group a layer type contributes to each render layer.
/// `Split` has no group of its own for the middle layer and repeats the
/// bottom group there.
fn layer_group(layer_type: LayerType, render_layer: usize) -> Option<usize> {
    match layer_type {
        LayerType::Normal => [None, Some(0), Some(1)][render_layer],
        LayerType::Covered => [Some(0), Some(1), None][render_layer],
        LayerType::Split => [Some(0), Some(0), Some(1)][render_layer],
    }
}

/// Composes one metatile image for a combined-space id.
pub fn render_metatile(pair: &TilesetPair, metatile_id: u16, config: &RenderConfig) -> RgbaImage {
    let mut img = RgbaImage::new(METATILE_PX as u32, METATILE_PX as u32);
    draw_cell(&mut img, pair, metatile_id, 0, 0, config);
    img
}

/// Every metatile of the pair laid out 16 per row, for picker UIs.
/// Unresolvable ids within the span render as sentinel squares.
pub fn render_metatile_sheet(pair: &TilesetPair, config: &RenderConfig) -> RgbaImage {
    const SHEET_COLS: usize = 16;
    let total = pair.metatile_id_span();
    if total == 0 {
        return RgbaImage::new(0, 0);
    }
    let rows = (total + SHEET_COLS - 1) / SHEET_COLS;
    let mut sheet = RgbaImage::new(
        (SHEET_COLS * METATILE_PX) as u32,
        (rows * METATILE_PX) as u32,
    );
    for id in 0..total {
        let bx = (id % SHEET_COLS) * METATILE_PX;
        let by = (id / SHEET_COLS) * METATILE_PX;
        draw_cell(&mut sheet, pair, id as u16, bx, by, config);
    }
    sheet
}

/// Clears one cell-sized region and draws `metatile_id` there, or the
/// sentinel if the id cannot be resolved.
pub(crate) fn draw_cell(
    img: &mut RgbaImage,
    pair: &TilesetPair,
    metatile_id: u16,
    bx: usize,
    by: usize,
    config: &RenderConfig,
) {
    match pair.metatile(metatile_id) {
        Some(metatile) => {
            fill_rect(img, bx, by, METATILE_PX, METATILE_PX, Rgba([0, 0, 0, 0]));
            draw_metatile(img, pair, metatile, bx, by, config);
        }
        None => fill_rect(img, bx, by, METATILE_PX, METATILE_PX, SENTINEL_COLOR),
    }
}

/// Draws `metatile` into `img` with its top-left corner at (bx, by).
/// Layers accumulate bottom-up; non-transparent pixels overwrite.
pub fn draw_metatile(
    img: &mut RgbaImage,
    pair: &TilesetPair,
    metatile: &Metatile,
    bx: usize,
    by: usize,
    config: &RenderConfig,
) {
    for render_layer in 0..RENDER_LAYERS {
        let group = if config.triple_layer {
            Some(render_layer)
        } else {
            layer_group(metatile.layer_type, render_layer)
        };
        let Some(group) = group else { continue };
        let Some(tiles) = metatile.layer_tiles(group) else {
            continue;
        };
        for (i, tile) in tiles.iter().enumerate() {
            let tx = bx + (i % 2) * TILE_DIM;
            let ty = by + (i / 2) * TILE_DIM;
            draw_tile(img, pair, tile, tx, ty, render_layer > 0);
        }
    }
}

/// Draws one 8x8 tile. On layers above the bottom, palette index 0 is the
/// background slot and is skipped so lower layers show through.
fn draw_tile(
    img: &mut RgbaImage,
    pair: &TilesetPair,
    tile: &Tile,
    bx: usize,
    by: usize,
    transparent_bg: bool,
) {
    let Some(image) = pair.tile_image(tile.tile_id) else {
        // Out of range for its catalog: leave the quadrant transparent.
        return;
    };
    let pixels = image.decode();
    let palette = pair.palette(tile.palette as usize);
    if palette.is_none() {
        warn!(
            "palette {} out of range, tile {} drawn unrecolored",
            tile.palette, tile.tile_id
        );
    }

    for py in 0..TILE_DIM {
        for px in 0..TILE_DIM {
            let sx = if tile.flip_h { TILE_DIM - 1 - px } else { px };
            let sy = if tile.flip_v { TILE_DIM - 1 - py } else { py };
            let ci = pixels[sy * TILE_DIM + sx] as usize;

            if transparent_bg && ci == 0 {
                continue;
            }
            let rgba = match palette {
                Some(pal) => {
                    let c = pal[ci];
                    Rgba([c.r, c.g, c.b, 255])
                }
                // Unrecolored: spread the 4-bit index over the grey ramp.
                None => {
                    let v = (ci * 17) as u8;
                    Rgba([v, v, v, 255])
                }
            };

            let ox = (bx + px) as u32;
            let oy = (by + py) as u32;
            if ox < img.width() && oy < img.height() {
                img.put_pixel(ox, oy, rgba);
            }
        }
    }
}

pub(crate) fn fill_rect(
    img: &mut RgbaImage,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    color: Rgba<u8>,
) {
    for py in y..y + h {
        for px in x..x + w {
            if (px as u32) < img.width() && (py as u32) < img.height() {
                img.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::metatile::{Metatile, TILES_PER_METATILE};
    use crate::tileset::{AddressBounds, Palette, Rgb, Tileset, TileImage, BYTES_PER_TILE};

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };

    fn solid_tile(index: u8) -> TileImage {
        let nib = index & 0x0F;
        TileImage([nib | (nib << 4); BYTES_PER_TILE])
    }

    /// Only pixel (0,0) set, to color 1.
    fn corner_tile() -> TileImage {
        let mut bytes = [0u8; BYTES_PER_TILE];
        bytes[0] = 0x01;
        TileImage(bytes)
    }

    fn palette_with(color1: Rgb) -> Palette {
        let mut pal = [Rgb::default(); 16];
        pal[1] = color1;
        pal
    }

    fn metatile_with(layer_type: LayerType, groups: [(u16, u8); 2]) -> Metatile {
        let mut metatile = Metatile::new(TILES_PER_METATILE);
        metatile.layer_type = layer_type;
        for (g, (tile_id, palette)) in groups.iter().enumerate() {
            for i in 0..4 {
                metatile.tiles[g * 4 + i] = Tile::new(*tile_id, false, false, *palette);
            }
        }
        metatile
    }

    fn test_pair(metatiles: Vec<Metatile>) -> TilesetPair {
        let mut primary = Tileset::new("general", false);
        primary.metatiles = metatiles;
        primary.tiles = vec![solid_tile(1), corner_tile()];
        primary.palettes = vec![palette_with(RED), palette_with(BLUE)];
        let secondary = Tileset::new("empty", true);
        TilesetPair::new(
            primary,
            secondary,
            AddressBounds {
                metatiles_primary: 8,
                tiles_primary: 8,
                palettes_primary: 2,
                palettes_total: 2,
            },
        )
    }

    #[test]
    fn unresolvable_metatile_renders_sentinel() {
        let pair = test_pair(vec![]);
        let img = render_metatile(&pair, 200, &RenderConfig::default());
        for px in img.pixels() {
            assert_eq!(*px, SENTINEL_COLOR);
        }
    }

    #[test]
    fn covered_bottom_layer_is_opaque() {
        let metatile = metatile_with(LayerType::Covered, [(0, 0), (1, 1)]);
        let pair = test_pair(vec![metatile]);
        let img = render_metatile(&pair, 0, &RenderConfig::default());
        // Corner of each quadrant comes from the upper group, recolored
        // blue; everywhere else the solid red bottom shows through.
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(8, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(15, 15), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn normal_type_leaves_background_transparent() {
        let metatile = metatile_with(LayerType::Normal, [(1, 0), (1, 1)]);
        let pair = test_pair(vec![metatile]);
        let img = render_metatile(&pair, 0, &RenderConfig::default());
        // Both groups sit above the bottom layer, so index 0 stays clear.
        assert_eq!(img.get_pixel(0, 0)[3], 255);
        assert_eq!(img.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn flips_mirror_tile_pixels() {
        let mut metatile = metatile_with(LayerType::Covered, [(1, 0), (1, 1)]);
        for i in 0..4 {
            metatile.tiles[i] = Tile::new(1, true, false, 0);
        }
        let pair = test_pair(vec![metatile]);
        let img = render_metatile(&pair, 0, &RenderConfig::default());
        assert_eq!(*img.get_pixel(7, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(0, 0)[3], 255); // blue corner from group 1
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn missing_tile_image_skips_quadrant() {
        let metatile = metatile_with(LayerType::Covered, [(7, 0), (7, 0)]);
        let pair = test_pair(vec![metatile]);
        let img = render_metatile(&pair, 0, &RenderConfig::default());
        for px in img.pixels() {
            assert_eq!(px[3], 0);
        }
    }

    #[test]
    fn out_of_range_palette_draws_grey_ramp() {
        let metatile = metatile_with(LayerType::Covered, [(0, 9), (1, 9)]);
        let pair = test_pair(vec![metatile]);
        let img = render_metatile(&pair, 0, &RenderConfig::default());
        // Solid index-1 tile, unrecolored: grey value 17.
        assert_eq!(*img.get_pixel(1, 0), Rgba([17, 17, 17, 255]));
    }

    #[test]
    fn split_type_repeats_bottom_group() {
        let metatile = metatile_with(LayerType::Split, [(0, 0), (1, 1)]);
        let pair = test_pair(vec![metatile]);
        let img = render_metatile(&pair, 0, &RenderConfig::default());
        // Bottom red, drawn again on the middle layer (invisible change),
        // then the corner pixels of the top group in blue.
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn sheet_lays_out_sixteen_per_row() {
        let metatile = metatile_with(LayerType::Covered, [(0, 0), (0, 0)]);
        let pair = test_pair(vec![metatile]);
        let sheet = render_metatile_sheet(&pair, &RenderConfig::default());
        assert_eq!(sheet.width(), 256);
        assert_eq!(sheet.height(), 16);
        assert_eq!(*sheet.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        // Id 1 is inside the primary range but unoccupied: sentinel.
        assert_eq!(*sheet.get_pixel(16, 0), SENTINEL_COLOR);
    }
}
