//! # Incremental Map Rendering
//!
//! Each view (map, collision overlay, border) keeps the Blockdata snapshot
//! it last drew next to its pixel buffer. A render diffs the live cells
//! against that snapshot and recomposes only what changed; a dimension
//! change throws the whole view away. "No cache yet" is the `None` state
//! of an owned view, never a dangling buffer.

use image::{Rgba, RgbaImage};

use super::metatile::{draw_cell, METATILE_PX};
use super::RenderConfig;
use crate::block::{Block, BlockLayout};
use crate::tileset::TilesetPair;

struct CachedView {
    blocks: Vec<Block>,
    width: usize,
    height: usize,
    image: RgbaImage,
}

/// Render caches for one layout.
#[derive(Default)]
pub struct LayoutRenderer {
    map: Option<CachedView>,
    collision: Option<CachedView>,
    border: Option<CachedView>,
}

impl LayoutRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every cached view. Call after a tileset or settings change;
    /// the per-cell diff only sees Blockdata edits.
    pub fn invalidate(&mut self) {
        self.map = None;
        self.collision = None;
        self.border = None;
    }

    /// Redraws changed cells of the map view and returns how many were
    /// recomposed. `map_image` exposes the result.
    pub fn render_map(
        &mut self,
        blocks: &[Block],
        width: usize,
        height: usize,
        pair: &TilesetPair,
        config: &RenderConfig,
        force_full: bool,
    ) -> usize {
        render_view(&mut self.map, blocks, width, height, force_full, |img, block, bx, by| {
            draw_cell(img, pair, block.metatile_id, bx, by, config);
        })
    }

    pub fn map_image(&self) -> Option<&RgbaImage> {
        self.map.as_ref().map(|v| &v.image)
    }

    /// Collision/elevation overlay: the metatile base image, an elevation
    /// tint, a collision tint and the numeric elevation label.
    pub fn render_collision(
        &mut self,
        blocks: &[Block],
        width: usize,
        height: usize,
        pair: &TilesetPair,
        config: &RenderConfig,
        layout: &BlockLayout,
        force_full: bool,
    ) -> usize {
        let max_elevation = layout.max_elevation();
        render_view(
            &mut self.collision,
            blocks,
            width,
            height,
            force_full,
            |img, block, bx, by| {
                draw_collision_cell(img, pair, block, bx, by, config, max_elevation);
            },
        )
    }

    pub fn collision_image(&self) -> Option<&RgbaImage> {
        self.collision.as_ref().map(|v| &v.image)
    }

    /// Border view: the border pattern tiled `config.border_distance`
    /// cells around the map edge, anchored at the map origin. The interior
    /// rectangle stays transparent; the map view covers it.
    #[allow(clippy::too_many_arguments)]
    pub fn render_border(
        &mut self,
        border: &[Block],
        border_width: usize,
        border_height: usize,
        map_width: usize,
        map_height: usize,
        pair: &TilesetPair,
        config: &RenderConfig,
        force_full: bool,
    ) -> usize {
        let distance = config.border_distance;
        let grid_w = map_width + 2 * distance;
        let grid_h = map_height + 2 * distance;
        let buf_w = (grid_w * METATILE_PX) as u32;
        let buf_h = (grid_h * METATILE_PX) as u32;
        if border_width == 0 || border_height == 0 {
            self.border = None;
            return 0;
        }
        debug_assert_eq!(border.len(), border_width * border_height);

        let mut view = match self.border.take() {
            Some(v)
                if v.width == border_width
                    && v.height == border_height
                    && v.image.width() == buf_w
                    && v.image.height() == buf_h =>
            {
                v
            }
            _ => CachedView {
                blocks: Vec::new(),
                width: border_width,
                height: border_height,
                image: RgbaImage::new(buf_w, buf_h),
            },
        };

        let cache_valid = view.blocks.len() == border.len();
        let mut dirty = vec![false; border.len()];
        let mut any_dirty = false;
        for (i, block) in border.iter().enumerate() {
            if force_full || !cache_valid || view.blocks[i] != *block {
                dirty[i] = true;
                any_dirty = true;
            }
        }

        let mut redrawn = 0;
        for gy in 0..grid_h {
            for gx in 0..grid_w {
                let inside = gx >= distance
                    && gx < distance + map_width
                    && gy >= distance
                    && gy < distance + map_height;
                if inside {
                    continue;
                }
                let sx = (gx as isize - distance as isize).rem_euclid(border_width as isize);
                let sy = (gy as isize - distance as isize).rem_euclid(border_height as isize);
                let src = sy as usize * border_width + sx as usize;
                if !dirty[src] {
                    continue;
                }
                draw_cell(
                    &mut view.image,
                    pair,
                    border[src].metatile_id,
                    gx * METATILE_PX,
                    gy * METATILE_PX,
                    config,
                );
                redrawn += 1;
            }
        }

        if any_dirty {
            view.blocks = border.to_vec();
        }
        self.border = Some(view);
        redrawn
    }

    pub fn border_image(&self) -> Option<&RgbaImage> {
        self.border.as_ref().map(|v| &v.image)
    }
}

/// Shared diff-and-redraw skeleton for the cell-aligned views.
fn render_view<F>(
    slot: &mut Option<CachedView>,
    blocks: &[Block],
    width: usize,
    height: usize,
    force_full: bool,
    mut draw: F,
) -> usize
where
    F: FnMut(&mut RgbaImage, &Block, usize, usize),
{
    if width == 0 || height == 0 {
        *slot = None;
        return 0;
    }
    debug_assert_eq!(blocks.len(), width * height);
    let buf_w = (width * METATILE_PX) as u32;
    let buf_h = (height * METATILE_PX) as u32;

    let mut view = match slot.take() {
        Some(v)
            if v.width == width
                && v.height == height
                && v.image.width() == buf_w
                && v.image.height() == buf_h =>
        {
            v
        }
        _ => CachedView {
            blocks: Vec::new(),
            width,
            height,
            image: RgbaImage::new(buf_w, buf_h),
        },
    };

    let cache_valid = view.blocks.len() == blocks.len();
    let mut redrawn = 0;
    for (i, block) in blocks.iter().enumerate() {
        let clean = !force_full && cache_valid && view.blocks[i] == *block;
        if clean {
            continue;
        }
        let bx = (i % width) * METATILE_PX;
        let by = (i / width) * METATILE_PX;
        draw(&mut view.image, block, bx, by);
        redrawn += 1;
    }
    // Snapshot the input so the next diff runs against this render.
    if redrawn > 0 {
        view.blocks = blocks.to_vec();
    }
    *slot = Some(view);
    redrawn
}

fn draw_collision_cell(
    img: &mut RgbaImage,
    pair: &TilesetPair,
    block: &Block,
    bx: usize,
    by: usize,
    config: &RenderConfig,
    max_elevation: u16,
) {
    draw_cell(img, pair, block.metatile_id, bx, by, config);

    let max = max_elevation.max(1);
    let elevation = block.elevation;
    if elevation > 0 {
        let value = (255 * elevation.min(max) as u32 / max as u32) as u8;
        if elevation >= max {
            tint_rect(img, bx, by, Rgba([value, value, value, 128]), false);
        } else {
            tint_rect(img, bx, by, Rgba([value, value, value, 255]), true);
        }
    }
    tint_rect(img, bx, by, collision_color(block.collision), false);
    draw_number(img, block.elevation as usize, bx + 1, by + 1);
}

/// Walkable cells get a faint green; anything else a stronger hue picked
/// by the collision value.
fn collision_color(collision: u16) -> Rgba<u8> {
    const HUES: [[u8; 3]; 3] = [[224, 32, 32], [32, 64, 224], [224, 160, 32]];
    if collision == 0 {
        Rgba([32, 224, 32, 56])
    } else {
        let [r, g, b] = HUES[(collision as usize - 1) % HUES.len()];
        Rgba([r, g, b, 120])
    }
}

/// Source-over of a tint onto the (opaque) cell beneath; `overlay`
/// switches to the contrast-doubling overlay blend used for elevation
/// shading.
fn tint_rect(img: &mut RgbaImage, x: usize, y: usize, color: Rgba<u8>, overlay: bool) {
    for py in y..y + METATILE_PX {
        for px in x..x + METATILE_PX {
            if (px as u32) < img.width() && (py as u32) < img.height() {
                let dst = *img.get_pixel(px as u32, py as u32);
                let out = if overlay {
                    blend_overlay(dst, color)
                } else {
                    blend_over(dst, color)
                };
                img.put_pixel(px as u32, py as u32, out);
            }
        }
    }
}

fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as u32;
    if sa == 0 {
        return dst;
    }
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * (255 - sa)) / 255) as u8;
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        dst[3].max(src[3]),
    ])
}

fn blend_overlay(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let chan = |d: u8, s: u8| {
        let (d, s) = (d as u32, s as u32);
        let v = if d < 128 {
            2 * d * s / 255
        } else {
            255 - 2 * (255 - d) * (255 - s) / 255
        };
        v as u8
    };
    Rgba([
        chan(dst[0], src[0]),
        chan(dst[1], src[1]),
        chan(dst[2], src[2]),
        dst[3].max(src[3]),
    ])
}

/// 3x5 digit glyphs, one row mask per line, bit 2 = leftmost column.
const DIGIT_ROWS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b011, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

fn draw_number(img: &mut RgbaImage, value: usize, x: usize, y: usize) {
    for (k, ch) in value.to_string().bytes().enumerate() {
        draw_digit(img, (ch - b'0') as usize, x + k * 4, y);
    }
}

fn draw_digit(img: &mut RgbaImage, digit: usize, x: usize, y: usize) {
    for (row, bits) in DIGIT_ROWS[digit].iter().enumerate() {
        for col in 0..3 {
            if bits & (0b100 >> col) != 0 {
                let ox = (x + col) as u32;
                let oy = (y + row) as u32;
                if ox < img.width() && oy < img.height() {
                    img.put_pixel(ox, oy, Rgba([255, 255, 255, 255]));
                }
            }
        }
    }
}
