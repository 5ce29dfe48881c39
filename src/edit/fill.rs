//! # Region Fills
//!
//! Four fill variants share one BFS skeleton; they differ only in which
//! fields they match and write. Matching is always against the values
//! captured at the start cell. Cells re-test on pop because a coordinate
//! can be queued more than once and may have been mutated in between;
//! neighbors are pushed unconditionally for the same reason.

use std::collections::VecDeque;

use crate::block::{Block, BlockLayout};

/// Which fields a fill matches on and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillTarget {
    Metatile(u16),
    Collision(u16),
    Elevation(u16),
    CollisionElevation(u16, u16),
}

impl FillTarget {
    /// Clamps the new value(s) into the layout's field ranges.
    pub fn clamped(self, layout: &BlockLayout) -> FillTarget {
        match self {
            FillTarget::Metatile(v) => FillTarget::Metatile(layout.clamp_metatile_id(v)),
            FillTarget::Collision(v) => FillTarget::Collision(layout.clamp_collision(v)),
            FillTarget::Elevation(v) => FillTarget::Elevation(layout.clamp_elevation(v)),
            FillTarget::CollisionElevation(c, e) => {
                FillTarget::CollisionElevation(layout.clamp_collision(c), layout.clamp_elevation(e))
            }
        }
    }

    /// Whether `cell` still carries the origin's values for the targeted
    /// fields.
    fn matches(&self, cell: &Block, origin: &Block) -> bool {
        match self {
            FillTarget::Metatile(_) => cell.metatile_id == origin.metatile_id,
            FillTarget::Collision(_) => cell.collision == origin.collision,
            FillTarget::Elevation(_) => cell.elevation == origin.elevation,
            FillTarget::CollisionElevation(..) => {
                cell.collision == origin.collision && cell.elevation == origin.elevation
            }
        }
    }

    fn apply(&self, cell: &mut Block) {
        match *self {
            FillTarget::Metatile(v) => cell.metatile_id = v,
            FillTarget::Collision(v) => cell.collision = v,
            FillTarget::Elevation(v) => cell.elevation = v,
            FillTarget::CollisionElevation(c, e) => {
                cell.collision = c;
                cell.elevation = e;
            }
        }
    }

    /// A fill whose new value equals the origin cannot change anything.
    fn is_noop(&self, origin: &Block) -> bool {
        match *self {
            FillTarget::Metatile(v) => origin.metatile_id == v,
            FillTarget::Collision(v) => origin.collision == v,
            FillTarget::Elevation(v) => origin.elevation == v,
            FillTarget::CollisionElevation(c, e) => {
                origin.collision == c && origin.elevation == e
            }
        }
    }
}

/// 4-connected flood fill from (x, y). Returns whether any cell changed.
pub fn flood_fill(
    blocks: &mut [Block],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    target: FillTarget,
    layout: &BlockLayout,
) -> bool {
    if width == 0 || height == 0 || x >= width || y >= height {
        return false;
    }
    debug_assert_eq!(blocks.len(), width * height);
    let target = target.clamped(layout);
    let origin = blocks[y * width + x];
    if target.is_noop(&origin) {
        return false;
    }

    let mut changed = false;
    let mut frontier = VecDeque::new();
    frontier.push_back((x as isize, y as isize));
    while let Some((cx, cy)) = frontier.pop_front() {
        if cx < 0 || cy < 0 || cx >= width as isize || cy >= height as isize {
            continue;
        }
        let idx = cy as usize * width + cx as usize;
        if !target.matches(&blocks[idx], &origin) {
            continue;
        }
        target.apply(&mut blocks[idx]);
        changed = true;
        frontier.push_back((cx + 1, cy));
        frontier.push_back((cx - 1, cy));
        frontier.push_back((cx, cy + 1));
        frontier.push_back((cx, cy - 1));
    }
    changed
}

/// Whole-map fill: replaces every cell carrying the start cell's values,
/// with no connectivity requirement.
pub fn magic_fill(
    blocks: &mut [Block],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    target: FillTarget,
    layout: &BlockLayout,
) -> bool {
    if width == 0 || height == 0 || x >= width || y >= height {
        return false;
    }
    debug_assert_eq!(blocks.len(), width * height);
    let target = target.clamped(layout);
    let origin = blocks[y * width + x];
    if target.is_noop(&origin) {
        return false;
    }

    let mut changed = false;
    for cell in blocks.iter_mut() {
        if target.matches(cell, &origin) {
            target.apply(cell);
            changed = true;
        }
    }
    changed
}
