//! # Paint Selections
//!
//! What the user paints with: a grid of metatile ids (the normal
//! selection, leaving collision and elevation alone) or a full block grid
//! lifted from the map (a stamp). Painting over an area larger than the
//! selection repeats the pattern; cells outside the map clip away.

use crate::block::{Block, BlockLayout};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Grid of metatile ids; collision and elevation are left untouched.
    Metatiles {
        width: usize,
        height: usize,
        metatile_ids: Vec<u16>,
    },
    /// Full block grid stamped verbatim.
    Stamp {
        width: usize,
        height: usize,
        blocks: Vec<Block>,
    },
}

impl Selection {
    /// `None` when the grid does not match its dimensions.
    pub fn metatiles(width: usize, height: usize, metatile_ids: Vec<u16>) -> Option<Selection> {
        (width * height == metatile_ids.len() && !metatile_ids.is_empty()).then_some(
            Selection::Metatiles {
                width,
                height,
                metatile_ids,
            },
        )
    }

    pub fn stamp(width: usize, height: usize, blocks: Vec<Block>) -> Option<Selection> {
        (width * height == blocks.len() && !blocks.is_empty()).then_some(Selection::Stamp {
            width,
            height,
            blocks,
        })
    }

    pub fn width(&self) -> usize {
        match self {
            Selection::Metatiles { width, .. } | Selection::Stamp { width, .. } => *width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Selection::Metatiles { height, .. } | Selection::Stamp { height, .. } => *height,
        }
    }

    fn apply_at(&self, cell: &mut Block, sx: usize, sy: usize, layout: &BlockLayout) -> bool {
        match self {
            Selection::Metatiles {
                width,
                metatile_ids,
                ..
            } => {
                let id = layout.clamp_metatile_id(metatile_ids[sy * width + sx]);
                if cell.metatile_id != id {
                    cell.metatile_id = id;
                    true
                } else {
                    false
                }
            }
            Selection::Stamp { width, blocks, .. } => {
                let block = blocks[sy * width + sx];
                if *cell != block {
                    *cell = block;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Paints the selection pattern over `area_w x area_h` cells anchored
    /// at (x, y), repeating modulo the selection size. Returns whether any
    /// cell changed.
    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &self,
        blocks: &mut [Block],
        map_width: usize,
        map_height: usize,
        x: isize,
        y: isize,
        area_w: usize,
        area_h: usize,
        layout: &BlockLayout,
    ) -> bool {
        let (sel_w, sel_h) = (self.width(), self.height());
        if sel_w == 0 || sel_h == 0 {
            return false;
        }
        let mut changed = false;
        for dy in 0..area_h {
            for dx in 0..area_w {
                let mx = x + dx as isize;
                let my = y + dy as isize;
                if mx < 0 || my < 0 || mx >= map_width as isize || my >= map_height as isize {
                    continue;
                }
                let sx = dx % sel_w;
                let sy = dy % sel_h;
                let idx = my as usize * map_width + mx as usize;
                if self.apply_at(&mut blocks[idx], sx, sy, layout) {
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ids: &[u16]) -> Vec<Block> {
        ids.iter()
            .map(|&id| Block {
                metatile_id: id,
                collision: 0,
                elevation: 0,
            })
            .collect()
    }

    #[test]
    fn pattern_repeats_across_the_painted_area() {
        let layout = BlockLayout::vanilla();
        let selection = Selection::metatiles(2, 1, vec![7, 8]).unwrap();
        let mut blocks = row(&[0, 0, 0, 0]);
        assert!(selection.paint(&mut blocks, 4, 1, 0, 0, 4, 1, &layout));
        let ids: Vec<u16> = blocks.iter().map(|b| b.metatile_id).collect();
        assert_eq!(ids, vec![7, 8, 7, 8]);
    }

    #[test]
    fn metatile_selection_preserves_movement_fields() {
        let layout = BlockLayout::vanilla();
        let selection = Selection::metatiles(1, 1, vec![5]).unwrap();
        let mut blocks = row(&[0]);
        blocks[0].collision = 1;
        blocks[0].elevation = 3;
        assert!(selection.paint(&mut blocks, 1, 1, 0, 0, 1, 1, &layout));
        assert_eq!(blocks[0].metatile_id, 5);
        assert_eq!(blocks[0].collision, 1);
        assert_eq!(blocks[0].elevation, 3);
    }

    #[test]
    fn stamp_writes_all_fields() {
        let layout = BlockLayout::vanilla();
        let stamp_block = Block {
            metatile_id: 9,
            collision: 2,
            elevation: 4,
        };
        let selection = Selection::stamp(1, 1, vec![stamp_block]).unwrap();
        let mut blocks = row(&[0]);
        assert!(selection.paint(&mut blocks, 1, 1, 0, 0, 1, 1, &layout));
        assert_eq!(blocks[0], stamp_block);
    }

    #[test]
    fn painting_clips_at_the_map_edge() {
        let layout = BlockLayout::vanilla();
        let selection = Selection::metatiles(2, 2, vec![1, 2, 3, 4]).unwrap();
        let mut blocks = row(&[0, 0, 0, 0]);
        // Anchored one cell up-left of the map: only the selection's
        // lower-right quarter lands.
        assert!(selection.paint(&mut blocks, 2, 2, -1, -1, 2, 2, &layout));
        let ids: Vec<u16> = blocks.iter().map(|b| b.metatile_id).collect();
        assert_eq!(ids, vec![4, 0, 0, 0]);
    }

    #[test]
    fn repainting_identical_content_reports_no_change() {
        let layout = BlockLayout::vanilla();
        let selection = Selection::metatiles(1, 1, vec![6]).unwrap();
        let mut blocks = row(&[6]);
        assert!(!selection.paint(&mut blocks, 1, 1, 0, 0, 1, 1, &layout));
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        assert!(Selection::metatiles(2, 2, vec![1, 2, 3]).is_none());
        assert!(Selection::stamp(1, 1, vec![]).is_none());
    }
}
