//! # Map Layout State
//!
//! Owns the live cell buffers (map and border) plus the edit history, and
//! wires every mutator to exactly one history commit when it changed
//! something. Undo and redo replace the map Blockdata wholesale from the
//! restored snapshot.

use crate::block::{Block, BlockLayout, Blockdata};
use crate::edit::fill::{flood_fill, magic_fill, FillTarget};
use crate::edit::history::{EditHistory, HistoryEntry};
use crate::edit::paint::Selection;

pub struct MapLayout {
    width: usize,
    height: usize,
    blocks: Blockdata,
    border_width: usize,
    border_height: usize,
    border: Blockdata,
    history: EditHistory,
}

impl MapLayout {
    /// New layout with every map cell set to `fill` and every border cell
    /// to `border_fill`. The initial state becomes the first history
    /// entry, so the first user edit is undoable.
    pub fn new(
        width: usize,
        height: usize,
        fill: Block,
        border_width: usize,
        border_height: usize,
        border_fill: Block,
    ) -> Self {
        let mut layout = MapLayout {
            width,
            height,
            blocks: vec![fill; width * height],
            border_width,
            border_height,
            border: vec![border_fill; border_width * border_height],
            history: EditHistory::new(),
        };
        layout.commit("new map");
        layout
    }

    /// Wraps already-loaded buffers. `None` when a buffer length does not
    /// match its dimensions.
    pub fn from_blockdata(
        width: usize,
        height: usize,
        blocks: Blockdata,
        border_width: usize,
        border_height: usize,
        border: Blockdata,
    ) -> Option<Self> {
        if blocks.len() != width * height || border.len() != border_width * border_height {
            return None;
        }
        let mut layout = MapLayout {
            width,
            height,
            blocks,
            border_width,
            border_height,
            border,
            history: EditHistory::new(),
        };
        layout.commit("load map");
        Some(layout)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn border_width(&self) -> usize {
        self.border_width
    }

    pub fn border_height(&self) -> usize {
        self.border_height
    }

    pub fn border(&self) -> &[Block] {
        &self.border
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn block_at(&self, x: usize, y: usize) -> Option<Block> {
        if x < self.width && y < self.height {
            Some(self.blocks[y * self.width + x])
        } else {
            None
        }
    }

    fn commit(&mut self, message: &str) {
        self.history.commit(HistoryEntry {
            blocks: self.blocks.clone(),
            width: self.width,
            height: self.height,
            message: message.into(),
        });
    }

    /// Sets one cell, committing when it actually changed.
    pub fn set_block(&mut self, x: usize, y: usize, block: Block) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y * self.width + x;
        if self.blocks[idx] == block {
            return false;
        }
        self.blocks[idx] = block;
        self.commit("paint block");
        true
    }

    /// Sets one border cell. Border content is not tracked by the map
    /// history; the border buffer is tiny and repainting it is cheap.
    pub fn set_border_block(&mut self, x: usize, y: usize, block: Block) -> bool {
        if x >= self.border_width || y >= self.border_height {
            return false;
        }
        let idx = y * self.border_width + x;
        if self.border[idx] == block {
            return false;
        }
        self.border[idx] = block;
        true
    }

    /// Applies a selection over `area_w x area_h` cells anchored at
    /// (x, y); one commit for the whole stroke.
    pub fn paint(
        &mut self,
        selection: &Selection,
        x: isize,
        y: isize,
        area_w: usize,
        area_h: usize,
        layout: &BlockLayout,
    ) -> bool {
        let changed = selection.paint(
            &mut self.blocks,
            self.width,
            self.height,
            x,
            y,
            area_w,
            area_h,
            layout,
        );
        if changed {
            self.commit("paint");
        }
        changed
    }

    pub fn flood_fill(
        &mut self,
        x: usize,
        y: usize,
        target: FillTarget,
        layout: &BlockLayout,
    ) -> bool {
        let changed = flood_fill(&mut self.blocks, self.width, self.height, x, y, target, layout);
        if changed {
            self.commit(fill_message(target, false));
        }
        changed
    }

    pub fn magic_fill(
        &mut self,
        x: usize,
        y: usize,
        target: FillTarget,
        layout: &BlockLayout,
    ) -> bool {
        let changed = magic_fill(&mut self.blocks, self.width, self.height, x, y, target, layout);
        if changed {
            self.commit(fill_message(target, true));
        }
        changed
    }

    pub fn flood_fill_metatile(
        &mut self,
        x: usize,
        y: usize,
        metatile_id: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.flood_fill(x, y, FillTarget::Metatile(metatile_id), layout)
    }

    pub fn flood_fill_collision(
        &mut self,
        x: usize,
        y: usize,
        collision: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.flood_fill(x, y, FillTarget::Collision(collision), layout)
    }

    pub fn flood_fill_elevation(
        &mut self,
        x: usize,
        y: usize,
        elevation: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.flood_fill(x, y, FillTarget::Elevation(elevation), layout)
    }

    pub fn flood_fill_collision_elevation(
        &mut self,
        x: usize,
        y: usize,
        collision: u16,
        elevation: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.flood_fill(x, y, FillTarget::CollisionElevation(collision, elevation), layout)
    }

    pub fn magic_fill_metatile(
        &mut self,
        x: usize,
        y: usize,
        metatile_id: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.magic_fill(x, y, FillTarget::Metatile(metatile_id), layout)
    }

    pub fn magic_fill_collision(
        &mut self,
        x: usize,
        y: usize,
        collision: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.magic_fill(x, y, FillTarget::Collision(collision), layout)
    }

    pub fn magic_fill_elevation(
        &mut self,
        x: usize,
        y: usize,
        elevation: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.magic_fill(x, y, FillTarget::Elevation(elevation), layout)
    }

    pub fn magic_fill_collision_elevation(
        &mut self,
        x: usize,
        y: usize,
        collision: u16,
        elevation: u16,
        layout: &BlockLayout,
    ) -> bool {
        self.magic_fill(x, y, FillTarget::CollisionElevation(collision, elevation), layout)
    }

    /// Changes the map dimensions, preserving the overlapping region and
    /// filling vacated cells with `fill`. One commit.
    pub fn resize(&mut self, new_width: usize, new_height: usize, fill: Block) -> bool {
        if new_width == 0 || new_height == 0 {
            return false;
        }
        if new_width == self.width && new_height == self.height {
            return false;
        }
        let mut blocks = vec![fill; new_width * new_height];
        for y in 0..self.height.min(new_height) {
            for x in 0..self.width.min(new_width) {
                blocks[y * new_width + x] = self.blocks[y * self.width + x];
            }
        }
        self.blocks = blocks;
        self.width = new_width;
        self.height = new_height;
        self.commit("resize map");
        true
    }

    /// Restores the previous snapshot. `false` at the initial state.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(entry) => {
                self.blocks = entry.blocks.clone();
                self.width = entry.width;
                self.height = entry.height;
                true
            }
            None => false,
        }
    }

    /// Restores the next snapshot. `false` when nothing was undone.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(entry) => {
                self.blocks = entry.blocks.clone();
                self.width = entry.width;
                self.height = entry.height;
                true
            }
            None => false,
        }
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn is_saved(&self) -> bool {
        self.history.is_saved()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

fn fill_message(target: FillTarget, magic: bool) -> &'static str {
    match (target, magic) {
        (FillTarget::Metatile(_), false) => "flood fill metatiles",
        (FillTarget::Collision(_), false) => "flood fill collision",
        (FillTarget::Elevation(_), false) => "flood fill elevation",
        (FillTarget::CollisionElevation(..), false) => "flood fill collision and elevation",
        (FillTarget::Metatile(_), true) => "magic fill metatiles",
        (FillTarget::Collision(_), true) => "magic fill collision",
        (FillTarget::Elevation(_), true) => "magic fill elevation",
        (FillTarget::CollisionElevation(..), true) => "magic fill collision and elevation",
    }
}
