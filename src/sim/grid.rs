//! Grid occupancy and active-block bookkeeping
//!
//! The [`GridMap`] owns every block for the stage lifetime in an arena
//! indexed by [`BlockId`]; cells store ids, never live references. A block
//! is either resident in exactly one cell or a member of the active set
//! (mid-flight between cells), never both and never neither. Occupancy
//! queries always see that either/or truth: an in-flight block neither
//! blocks nor is blocked-against at its stale cell.

use serde::{Deserialize, Serialize};

use super::movement::AnimationState;
use super::object::{Block, BlockProps};

/// Stable arena index for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub(crate) u32);

/// Active-set membership change, drained by the observer after each step
/// so a visual representation can be attached or detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    BlockActivated(BlockId),
    BlockDeactivated(BlockId),
}

/// The tile grid: dimensions, tile size, cell occupancy, block arena and
/// the set of currently animating (off-grid) blocks.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: u32,
    height: u32,
    tile_width: f32,
    tile_height: f32,
    /// Row-major `Option<BlockId>` per cell
    cells: Vec<Option<BlockId>>,
    blocks: Vec<Block>,
    active: Vec<BlockId>,
    events: Vec<GridEvent>,
}

impl GridMap {
    pub fn new(width: u32, height: u32, tile_width: f32, tile_height: f32) -> GridMap {
        GridMap {
            width,
            height,
            tile_width,
            tile_height,
            cells: vec![None; (width * height) as usize],
            blocks: Vec::new(),
            active: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    fn cell_index(&self, x: i32, y: i32) -> usize {
        (y as u32 * self.width + x as u32) as usize
    }

    /// Create a block resident at `(x, y)`. Stage-load only; the cell must
    /// be in bounds and vacant (validated by the map loader).
    pub fn insert_block(&mut self, x: i32, y: i32, props: BlockProps) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block {
            id,
            x,
            y,
            props,
            lifted: false,
            anim: AnimationState::NONE,
        });
        let idx = self.cell_index(x, y);
        self.cells[idx] = Some(id);
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0 as usize]
    }

    /// Resident block at a cell. Out-of-range cells hold nothing.
    pub fn block_at(&self, x: i32, y: i32) -> Option<BlockId> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells[self.cell_index(x, y)]
    }

    pub fn has_block(&self, x: i32, y: i32) -> bool {
        self.block_at(x, y).is_some()
    }

    /// True iff a resident block at `(x, y)` is solid. Out-of-range is
    /// never solid, so collision checks near map edges never fail.
    pub fn has_solid(&self, x: i32, y: i32) -> bool {
        self.block_at(x, y)
            .is_some_and(|id| self.block(id).is_solid())
    }

    /// Write a cell. Writing a block occupies the cell, updates the block's
    /// own coordinates, and removes it from the active set; writing `None`
    /// vacates. Out-of-bounds writes are rejected (returns `false`) and
    /// logged: map data pointing outside the grid is a defect worth seeing.
    /// Writing a block over a different resident block is likewise rejected,
    /// so no block can be silently orphaned from all occupancy queries.
    pub fn set(&mut self, x: i32, y: i32, block: Option<BlockId>) -> bool {
        if !self.in_bounds(x, y) {
            log::warn!("rejected grid write at ({x}, {y}): outside {}x{}", self.width, self.height);
            return false;
        }
        let idx = self.cell_index(x, y);
        match block {
            Some(id) => {
                if let Some(existing) = self.cells[idx]
                    && existing != id
                {
                    log::warn!("rejected grid write at ({x}, {y}): cell holds {existing:?}");
                    return false;
                }
                self.cells[idx] = Some(id);
                let b = self.block_mut(id);
                b.x = x;
                b.y = y;
                self.deactivate(id);
            }
            None => self.cells[idx] = None,
        }
        true
    }

    /// Move a resident block into the active set, vacating its cell.
    /// No-op if the block is already active.
    pub fn activate(&mut self, id: BlockId) {
        if self.is_active(id) {
            return;
        }
        let (x, y) = {
            let b = self.block(id);
            (b.x, b.y)
        };
        if self.block_at(x, y) == Some(id) {
            let idx = self.cell_index(x, y);
            self.cells[idx] = None;
        }
        self.active.push(id);
        self.events.push(GridEvent::BlockActivated(id));
    }

    fn deactivate(&mut self, id: BlockId) {
        if let Some(pos) = self.active.iter().position(|&a| a == id) {
            self.active.swap_remove(pos);
            self.events.push(GridEvent::BlockDeactivated(id));
        }
    }

    pub fn is_active(&self, id: BlockId) -> bool {
        self.active.contains(&id)
    }

    /// Advance every active block's animation; blocks whose animation
    /// terminates are re-inserted at their destination cell with the
    /// animation cleared. This is the sole mechanism by which a block's
    /// logical grid position changes. Already-terminal blocks were removed
    /// from the active set when re-inserted, so completion is idempotent.
    pub fn advance_active(&mut self, dt: f32) {
        let mut completed = Vec::new();
        for &id in &self.active {
            let block = &mut self.blocks[id.0 as usize];
            block.anim.update(dt);
            if block.anim.is_done() {
                completed.push(id);
            }
        }
        for id in completed {
            let (ox, oy, dx, dy) = {
                let b = self.block(id);
                let (dx, dy) = b.anim.movement().total_offset();
                (b.x, b.y, dx, dy)
            };
            // An out-of-range or since-occupied destination falls back to
            // the origin cell; if that was taken too the block stays active
            // and retries next step. Either way it remains exactly one of
            // resident or active.
            if self.set(ox + dx, oy + dy, Some(id)) || self.set(ox, oy, Some(id)) {
                self.block_mut(id).anim = AnimationState::NONE;
            }
        }
    }

    /// Ids of blocks currently animating outside the grid
    pub fn active_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.active.iter().copied()
    }

    /// Ids of blocks currently resident in a grid cell
    pub fn resident_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks
            .iter()
            .filter(|b| !self.is_active(b.id))
            .map(|b| b.id)
    }

    /// All blocks, resident and active
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Drain active-set change notifications accumulated since last drain
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }
}
