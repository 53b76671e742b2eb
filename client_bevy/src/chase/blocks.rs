use std::collections::HashMap;

use blockverse_shared::protocol::BlockId;
use blockverse_shared::vec3::{BlockPos, Vec3};

/// Placed blocks of a voxel world, keyed by lattice cell.
#[derive(Debug)]
pub struct BlockMap<H> {
    cells: HashMap<BlockPos, (BlockId, H)>,
}

impl<H> Default for BlockMap<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// What applying a mutation did to the map.
#[derive(Debug, PartialEq)]
pub enum BlockChange<H> {
    Unchanged,
    Placed,
    /// The cell held a different block; its handle needs releasing.
    Replaced(H),
    Removed(H),
}

impl<H> BlockMap<H> {
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Put `block_id` at `pos`. Re-placing the same block is a no-op and
    /// does not call `spawn`.
    pub fn place_with(
        &mut self,
        pos: BlockPos,
        block_id: BlockId,
        spawn: impl FnOnce() -> H,
    ) -> BlockChange<H> {
        if let Some((existing, _)) = self.cells.get(&pos) {
            if *existing == block_id {
                return BlockChange::Unchanged;
            }
        }
        match self.cells.insert(pos, (block_id, spawn())) {
            Some((_, old)) => BlockChange::Replaced(old),
            None => BlockChange::Placed,
        }
    }

    /// Clear `pos`. Destroying an empty cell is a no-op.
    pub fn destroy(&mut self, pos: BlockPos) -> BlockChange<H> {
        match self.cells.remove(&pos) {
            Some((_, handle)) => BlockChange::Removed(handle),
            None => BlockChange::Unchanged,
        }
    }

    pub fn get(&self, pos: BlockPos) -> Option<BlockId> {
        self.cells.get(&pos).map(|(id, _)| *id)
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.cells.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn drain(&mut self) -> Vec<H> {
        self.cells.drain().map(|(_, (_, h))| h).collect()
    }
}

/// Lattice cell one unit ahead of `position` along `yaw` at foot level.
pub fn cell_in_front(position: Vec3, yaw: f64) -> BlockPos {
    BlockPos::containing(Vec3::new(
        position.x + yaw.sin(),
        position.y,
        position.z + yaw.cos(),
    ))
}
