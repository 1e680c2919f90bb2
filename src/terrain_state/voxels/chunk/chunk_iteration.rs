//! # Chunk Iteration Module
//!
//! An iterator over the non-air cells of a chunk, yielding each block together
//! with its local position. Air cells are skipped without being yielded.

use crate::terrain_state::voxels::block::block_type::BlockType;
use crate::terrain_state::voxels::coordinates::LocalBlockPosition;

use super::ChunkVoxelData;

/// An iterator over all non-air blocks in a chunk, in storage order.
pub struct SolidBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a ChunkVoxelData,
    /// Current position in the block vector
    current_offset: usize,
}

impl<'a> SolidBlockIterator<'a> {
    pub fn new(chunk_ref: &'a ChunkVoxelData) -> Self {
        SolidBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }

    fn position_of(&self, offset: usize) -> LocalBlockPosition {
        let dims = self.chunk_ref.dimensions();
        let x = offset % dims.width;
        let z = (offset / dims.width) % dims.depth;
        let y = offset / (dims.width * dims.depth);
        LocalBlockPosition::new(x, y, z)
    }
}

impl Iterator for SolidBlockIterator<'_> {
    type Item = (LocalBlockPosition, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < blocks.len() {
            let offset = self.current_offset;
            self.current_offset += 1;
            let block = blocks[offset];
            if !block.is_air() {
                return Some((self.position_of(offset), block));
            }
        }
        None
    }
}
