//! # Chunk Module
//!
//! This module provides [`ChunkVoxelData`], the dense block array behind every chunk.
//!
//! ## Layout
//!
//! Cells are stored in a flat vector in X-fastest order, then Z, then Y:
//! `index = x + width * (z + depth * y)`. A horizontal slice of the chunk is
//! therefore contiguous, which keeps the top-down column fill and the face
//! scan of the mesher cache friendly.
//!
//! Every cell is always populated. Air is stored as `BlockType::Air`.

use super::block::block_type::BlockType;
use super::coordinates::{ChunkDimensions, LocalBlockPosition};

pub mod chunk_iteration;

use chunk_iteration::SolidBlockIterator;

/// Dense 3D array of block types with fixed dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkVoxelData {
    dimensions: ChunkDimensions,
    blocks: Vec<BlockType>,
}

impl ChunkVoxelData {
    /// Creates a chunk filled entirely with air.
    pub fn new_air(dimensions: ChunkDimensions) -> Self {
        Self {
            dimensions,
            blocks: vec![BlockType::Air; dimensions.volume()],
        }
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Every cell in storage order.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dimensions.width * (z + self.dimensions.depth * y)
    }

    /// Gets the block at the given cell.
    ///
    /// # Panics
    /// Panics if the cell is outside the chunk.
    pub fn get(&self, local: LocalBlockPosition) -> BlockType {
        self.get_xyz(local.x, local.y, local.z)
    }

    /// Sets the block at the given cell.
    ///
    /// # Panics
    /// Panics if the cell is outside the chunk.
    pub fn set(&mut self, local: LocalBlockPosition, block: BlockType) {
        self.set_xyz(local.x, local.y, local.z, block)
    }

    pub fn get_xyz(&self, x: usize, y: usize, z: usize) -> BlockType {
        self.blocks[self.index(x, y, z)]
    }

    pub fn set_xyz(&mut self, x: usize, y: usize, z: usize, block: BlockType) {
        let index = self.index(x, y, z);
        self.blocks[index] = block;
    }

    /// Gets a block from signed local coordinates.
    ///
    /// # Returns
    /// `None` if the coordinates fall outside the chunk.
    pub fn try_get(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let local = LocalBlockPosition::new(x as usize, y as usize, z as usize);
        self.dimensions.contains(local).then(|| self.get(local))
    }

    /// The y of the highest non-air cell in a column.
    pub fn surface_height(&self, x: usize, z: usize) -> Option<usize> {
        (0..self.dimensions.height)
            .rev()
            .find(|&y| !self.get_xyz(x, y, z).is_air())
    }

    /// Copies every non-air cell of `other` over this chunk.
    ///
    /// # Returns
    /// The number of cells written, or `None` if the dimensions differ.
    pub fn overlay(&mut self, other: &ChunkVoxelData) -> Option<usize> {
        if other.dimensions != self.dimensions {
            return None;
        }
        let mut written = 0;
        for (target, source) in self.blocks.iter_mut().zip(other.blocks.iter()) {
            if !source.is_air() {
                *target = *source;
                written += 1;
            }
        }
        Some(written)
    }

    pub fn count_non_air(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_air()).count()
    }

    /// Iterates over every non-air cell with its position.
    pub fn solid_blocks(&self) -> SolidBlockIterator<'_> {
        SolidBlockIterator::new(self)
    }
}
