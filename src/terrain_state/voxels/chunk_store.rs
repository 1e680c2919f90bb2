//! # Chunk Data Store
//!
//! The authoritative voxel state: one committed [`ChunkVoxelData`] per chunk coordinate.
//! Entries are never evicted; leaving and re-entering an area reuses the stored data.

use std::collections::HashMap;

use super::chunk::ChunkVoxelData;
use super::coordinates::ChunkCoordinate;

#[derive(Default)]
pub struct ChunkDataStore {
    chunks: HashMap<ChunkCoordinate, ChunkVoxelData>,
}

impl ChunkDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, coordinate: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coordinate)
    }

    pub fn get(&self, coordinate: ChunkCoordinate) -> Option<&ChunkVoxelData> {
        self.chunks.get(&coordinate)
    }

    pub fn get_mut(&mut self, coordinate: ChunkCoordinate) -> Option<&mut ChunkVoxelData> {
        self.chunks.get_mut(&coordinate)
    }

    /// Commits freshly generated data.
    ///
    /// A coordinate is committed at most once: if data is already present the
    /// existing entry is kept and `data` is dropped.
    ///
    /// # Returns
    /// `true` if the data was inserted.
    pub fn commit(&mut self, coordinate: ChunkCoordinate, data: ChunkVoxelData) -> bool {
        if self.chunks.contains_key(&coordinate) {
            log::warn!(
                "Chunk {:?} already committed, discarding duplicate data",
                coordinate
            );
            return false;
        }
        self.chunks.insert(coordinate, data);
        true
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = &ChunkCoordinate> {
        self.chunks.keys()
    }
}
