//! # World Module
//!
//! This module provides the `World` struct, the single owner of all shared voxel state:
//!
//! * the [`ChunkDataStore`] of committed chunk data,
//! * the [`PendingOverlays`] waiting for their chunk to be generated,
//! * the registry of active (materialized) chunks.
//!
//! The world is only ever touched from the cooperative thread that drives
//! [`TerrainState::on_tick`](crate::terrain_state::TerrainState::on_tick).
//! Background generation works on its own freshly allocated arrays and hands
//! them back for commit, so none of this state is locked.

use std::collections::HashMap;

use cgmath::Point3;

use crate::terrain_state::meshing::RenderableChunk;

use super::block::block_type::BlockType;
use super::chunk_store::ChunkDataStore;
use super::coordinates::{ChunkCoordinate, ChunkDimensions};
use super::overlay::PendingOverlays;

pub struct World {
    dimensions: ChunkDimensions,
    chunks: ChunkDataStore,
    overlays: PendingOverlays,
    active_chunks: HashMap<ChunkCoordinate, RenderableChunk>,
}

impl World {
    /// Creates a new, empty world.
    pub fn new(dimensions: ChunkDimensions) -> Self {
        World {
            dimensions,
            chunks: ChunkDataStore::new(),
            overlays: PendingOverlays::new(),
            active_chunks: HashMap::new(),
        }
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    pub fn chunks(&self) -> &ChunkDataStore {
        &self.chunks
    }

    pub fn chunks_mut(&mut self) -> &mut ChunkDataStore {
        &mut self.chunks
    }

    pub fn overlays(&self) -> &PendingOverlays {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut PendingOverlays {
        &mut self.overlays
    }

    /// The active chunk registry: a coordinate is present iff it is materialized.
    pub fn active_chunks(&self) -> &HashMap<ChunkCoordinate, RenderableChunk> {
        &self.active_chunks
    }

    pub fn is_active(&self, coordinate: ChunkCoordinate) -> bool {
        self.active_chunks.contains_key(&coordinate)
    }

    pub(crate) fn activate(&mut self, chunk: RenderableChunk) -> Option<RenderableChunk> {
        self.active_chunks.insert(chunk.coordinate(), chunk)
    }

    pub(crate) fn deactivate(&mut self, coordinate: ChunkCoordinate) -> Option<RenderableChunk> {
        self.active_chunks.remove(&coordinate)
    }

    pub(crate) fn active_chunk_mut(
        &mut self,
        coordinate: ChunkCoordinate,
    ) -> Option<&mut RenderableChunk> {
        self.active_chunks.get_mut(&coordinate)
    }

    /// Reads the block at a world position.
    ///
    /// # Returns
    /// `None` if the owning chunk has not been generated or the position is
    /// outside the vertical extent.
    pub fn get_block(&self, position: Point3<i32>) -> Option<BlockType> {
        let (coordinate, local) = self.dimensions.world_to_local(position)?;
        self.chunks.get(coordinate).map(|chunk| chunk.get(local))
    }

    /// Applies the out-of-chunk writes of a finished generation task.
    ///
    /// Writes aimed at a chunk that is already committed are copied straight
    /// into its data; the rest join that chunk's pending overlay.
    ///
    /// # Returns
    /// The committed chunks that were modified and need a mesh refresh.
    pub fn merge_neighbor_writes(&mut self, mut writes: PendingOverlays) -> Vec<ChunkCoordinate> {
        let mut modified = Vec::new();
        for (coordinate, data) in writes.drain() {
            match self.chunks.get_mut(coordinate) {
                Some(committed) => match committed.overlay(&data) {
                    Some(written) if written > 0 => modified.push(coordinate),
                    Some(_) => {}
                    None => log::warn!(
                        "Dropping neighbour writes for chunk {:?}: mismatched dimensions",
                        coordinate
                    ),
                },
                None => self.overlays.merge(coordinate, data),
            }
        }
        modified
    }
}
