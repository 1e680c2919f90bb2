//! # Pending Overlays
//!
//! Voxel data written into a chunk before that chunk has been generated, such
//! as the crown of a tree planted near a chunk edge. An overlay is taken, and
//! removed, exactly once: when its chunk's generation is dispatched, where it
//! becomes the base the column fill writes over.
//!
//! A generation task never touches the world's overlays. It records its
//! out-of-chunk writes in a task-local [`PendingOverlays`] which is merged on
//! the cooperative thread when the result is committed.

use std::collections::HashMap;

use crate::terrain_state::voxels::block::block_type::BlockType;

use super::chunk::ChunkVoxelData;
use super::coordinates::{ChunkCoordinate, ChunkDimensions, LocalBlockPosition};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingOverlays {
    overlays: HashMap<ChunkCoordinate, ChunkVoxelData>,
}

impl PendingOverlays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, coordinate: ChunkCoordinate) -> bool {
        self.overlays.contains_key(&coordinate)
    }

    pub fn get(&self, coordinate: ChunkCoordinate) -> Option<&ChunkVoxelData> {
        self.overlays.get(&coordinate)
    }

    /// Removes and returns the overlay for `coordinate`.
    pub fn take(&mut self, coordinate: ChunkCoordinate) -> Option<ChunkVoxelData> {
        self.overlays.remove(&coordinate)
    }

    /// Writes one cell into the overlay for `coordinate`, creating an all-air
    /// overlay first if none exists.
    pub fn write(
        &mut self,
        coordinate: ChunkCoordinate,
        dimensions: ChunkDimensions,
        local: LocalBlockPosition,
        block: BlockType,
    ) {
        self.overlays
            .entry(coordinate)
            .or_insert_with(|| ChunkVoxelData::new_air(dimensions))
            .set(local, block);
    }

    /// Merges `data` into the overlay for `coordinate`; non-air cells of `data` win.
    pub fn merge(&mut self, coordinate: ChunkCoordinate, data: ChunkVoxelData) {
        match self.overlays.get_mut(&coordinate) {
            Some(existing) => {
                if existing.overlay(&data).is_none() {
                    log::warn!(
                        "Overlay for chunk {:?} has mismatched dimensions, replacing it",
                        coordinate
                    );
                    *existing = data;
                }
            }
            None => {
                self.overlays.insert(coordinate, data);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Drains every overlay, leaving the map empty.
    pub fn drain(&mut self) -> impl Iterator<Item = (ChunkCoordinate, ChunkVoxelData)> + '_ {
        self.overlays.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: ChunkDimensions = ChunkDimensions::new(4, 4, 4);

    #[test]
    fn write_creates_overlay_on_demand() {
        let mut overlays = PendingOverlays::new();
        let coordinate = ChunkCoordinate::new(1, 0);
        overlays.write(
            coordinate,
            DIMS,
            LocalBlockPosition::new(0, 3, 0),
            BlockType::Leaves,
        );

        let overlay = overlays.get(coordinate).unwrap();
        assert_eq!(overlay.get_xyz(0, 3, 0), BlockType::Leaves);
        assert_eq!(overlay.count_non_air(), 1);
    }

    #[test]
    fn take_removes_exactly_once() {
        let mut overlays = PendingOverlays::new();
        let coordinate = ChunkCoordinate::new(0, 0);
        overlays.write(coordinate, DIMS, LocalBlockPosition::new(1, 1, 1), BlockType::Log);

        assert!(overlays.take(coordinate).is_some());
        assert!(overlays.take(coordinate).is_none());
        assert!(overlays.is_empty());
    }

    #[test]
    fn merge_keeps_existing_cells_under_air() {
        let mut overlays = PendingOverlays::new();
        let coordinate = ChunkCoordinate::new(0, 2);
        overlays.write(coordinate, DIMS, LocalBlockPosition::new(0, 0, 0), BlockType::Log);

        let mut incoming = ChunkVoxelData::new_air(DIMS);
        incoming.set_xyz(1, 0, 0, BlockType::Leaves);
        overlays.merge(coordinate, incoming);

        let merged = overlays.get(coordinate).unwrap();
        assert_eq!(merged.get_xyz(0, 0, 0), BlockType::Log);
        assert_eq!(merged.get_xyz(1, 0, 0), BlockType::Leaves);
    }
}
