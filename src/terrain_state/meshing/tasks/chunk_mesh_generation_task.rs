//! Task for summarizing chunk geometry in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask`, which walks a snapshot
//! of a chunk and counts the block faces a renderer would have to emit. A face
//! is visible when the neighbouring cell across it is not opaque or lies
//! outside the chunk.

use crate::terrain_state::{
    task_management::task::Task,
    voxels::{block::block_side::BlockSide, chunk::ChunkVoxelData, coordinates::ChunkCoordinate},
};

/// The geometry summary of one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshSummary {
    pub solid_blocks: usize,
    pub visible_faces: usize,
}

/// A task that summarizes the mesh of a single chunk.
pub struct ChunkMeshGenerationTask {
    coordinate: ChunkCoordinate,
    /// Snapshot of the chunk taken when the mesh was requested
    data: ChunkVoxelData,
    /// Which block sides should be counted
    sides_to_generate: Vec<BlockSide>,
}

impl ChunkMeshGenerationTask {
    pub fn new(coordinate: ChunkCoordinate, data: ChunkVoxelData) -> Self {
        ChunkMeshGenerationTask {
            coordinate,
            data,
            sides_to_generate: BlockSide::all().to_vec(),
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    type Output = (ChunkCoordinate, MeshSummary);

    fn process(self) -> Self::Output {
        let mut summary = MeshSummary::default();

        for (position, _block) in self.data.solid_blocks() {
            summary.solid_blocks += 1;
            for side in &self.sides_to_generate {
                let normal = side.normal();
                let neighbor = self.data.try_get(
                    position.x as i32 + normal.x,
                    position.y as i32 + normal.y,
                    position.z as i32 + normal.z,
                );
                if !neighbor.is_some_and(|block| block.is_opaque()) {
                    summary.visible_faces += 1;
                }
            }
        }

        (self.coordinate, summary)
    }
}
