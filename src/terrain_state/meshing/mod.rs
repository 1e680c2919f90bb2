//! # Meshing
//!
//! The contract between the terrain and whatever builds renderable geometry.
//!
//! The terrain never builds geometry itself. It submits committed chunk data to
//! a [`MeshConsumer`], polls it for finished meshes once per tick, and releases
//! a mesh when its chunk leaves the streaming window or is re-meshed.
//! [`FaceCountMesher`](face_count_mesher::FaceCountMesher) is a background
//! consumer that counts exposed faces; it stands in for a renderer.

pub mod face_count_mesher;
pub mod tasks;

use crate::terrain_state::voxels::chunk::ChunkVoxelData;
use crate::terrain_state::voxels::coordinates::ChunkCoordinate;

/// Opaque id of a mesh owned by a [`MeshConsumer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// A materialized chunk: its coordinate and the mesh standing for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderableChunk {
    coordinate: ChunkCoordinate,
    mesh: MeshHandle,
}

impl RenderableChunk {
    pub fn new(coordinate: ChunkCoordinate, mesh: MeshHandle) -> Self {
        Self { coordinate, mesh }
    }

    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    /// Swaps in a rebuilt mesh and returns the one it replaces.
    pub fn replace_mesh(&mut self, mesh: MeshHandle) -> MeshHandle {
        std::mem::replace(&mut self.mesh, mesh)
    }
}

/// Builds meshes from chunk data, possibly asynchronously.
///
/// All methods are called from the cooperative thread.
pub trait MeshConsumer {
    /// Queues a mesh build for `data`. Every request yields its own completion.
    fn request_mesh(&mut self, coordinate: ChunkCoordinate, data: &ChunkVoxelData);

    /// Meshes finished since the last call.
    fn poll_completed(&mut self) -> Vec<(ChunkCoordinate, MeshHandle)>;

    /// Destroys a mesh the terrain no longer uses.
    fn release(&mut self, coordinate: ChunkCoordinate, mesh: MeshHandle);
}
