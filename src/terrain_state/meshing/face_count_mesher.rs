//! # Face Count Mesher
//!
//! A [`MeshConsumer`] that runs [`ChunkMeshGenerationTask`]s on its own
//! workers and keeps the resulting [`MeshSummary`] as the "mesh". It lets the
//! terrain stream a world without a renderer attached.

use std::collections::HashMap;

use crate::terrain_state::task_management::TaskManager;
use crate::terrain_state::voxels::chunk::ChunkVoxelData;
use crate::terrain_state::voxels::coordinates::ChunkCoordinate;

use super::tasks::chunk_mesh_generation_task::{ChunkMeshGenerationTask, MeshSummary};
use super::{MeshConsumer, MeshHandle};

pub struct FaceCountMesher {
    task_manager: TaskManager<ChunkMeshGenerationTask>,
    meshes: HashMap<MeshHandle, MeshSummary>,
    next_handle: u64,
}

impl FaceCountMesher {
    /// # Errors
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(num_workers: usize) -> std::io::Result<Self> {
        Ok(Self {
            task_manager: TaskManager::new(num_workers, "chunk-mesh")?,
            meshes: HashMap::new(),
            next_handle: 0,
        })
    }

    pub fn mesh_summary(&self, mesh: MeshHandle) -> Option<MeshSummary> {
        self.meshes.get(&mesh).copied()
    }

    /// Number of meshes currently alive.
    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Totals over every live mesh.
    pub fn total(&self) -> MeshSummary {
        self.meshes
            .values()
            .fold(MeshSummary::default(), |total, mesh| MeshSummary {
                solid_blocks: total.solid_blocks + mesh.solid_blocks,
                visible_faces: total.visible_faces + mesh.visible_faces,
            })
    }
}

impl MeshConsumer for FaceCountMesher {
    fn request_mesh(&mut self, coordinate: ChunkCoordinate, data: &ChunkVoxelData) {
        self.task_manager
            .publish_task(ChunkMeshGenerationTask::new(coordinate, data.clone()));
    }

    fn poll_completed(&mut self) -> Vec<(ChunkCoordinate, MeshHandle)> {
        let mut completed = Vec::new();
        for outcome in self.task_manager.drain_completed() {
            match outcome {
                Ok((coordinate, summary)) => {
                    let handle = MeshHandle(self.next_handle);
                    self.next_handle += 1;
                    self.meshes.insert(handle, summary);
                    completed.push((coordinate, handle));
                }
                Err(panic) => log::error!("Mesh task panicked: {}", panic.message),
            }
        }
        self.task_manager.process_queued_tasks();
        completed
    }

    fn release(&mut self, coordinate: ChunkCoordinate, mesh: MeshHandle) {
        if self.meshes.remove(&mesh).is_none() {
            log::warn!("Released unknown mesh {:?} for chunk {:?}", mesh, coordinate);
        }
    }
}
