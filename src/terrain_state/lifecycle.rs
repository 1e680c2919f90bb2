//! # Chunk Lifecycle
//!
//! Streams chunks in and out around the player. Every chunk coordinate is in
//! one of three states:
//!
//! - `Absent`: not materialized and nothing in progress. Its voxel data may
//!   still be in the store.
//! - `DataPending`: waiting for its voxel data, or for the mesh built from it.
//! - `Materialized`: registered in the active set with a live mesh.
//!
//! Each tick the manager:
//! 1. Moves chunks whose data arrived on to the mesh stage
//! 2. Materializes chunks whose mesh arrived
//! 3. Requests every chunk of the window that is neither pending nor active
//! 4. Evicts active chunks that left the window
//!
//! The window is the inclusive square of radius `render_distance` around the
//! player's chunk. Pending chunks are never cancelled; one that finishes
//! outside the window materializes and is evicted on the same tick.
//!
//! A chunk whose generation fails is requested again on the same tick, up to
//! [`MAX_GENERATION_ATTEMPTS`] times. After that it stays `Absent`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use cgmath::Point3;

use crate::terrain_state::generation::height_map::HeightMap;
use crate::terrain_state::generation::{GenerationQueue, GenerationRequest};
use crate::terrain_state::meshing::{MeshConsumer, RenderableChunk};
use crate::terrain_state::voxels::coordinates::ChunkCoordinate;
use crate::terrain_state::voxels::world::World;

/// The externally visible state of a chunk coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    Absent,
    DataPending,
    Materialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingStage {
    AwaitingData,
    AwaitingMesh,
}

/// What one tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Coordinates that entered `DataPending` this tick.
    pub requested: Vec<ChunkCoordinate>,
    /// Coordinates that became `Materialized` this tick.
    pub materialized: Vec<ChunkCoordinate>,
    /// Coordinates that were evicted this tick.
    pub evicted: Vec<ChunkCoordinate>,
}

/// Generations of one chunk that may fail before it is no longer requested.
pub const MAX_GENERATION_ATTEMPTS: u32 = 3;

/// Generation results reported by queue callbacks, as (coordinate, succeeded).
type DataReady = Rc<RefCell<Vec<(ChunkCoordinate, bool)>>>;

pub struct ChunkLifecycleManager {
    render_distance: u32,
    pending: HashMap<ChunkCoordinate, PendingStage>,
    data_ready: DataReady,
    /// Failed generations per coordinate.
    failures: HashMap<ChunkCoordinate, u32>,
    center: Option<ChunkCoordinate>,
}

impl ChunkLifecycleManager {
    pub fn new(render_distance: u32) -> Self {
        Self {
            render_distance,
            pending: HashMap::new(),
            data_ready: Rc::default(),
            failures: HashMap::new(),
            center: None,
        }
    }

    pub fn render_distance(&self) -> u32 {
        self.render_distance
    }

    /// The player's chunk as of the last update.
    pub fn center(&self) -> Option<ChunkCoordinate> {
        self.center
    }

    pub fn state(&self, coordinate: ChunkCoordinate, world: &World) -> ChunkState {
        if world.is_active(coordinate) {
            ChunkState::Materialized
        } else if self.pending.contains_key(&coordinate) {
            ChunkState::DataPending
        } else {
            ChunkState::Absent
        }
    }

    /// Number of chunks in `DataPending`.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `coordinate` failed to generate too often to be requested again.
    pub fn is_abandoned(&self, coordinate: ChunkCoordinate) -> bool {
        self.failures.get(&coordinate).copied().unwrap_or(0) >= MAX_GENERATION_ATTEMPTS
    }

    /// Number of chunks no longer requested after repeated failures.
    pub fn abandoned_len(&self) -> usize {
        self.failures
            .values()
            .filter(|&&failures| failures >= MAX_GENERATION_ATTEMPTS)
            .count()
    }

    /// Runs one tick of the state machine for the given player position.
    pub fn update(
        &mut self,
        player_position: Point3<f32>,
        world: &mut World,
        queue: &mut GenerationQueue,
        mesher: &mut dyn MeshConsumer,
        height_map: &Arc<HeightMap>,
    ) -> TickReport {
        let mut report = TickReport::default();

        self.receive_data(world, mesher);
        self.receive_meshes(world, mesher, &mut report);

        let center = world.dimensions().chunk_of_point(player_position);
        if self.center != Some(center) {
            log::debug!("Player entered chunk {:?}", center);
        }
        self.center = Some(center);

        for coordinate in center.square_around(self.render_distance) {
            if world.is_active(coordinate)
                || self.pending.contains_key(&coordinate)
                || self.is_abandoned(coordinate)
            {
                continue;
            }
            report.requested.push(coordinate);

            if let Some(data) = world.chunks().get(coordinate) {
                self.pending.insert(coordinate, PendingStage::AwaitingMesh);
                mesher.request_mesh(coordinate, data);
                continue;
            }

            self.pending.insert(coordinate, PendingStage::AwaitingData);
            let data_ready = self.data_ready.clone();
            queue.enqueue(GenerationRequest::new(
                coordinate,
                None,
                height_map.clone(),
                move |coordinate, result| {
                    data_ready.borrow_mut().push((coordinate, result.is_ok()));
                },
            ));
        }

        let outside: Vec<ChunkCoordinate> = world
            .active_chunks()
            .keys()
            .filter(|coordinate| coordinate.chebyshev_distance(&center) > self.render_distance)
            .copied()
            .collect();
        for coordinate in outside {
            if let Some(chunk) = world.deactivate(coordinate) {
                mesher.release(coordinate, chunk.mesh());
                report.evicted.push(coordinate);
            }
        }

        if !report.materialized.is_empty() || !report.evicted.is_empty() {
            log::debug!(
                "Materialized {} and evicted {} chunk(s), {} active",
                report.materialized.len(),
                report.evicted.len(),
                world.active_chunks().len()
            );
        }

        report
    }

    /// Asks for a new mesh of a chunk whose data changed.
    ///
    /// Only chunks that are materialized or waiting for a mesh are re-meshed;
    /// anything else is meshed fresh when it materializes.
    ///
    /// # Returns
    /// `true` if a mesh was requested.
    pub fn request_refresh(
        &mut self,
        coordinate: ChunkCoordinate,
        world: &World,
        mesher: &mut dyn MeshConsumer,
    ) -> bool {
        let awaiting_mesh = self.pending.get(&coordinate) == Some(&PendingStage::AwaitingMesh);
        if !awaiting_mesh && !world.is_active(coordinate) {
            return false;
        }
        match world.chunks().get(coordinate) {
            Some(data) => {
                mesher.request_mesh(coordinate, data);
                true
            }
            None => false,
        }
    }

    fn receive_data(&mut self, world: &World, mesher: &mut dyn MeshConsumer) {
        let ready = std::mem::take(&mut *self.data_ready.borrow_mut());
        for (coordinate, succeeded) in ready {
            if self.pending.get(&coordinate) != Some(&PendingStage::AwaitingData) {
                continue;
            }
            match world.chunks().get(coordinate).filter(|_| succeeded) {
                Some(data) => {
                    self.failures.remove(&coordinate);
                    self.pending.insert(coordinate, PendingStage::AwaitingMesh);
                    mesher.request_mesh(coordinate, data);
                }
                None => {
                    self.pending.remove(&coordinate);
                    let failures = self.failures.entry(coordinate).or_insert(0);
                    *failures += 1;
                    if *failures >= MAX_GENERATION_ATTEMPTS {
                        log::error!(
                            "Chunk {:?} failed to generate {} times, giving up",
                            coordinate,
                            failures
                        );
                    } else {
                        log::warn!("Chunk {:?} failed to generate, will retry", coordinate);
                    }
                }
            }
        }
    }

    fn receive_meshes(
        &mut self,
        world: &mut World,
        mesher: &mut dyn MeshConsumer,
        report: &mut TickReport,
    ) {
        for (coordinate, mesh) in mesher.poll_completed() {
            let awaiting_mesh = self.pending.get(&coordinate) == Some(&PendingStage::AwaitingMesh);
            if awaiting_mesh {
                self.pending.remove(&coordinate);
            }

            if let Some(active) = world.active_chunk_mut(coordinate) {
                let stale = active.replace_mesh(mesh);
                mesher.release(coordinate, stale);
            } else if awaiting_mesh {
                world.activate(RenderableChunk::new(coordinate, mesh));
                report.materialized.push(coordinate);
            } else {
                mesher.release(coordinate, mesh);
            }
        }
    }
}
