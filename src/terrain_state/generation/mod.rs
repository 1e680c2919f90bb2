//! # Terrain Generation
//!
//! This module turns chunk requests into committed chunk data.
//!
//! ## Architecture Overview
//!
//! - `GenerationQueue`: FIFO of requests plus the dispatch and commit steps,
//!   run on the cooperative thread
//! - `ChunkGenerator`: The column fill and structure stamping, run on the worker
//! - `HeightMap` / `NoiseField`: Deterministic noise inputs shared by every task
//!
//! ## Request Lifecycle
//! 1. A request is added with `GenerationQueue::enqueue()`; this never blocks
//! 2. `process_queued()` dispatches the front request when nothing is in flight.
//!    A coordinate that already has data completes immediately without generating
//! 3. The worker fills a fresh array and returns it with its neighbour writes
//! 4. `process_completed()` commits the data, applies the neighbour writes and
//!    invokes the request's callback
//!
//! At most one generation task is in flight, so requests complete in the order
//! they were enqueued.

pub mod biome;
pub mod chunk_generator;
pub mod height_map;
pub mod noise_field;
pub mod structures;

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::GenerationError;
use crate::terrain_state::task_management::TaskManager;
use crate::terrain_state::voxels::chunk::ChunkVoxelData;
use crate::terrain_state::voxels::coordinates::ChunkCoordinate;
use crate::terrain_state::voxels::tasks::chunk_generation_task::ChunkGenerationTask;
use crate::terrain_state::voxels::world::World;

use biome::Biome;
use chunk_generator::ChunkGenerator;
use height_map::HeightMap;

/// Invoked on the cooperative thread once a request has been resolved.
pub type CompletionCallback =
    Box<dyn FnOnce(ChunkCoordinate, Result<&ChunkVoxelData, &GenerationError>)>;

pub struct GenerationRequest {
    pub coordinate: ChunkCoordinate,
    /// Forces this biome for every column of the chunk.
    pub biome_hint: Option<Biome>,
    pub height_map: Arc<HeightMap>,
    pub on_complete: CompletionCallback,
}

impl GenerationRequest {
    pub fn new(
        coordinate: ChunkCoordinate,
        biome_hint: Option<Biome>,
        height_map: Arc<HeightMap>,
        on_complete: impl FnOnce(ChunkCoordinate, Result<&ChunkVoxelData, &GenerationError>)
            + 'static,
    ) -> Self {
        Self {
            coordinate,
            biome_hint,
            height_map,
            on_complete: Box::new(on_complete),
        }
    }
}

struct InFlightRequest {
    coordinate: ChunkCoordinate,
    /// The overlay handed to the task, put back if the generation fails.
    overlay: Option<ChunkVoxelData>,
    on_complete: CompletionCallback,
}

impl InFlightRequest {
    /// Returns the overlay to the world and reports `error` to the callback.
    fn fail(self, world: &mut World, error: GenerationError) {
        log::error!("{}", error);
        if let Some(overlay) = self.overlay {
            world.overlays_mut().merge(self.coordinate, overlay);
        }
        (self.on_complete)(self.coordinate, Err(&error));
    }
}

pub struct GenerationQueue {
    task_manager: TaskManager<ChunkGenerationTask>,
    generator: Arc<ChunkGenerator>,
    requests: VecDeque<GenerationRequest>,
    in_flight: Option<InFlightRequest>,
    generations_started: u64,
}

impl GenerationQueue {
    /// Creates the queue and its single generation worker.
    ///
    /// # Errors
    /// Returns the OS error if the worker thread cannot be spawned.
    pub fn new(generator: ChunkGenerator) -> std::io::Result<Self> {
        Ok(Self {
            task_manager: TaskManager::new(1, "chunk-generation")?,
            generator: Arc::new(generator),
            requests: VecDeque::new(),
            in_flight: None,
            generations_started: 0,
        })
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    pub fn enqueue(&mut self, request: GenerationRequest) {
        log::debug!("Queued generation of chunk {:?}", request.coordinate);
        self.requests.push_back(request);
    }

    /// Dispatches the front request if no generation is in flight.
    ///
    /// Requests for coordinates that already have committed data complete
    /// right here with that data, and the next request is considered.
    pub fn process_queued(&mut self, world: &mut World) {
        while self.in_flight.is_none() {
            let Some(request) = self.requests.pop_front() else {
                break;
            };
            let coordinate = request.coordinate;

            if let Some(existing) = world.chunks().get(coordinate) {
                log::debug!("Chunk {:?} already generated, skipping", coordinate);
                (request.on_complete)(coordinate, Ok(existing));
                continue;
            }

            if !self.task_manager.has_connected_worker() {
                let error = GenerationError::WorkerDisconnected { coordinate };
                log::error!("{}", error);
                (request.on_complete)(coordinate, Err(&error));
                continue;
            }

            let overlay = world.overlays_mut().take(coordinate);
            self.task_manager.publish_task(ChunkGenerationTask::new(
                self.generator.clone(),
                request.height_map,
                coordinate,
                request.biome_hint,
                overlay.clone(),
            ));
            self.generations_started += 1;
            self.in_flight = Some(InFlightRequest {
                coordinate,
                overlay,
                on_complete: request.on_complete,
            });
        }
    }

    /// Commits finished generations and invokes their callbacks.
    ///
    /// A generation that panicked is logged and not committed; its overlay is
    /// restored and its callback receives the error.
    ///
    /// # Returns
    /// Already committed chunks that were modified by neighbour writes.
    pub fn process_completed(&mut self, world: &mut World) -> Vec<ChunkCoordinate> {
        let mut modified = Vec::new();

        for outcome in self.task_manager.drain_completed() {
            let Some(in_flight) = self.in_flight.take() else {
                log::warn!("Discarding a generation result with no matching request");
                continue;
            };

            match outcome {
                Ok(generated) => {
                    let coordinate = generated.coordinate;
                    world.chunks_mut().commit(coordinate, generated.data);
                    modified.extend(world.merge_neighbor_writes(generated.neighbor_writes));
                    if let Some(data) = world.chunks().get(coordinate) {
                        (in_flight.on_complete)(coordinate, Ok(data));
                    }
                }
                Err(panic) => {
                    let error = GenerationError::WorkerPanicked {
                        coordinate: in_flight.coordinate,
                        message: panic.message,
                    };
                    in_flight.fail(world, error);
                }
            }
        }

        if self.in_flight.is_some() && !self.task_manager.has_connected_worker() {
            if let Some(in_flight) = self.in_flight.take() {
                let error = GenerationError::WorkerDisconnected {
                    coordinate: in_flight.coordinate,
                };
                in_flight.fail(world, error);
            }
        }

        modified
    }

    /// Number of requests waiting or in flight.
    pub fn pending_len(&self) -> usize {
        self.requests.len() + usize::from(self.in_flight.is_some())
    }

    pub fn is_idle(&self) -> bool {
        self.requests.is_empty() && self.in_flight.is_none()
    }

    /// Number of generation tasks dispatched to the worker so far.
    pub fn generations_started(&self) -> u64 {
        self.generations_started
    }
}
