//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which fills one chunk's data
//! on the generation worker. The task is scheduled by the
//! [`GenerationQueue`](crate::terrain_state::generation::GenerationQueue) when
//! a request reaches the front of the queue.

use std::sync::Arc;

use web_time::Instant;

use crate::terrain_state::{
    generation::{
        biome::Biome,
        chunk_generator::{ChunkGenerator, GeneratedChunk},
        height_map::HeightMap,
    },
    task_management::task::Task,
    voxels::{chunk::ChunkVoxelData, coordinates::ChunkCoordinate},
};

/// A task that generates chunk data off the cooperative thread.
///
/// The task never touches shared world state:
/// 1. It starts from the overlay taken out of the world at dispatch time
/// 2. It fills a freshly allocated array
/// 3. It collects writes into neighbouring chunks in its own overlay map
pub struct ChunkGenerationTask {
    generator: Arc<ChunkGenerator>,
    height_map: Arc<HeightMap>,
    /// The chunk to generate
    coordinate: ChunkCoordinate,
    biome_hint: Option<Biome>,
    /// Pre-seeded cells for this chunk
    overlay: Option<ChunkVoxelData>,
}

impl ChunkGenerationTask {
    pub fn new(
        generator: Arc<ChunkGenerator>,
        height_map: Arc<HeightMap>,
        coordinate: ChunkCoordinate,
        biome_hint: Option<Biome>,
        overlay: Option<ChunkVoxelData>,
    ) -> Self {
        ChunkGenerationTask {
            generator,
            height_map,
            coordinate,
            biome_hint,
            overlay,
        }
    }
}

impl Task for ChunkGenerationTask {
    type Output = GeneratedChunk;

    fn process(self) -> GeneratedChunk {
        let started = Instant::now();
        let generated = self.generator.generate(
            self.coordinate,
            self.biome_hint,
            &self.height_map,
            self.overlay,
        );
        log::debug!(
            "Generated chunk {:?} in {:?} ({} neighbour overlays)",
            self.coordinate,
            started.elapsed(),
            generated.neighbor_writes.len()
        );
        generated
    }
}
