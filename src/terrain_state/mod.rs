//! # Terrain State Module
//!
//! The procedural voxel terrain: generation, storage, streaming and edits.
//!
//! ## Key Components
//!
//! * `TerrainState` - The coordinator driven once per tick by the host
//! * `generation` - Noise, height map, column fill, structures and the generation queue
//! * `lifecycle` - The per-chunk streaming state machine
//! * `meshing` - The mesh consumer contract
//! * `task_management` - Worker threads for background tasks
//! * `voxels` - Chunk data, coordinates and the world store
//!
//! ## Threading
//!
//! Everything in this module is owned by a single cooperative thread. The
//! only work done elsewhere is the chunk fill (and any mesh building a
//! consumer chooses to run in the background); those tasks own their inputs
//! and return their output for commit on [`TerrainState::on_tick`].

use std::sync::Arc;

use cgmath::Point3;
use web_time::Instant;

use crate::config::TerrainConfig;
use crate::error::TerrainError;

pub mod edit;
pub mod generation;
pub mod lifecycle;
pub mod meshing;
pub mod spawner;
pub mod task_management;
pub mod voxels;

use generation::chunk_generator::ChunkGenerator;
use generation::height_map::{HeightMap, HeightMapParams};
use generation::GenerationQueue;
pub use lifecycle::{ChunkState, TickReport};
use lifecycle::ChunkLifecycleManager;
use meshing::MeshConsumer;
use spawner::EntitySpawner;
use voxels::block::block_type::BlockType;
use voxels::coordinates::ChunkCoordinate;
use voxels::world::World;

/// Counters describing the terrain at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainStats {
    /// Chunks with committed voxel data.
    pub generated_chunks: usize,
    /// Chunks currently materialized.
    pub active_chunks: usize,
    /// Chunks in `DataPending`.
    pub pending_chunks: usize,
    /// Generation requests queued or in flight.
    pub queued_generations: usize,
    /// Ungenerated chunks with pre-seeded cells waiting.
    pub pending_overlays: usize,
    /// Generation tasks dispatched since start.
    pub generations_started: u64,
    /// Chunks no longer requested after repeated generation failures.
    pub abandoned_chunks: usize,
}

/// The main state container for the terrain.
///
/// Owns the world store, the generation queue and the lifecycle manager, and
/// drives them from [`on_tick`](Self::on_tick). Meshes are handed to `M` and
/// entity side effects of edits to `S`.
pub struct TerrainState<M: MeshConsumer, S: EntitySpawner> {
    config: Arc<TerrainConfig>,
    world: World,
    height_map: Arc<HeightMap>,
    generation_queue: GenerationQueue,
    lifecycle: ChunkLifecycleManager,
    mesh_consumer: M,
    spawner: S,
}

impl<M: MeshConsumer, S: EntitySpawner> TerrainState<M, S> {
    /// Validates `config`, generates the height map and starts the generation worker.
    ///
    /// # Errors
    /// * [`TerrainError::Config`] if the configuration is unusable
    /// * [`TerrainError::WorkerSpawn`] if the generation worker cannot start
    pub fn new(config: TerrainConfig, mesh_consumer: M, spawner: S) -> Result<Self, TerrainError> {
        let config = Arc::new(config.validate()?);
        let generator = ChunkGenerator::new(config.clone());
        Self::with_generator(config, generator, mesh_consumer, spawner)
    }

    /// Like [`new`](Self::new), with a caller-built generator. `config` must be validated.
    pub fn with_generator(
        config: Arc<TerrainConfig>,
        generator: ChunkGenerator,
        mesh_consumer: M,
        spawner: S,
    ) -> Result<Self, TerrainError> {
        let started = Instant::now();
        let height_map = Arc::new(HeightMap::generate(&HeightMapParams::from_config(&config)));
        log::info!(
            "Generated {}x{} height map in {:?}",
            height_map.width(),
            height_map.depth(),
            started.elapsed()
        );

        let generation_queue = GenerationQueue::new(generator).map_err(TerrainError::WorkerSpawn)?;

        Ok(Self {
            world: World::new(config.chunk_dimensions()),
            lifecycle: ChunkLifecycleManager::new(config.render_distance),
            config,
            height_map,
            generation_queue,
            mesh_consumer,
            spawner,
        })
    }

    /// Advances the terrain by one tick.
    ///
    /// 1. Commits finished generations and re-meshes neighbours they wrote into
    /// 2. Runs the lifecycle against the player position
    /// 3. Dispatches the next generation request
    pub fn on_tick(&mut self, player_position: Point3<f32>) -> TickReport {
        for coordinate in self.generation_queue.process_completed(&mut self.world) {
            self.lifecycle
                .request_refresh(coordinate, &self.world, &mut self.mesh_consumer);
        }

        let report = self.lifecycle.update(
            player_position,
            &mut self.world,
            &mut self.generation_queue,
            &mut self.mesh_consumer,
            &self.height_map,
        );

        self.generation_queue.process_queued(&mut self.world);
        report
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn height_map(&self) -> &HeightMap {
        &self.height_map
    }

    pub fn mesh_consumer(&self) -> &M {
        &self.mesh_consumer
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Reads the block at a world position; `None` if it is not generated.
    pub fn get_block(&self, position: Point3<i32>) -> Option<BlockType> {
        self.world.get_block(position)
    }

    pub fn chunk_state(&self, coordinate: ChunkCoordinate) -> ChunkState {
        self.lifecycle.state(coordinate, &self.world)
    }

    /// Whether the last tick's window is fully materialized with no work outstanding.
    ///
    /// Chunks abandoned after repeated generation failures do not hold this up.
    pub fn is_settled(&self) -> bool {
        self.lifecycle.center().is_some()
            && self.lifecycle.pending_len() == 0
            && self.generation_queue.is_idle()
    }

    pub fn generations_started(&self) -> u64 {
        self.generation_queue.generations_started()
    }

    pub fn stats(&self) -> TerrainStats {
        TerrainStats {
            generated_chunks: self.world.chunks().len(),
            active_chunks: self.world.active_chunks().len(),
            pending_chunks: self.lifecycle.pending_len(),
            queued_generations: self.generation_queue.pending_len(),
            pending_overlays: self.world.overlays().len(),
            generations_started: self.generation_queue.generations_started(),
            abandoned_chunks: self.lifecycle.abandoned_len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use cgmath::Deg;

    use crate::terrain_state::generation::chunk_generator::tests::small_config;
    use crate::terrain_state::generation::structures::{StampTarget, StructureStamper};
    use crate::terrain_state::meshing::tests::ImmediateMesher;
    use crate::terrain_state::spawner::PrefabHandle;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Spawned {
        Drop(BlockType, Point3<i32>),
        Special(PrefabHandle, Point3<i32>, Deg<f32>),
    }

    /// Records every spawn in a shared log.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingSpawner {
        pub(crate) spawned: Rc<RefCell<Vec<Spawned>>>,
    }

    impl EntitySpawner for RecordingSpawner {
        fn spawn_dropped_item(&mut self, block: BlockType, position: Point3<i32>) {
            self.spawned.borrow_mut().push(Spawned::Drop(block, position));
        }

        fn spawn_special(&mut self, prefab: PrefabHandle, position: Point3<i32>, facing: Deg<f32>) {
            self.spawned
                .borrow_mut()
                .push(Spawned::Special(prefab, position, facing));
        }
    }

    pub(crate) type TestTerrain = TerrainState<ImmediateMesher, RecordingSpawner>;

    pub(crate) fn test_terrain() -> TestTerrain {
        TerrainState::new(small_config(), ImmediateMesher::default(), RecordingSpawner::default())
            .unwrap()
    }

    /// The world-space center of a chunk column.
    pub(crate) fn chunk_center(terrain: &TestTerrain, x: i32, z: i32) -> Point3<f32> {
        let dimensions = terrain.world().dimensions();
        Point3::new(
            (x as f32 + 0.5) * dimensions.width as f32,
            40.0,
            (z as f32 + 0.5) * dimensions.depth as f32,
        )
    }

    /// Ticks at `position` until the terrain settles, returning every report.
    pub(crate) fn tick_until_settled(
        terrain: &mut TestTerrain,
        position: Point3<f32>,
    ) -> Vec<TickReport> {
        let mut reports = vec![terrain.on_tick(position)];
        let deadline = Instant::now() + Duration::from_secs(60);
        while !terrain.is_settled() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
            reports.push(terrain.on_tick(position));
        }
        assert!(terrain.is_settled(), "terrain did not settle in time");
        reports
    }

    #[test]
    fn render_distance_one_materializes_nine_chunks() {
        let mut terrain = test_terrain();
        let position = chunk_center(&terrain, 0, 0);
        let reports = tick_until_settled(&mut terrain, position);

        let active = terrain.world().active_chunks();
        assert_eq!(active.len(), 9);
        for coordinate in ChunkCoordinate::new(0, 0).square_around(1) {
            assert!(active.contains_key(&coordinate));
            assert_eq!(terrain.chunk_state(coordinate), ChunkState::Materialized);
        }

        let materialized: usize = reports.iter().map(|r| r.materialized.len()).sum();
        assert_eq!(materialized, 9);
        assert_eq!(terrain.stats().generated_chunks, 9);
        assert_eq!(terrain.generations_started(), 9);
    }

    #[test]
    fn moving_away_evicts_old_chunks_once_and_keeps_their_data() {
        let mut terrain = test_terrain();
        let position = chunk_center(&terrain, 0, 0);
        tick_until_settled(&mut terrain, position);
        let position = chunk_center(&terrain, 5, 0);
        let reports = tick_until_settled(&mut terrain, position);

        let mut evicted: Vec<ChunkCoordinate> =
            reports.iter().flat_map(|r| r.evicted.iter().copied()).collect();
        evicted.sort();
        let mut expected = ChunkCoordinate::new(0, 0).square_around(1);
        expected.sort();
        assert_eq!(evicted, expected);

        for coordinate in expected {
            assert_eq!(terrain.chunk_state(coordinate), ChunkState::Absent);
            assert!(terrain.world().chunks().contains(coordinate));
        }
        assert_eq!(terrain.world().active_chunks().len(), 9);
        assert_eq!(terrain.mesh_consumer().live.len(), 9);
        assert!(terrain.mesh_consumer().released.len() >= 9);
    }

    #[test]
    fn returning_reuses_stored_data_without_regenerating() {
        let mut terrain = test_terrain();
        let home = chunk_center(&terrain, 0, 0);
        tick_until_settled(&mut terrain, home);
        let position = chunk_center(&terrain, 5, 0);
        tick_until_settled(&mut terrain, position);
        let generated = terrain.generations_started();
        assert_eq!(generated, 18);

        tick_until_settled(&mut terrain, home);
        assert_eq!(terrain.generations_started(), generated);
        assert_eq!(terrain.world().active_chunks().len(), 9);
        assert!(terrain.world().is_active(ChunkCoordinate::new(0, 0)));
    }

    #[test]
    fn stepping_within_a_chunk_requests_nothing() {
        let mut terrain = test_terrain();
        let center = chunk_center(&terrain, 0, 0);
        tick_until_settled(&mut terrain, center);

        let report = terrain.on_tick(Point3::new(center.x + 1.0, center.y, center.z - 1.0));
        assert_eq!(report, TickReport::default());
    }

    #[test]
    fn negative_positions_stream_negative_chunks() {
        let mut terrain = test_terrain();
        tick_until_settled(&mut terrain, Point3::new(-0.5, 40.0, -0.5));
        assert!(terrain.world().is_active(ChunkCoordinate::new(-2, -2)));
        assert!(terrain.world().is_active(ChunkCoordinate::new(0, 0)));
        assert!(!terrain.world().is_active(ChunkCoordinate::new(1, 0)));
    }

    struct PanickingStamper;

    impl StructureStamper for PanickingStamper {
        fn stamp(&self, _target: &mut StampTarget<'_>, _local_x: usize, _local_z: usize) {
            panic!("stamper failure");
        }
    }

    #[test]
    fn failed_generation_is_never_committed_and_eventually_abandoned() {
        let config = Arc::new(small_config());
        let generator =
            ChunkGenerator::new(config.clone()).with_stamper(Box::new(PanickingStamper));
        let mut terrain = TerrainState::with_generator(
            config,
            generator,
            ImmediateMesher::default(),
            RecordingSpawner::default(),
        )
        .unwrap();
        let position = chunk_center(&terrain, 0, 0);

        tick_until_settled(&mut terrain, position);

        let attempts = u64::from(lifecycle::MAX_GENERATION_ATTEMPTS);
        assert_eq!(terrain.generations_started(), 9 * attempts);
        assert!(terrain.world().chunks().is_empty());
        assert!(terrain.world().active_chunks().is_empty());
        assert_eq!(terrain.stats().abandoned_chunks, 9);
        assert_eq!(terrain.chunk_state(ChunkCoordinate::new(0, 0)), ChunkState::Absent);

        let report = terrain.on_tick(position);
        assert_eq!(report, TickReport::default());
        assert_eq!(terrain.generations_started(), 9 * attempts);
    }

    /// Writes one leaf into the western neighbour from each chunk's first column.
    struct WestSpillStamper;

    impl StructureStamper for WestSpillStamper {
        fn stamp(&self, target: &mut StampTarget<'_>, local_x: usize, local_z: usize) {
            if local_x == 0 && local_z == 0 {
                target.set_block(-1, 62, 0, BlockType::Leaves);
            }
        }
    }

    #[test]
    fn spill_into_a_committed_neighbour_remeshes_it() {
        let config = Arc::new(small_config());
        let generator =
            ChunkGenerator::new(config.clone()).with_stamper(Box::new(WestSpillStamper));
        let mut terrain = TerrainState::with_generator(
            config,
            generator,
            ImmediateMesher::default(),
            RecordingSpawner::default(),
        )
        .unwrap();
        let position = chunk_center(&terrain, 0, 0);

        tick_until_settled(&mut terrain, position);

        let requests = &terrain.mesh_consumer().requests;
        let requests_for =
            |coordinate: ChunkCoordinate| requests.iter().filter(|&&c| c == coordinate).count();
        for z in -1..=1 {
            // Columns are generated west to east, so only the two western
            // columns are committed before their eastern neighbour spills.
            assert_eq!(requests_for(ChunkCoordinate::new(-1, z)), 2);
            assert_eq!(requests_for(ChunkCoordinate::new(0, z)), 2);
            assert_eq!(requests_for(ChunkCoordinate::new(1, z)), 1);
            assert_eq!(terrain.get_block(Point3::new(-1, 62, z * 8)), Some(BlockType::Leaves));
            assert_eq!(terrain.get_block(Point3::new(7, 62, z * 8)), Some(BlockType::Leaves));
        }
        assert_eq!(terrain.stats().pending_overlays, 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TerrainConfig {
            chunk_depth: 0,
            ..small_config()
        };
        let result =
            TerrainState::new(config, ImmediateMesher::default(), RecordingSpawner::default());
        assert!(matches!(result, Err(TerrainError::Config(_))));
    }
}
