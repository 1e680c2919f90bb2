//! # Chunk Generator
//!
//! Fills one chunk's block array from the height map, the biome noise and the
//! configured block table, then hands each column to the structure stamper.
//!
//! ## Column Fill
//! For every local column, in X-major order:
//! 1. Surface height from the height map sample and the height curve
//! 2. Biome from the request hint or from [`Biome::classify`]
//! 3. Cells from the surface down to the floor: layering, caves, ores, bedrock
//! 4. Water between the surface and the water level when the column is flooded
//! 5. Structure stamping
//!
//! A pending overlay, if any, is the starting array; the fill writes over it.

use std::sync::Arc;

use crate::config::TerrainConfig;
use crate::terrain_state::voxels::block::block_type::BlockType;
use crate::terrain_state::voxels::chunk::ChunkVoxelData;
use crate::terrain_state::voxels::coordinates::ChunkCoordinate;
use crate::terrain_state::voxels::overlay::PendingOverlays;

use super::biome::Biome;
use super::height_map::HeightMap;
use super::noise_field::NoiseField;
use super::structures::{StampTarget, StructureStamper, TreeStamper};

/// Biome noise frequencies, applied to the mapped column position.
const SECONDARY_BIOME_SCALE: f64 = 0.48;
const TERTIARY_BIOME_SCALE: f64 = 0.6;

/// Mountain cells at or above this absolute height are capped with snow.
pub const SNOW_LINE: usize = 120;
/// Caves only open this many blocks or more below the surface.
const CAVE_MIN_DEPTH: usize = 6;
const CAVE_SCALE: f64 = 0.1;
const CAVE_THRESHOLD: f64 = 0.5;
const PRIMARY_ORE_SCALE: f64 = 0.22;
const PRIMARY_ORE_THRESHOLD: f64 = 0.29;
const SECONDARY_ORE_SCALE: f64 = 0.3;
const SECONDARY_ORE_THRESHOLD: f64 = 0.6;
/// Depth below which a column switches from subsoil to its deep block.
const SUBSOIL_DEPTH: usize = 4;
/// Depth of the seabed layer in a flooded column.
const SEABED_DEPTH: usize = 3;

/// The output of one generation: the chunk itself and the writes its
/// structures made into neighbouring chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedChunk {
    pub coordinate: ChunkCoordinate,
    pub data: ChunkVoxelData,
    pub neighbor_writes: PendingOverlays,
}

pub struct ChunkGenerator {
    config: Arc<TerrainConfig>,
    noise: NoiseField,
    stamper: Option<Box<dyn StructureStamper + Send + Sync>>,
}

impl ChunkGenerator {
    /// Creates a generator, with the default [`TreeStamper`] when structures are enabled.
    pub fn new(config: Arc<TerrainConfig>) -> Self {
        let stamper: Option<Box<dyn StructureStamper + Send + Sync>> =
            if config.structures_enabled {
                Some(Box::new(TreeStamper::new(
                    config.seed,
                    config.structure_density,
                )))
            } else {
                None
            };
        Self {
            noise: NoiseField::new(config.seed),
            config,
            stamper,
        }
    }

    pub fn with_stamper(mut self, stamper: Box<dyn StructureStamper + Send + Sync>) -> Self {
        self.stamper = Some(stamper);
        self
    }

    pub fn without_structures(mut self) -> Self {
        self.stamper = None;
        self
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Biome noise samples `(secondary, tertiary)` for a world column.
    fn biome_samples(&self, world_x: i32, world_z: i32) -> (f64, f64) {
        let config = &self.config;
        let px = config.noise_offset[0]
            + world_x as f64 / config.chunk_width as f64 * config.noise_scale[0];
        let pz = config.noise_offset[1]
            + world_z as f64 / config.chunk_depth as f64 * config.noise_scale[1];
        (
            self.noise
                .sample_unit_2d(px * SECONDARY_BIOME_SCALE, pz * SECONDARY_BIOME_SCALE),
            self.noise
                .sample_unit_2d(px * TERTIARY_BIOME_SCALE, pz * TERTIARY_BIOME_SCALE),
        )
    }

    /// The biome a world column resolves to without a hint.
    pub fn classify_column(&self, world_x: i32, world_z: i32, height: usize) -> Biome {
        let (secondary, tertiary) = self.biome_samples(world_x, world_z);
        Biome::classify(secondary, tertiary, height)
    }

    /// Generates one chunk.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk to generate
    /// * `biome_hint` - Forces this biome for every column when set
    /// * `height_map` - The shared elevation grid
    /// * `overlay` - Pre-seeded cells for this chunk, used as the starting array
    pub fn generate(
        &self,
        coordinate: ChunkCoordinate,
        biome_hint: Option<Biome>,
        height_map: &HeightMap,
        overlay: Option<ChunkVoxelData>,
    ) -> GeneratedChunk {
        let dimensions = self.config.chunk_dimensions();
        let mut data = match overlay {
            Some(overlay) if overlay.dimensions() == dimensions => overlay,
            Some(_) => {
                log::warn!(
                    "Ignoring overlay for chunk {:?}: mismatched dimensions",
                    coordinate
                );
                ChunkVoxelData::new_air(dimensions)
            }
            None => ChunkVoxelData::new_air(dimensions),
        };
        let mut neighbor_writes = PendingOverlays::new();

        for x in 0..dimensions.width {
            for z in 0..dimensions.depth {
                let (world_x, world_z) = dimensions.column_to_world(coordinate, x, z);
                let sample = height_map.sample_world(
                    world_x,
                    world_z,
                    self.config.noise_scale,
                    self.config.noise_offset,
                );
                let height = self.config.surface_height(sample);
                let biome = match biome_hint {
                    Some(biome) => biome,
                    None => self.classify_column(world_x, world_z, height),
                };

                self.fill_column(&mut data, x, z, world_x, world_z, height, biome);

                if let Some(stamper) = &self.stamper {
                    let mut target = StampTarget::new(coordinate, &mut data, &mut neighbor_writes);
                    stamper.stamp(&mut target, x, z);
                }
            }
        }

        GeneratedChunk {
            coordinate,
            data,
            neighbor_writes,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_column(
        &self,
        data: &mut ChunkVoxelData,
        x: usize,
        z: usize,
        world_x: i32,
        world_z: i32,
        height: usize,
        biome: Biome,
    ) {
        let table = &self.config.block_type_table;
        let blocks = table.for_biome(biome);
        let water_level = self.config.water_level();
        let flooded = water_level > height;

        for y in (0..=height).rev() {
            let depth = height - y;

            let mut block = if flooded && depth < SEABED_DEPTH {
                table.seabed
            } else if biome == Biome::Mountains {
                let mut block = if y >= SNOW_LINE {
                    table.snow_cap
                } else if depth == 0 {
                    blocks.surface
                } else {
                    blocks.subsoil
                };
                if depth >= SUBSOIL_DEPTH && y > 0 {
                    block = blocks.deep;
                }
                block
            } else if depth == 0 {
                blocks.surface
            } else if depth < SUBSOIL_DEPTH {
                blocks.subsoil
            } else {
                blocks.deep
            };

            let (wx, wy, wz) = (world_x as f64, y as f64, world_z as f64);

            if block == BlockType::Stone
                && y + CAVE_MIN_DEPTH < height
                && self.noise.sample_3d(wx * CAVE_SCALE, wy * CAVE_SCALE, wz * CAVE_SCALE)
                    >= CAVE_THRESHOLD
            {
                block = BlockType::Air;
            }

            if block == BlockType::Stone {
                if self.noise.sample_3d(
                    wx * PRIMARY_ORE_SCALE,
                    wy * PRIMARY_ORE_SCALE,
                    wz * PRIMARY_ORE_SCALE,
                ) <= PRIMARY_ORE_THRESHOLD
                {
                    block = table.ore_primary;
                }
                if self.noise.sample_3d(
                    wx * SECONDARY_ORE_SCALE,
                    wy * SECONDARY_ORE_SCALE,
                    wz * SECONDARY_ORE_SCALE,
                ) >= SECONDARY_ORE_THRESHOLD
                {
                    block = table.ore_secondary;
                }
            }

            if y == 0 {
                block = table.bedrock;
            }

            data.set_xyz(x, y, z, block);
        }

        if flooded {
            for y in height + 1..water_level {
                let block = if y == water_level - 1 {
                    table.water_surface
                } else {
                    table.water_body
                };
                data.set_xyz(x, y, z, block);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::config::HeightCurve;
    use crate::terrain_state::generation::height_map::HeightMapParams;

    use super::*;

    /// A small world that generates quickly.
    pub(crate) fn small_config() -> TerrainConfig {
        TerrainConfig {
            chunk_width: 8,
            chunk_height: 64,
            chunk_depth: 8,
            render_distance: 1,
            seed: 17,
            octaves: 4,
            height_offset: 20.0,
            height_intensity: 20.0,
            water_offset: 24,
            map_size: [64, 64],
            map_scale: 20.0,
            structure_density: 0.05,
            ..TerrainConfig::default()
        }
    }

    pub(crate) fn height_map_for(config: &TerrainConfig) -> HeightMap {
        HeightMap::generate(&HeightMapParams::from_config(config))
    }

    #[test]
    fn floor_is_bedrock_everywhere() {
        let config = Arc::new(small_config());
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone());
        let chunk = generator.generate(ChunkCoordinate::new(-2, 3), None, &map, None);
        for x in 0..config.chunk_width {
            for z in 0..config.chunk_depth {
                assert_eq!(chunk.data.get_xyz(x, 0, z), BlockType::Bedrock);
            }
        }
    }

    #[test]
    fn same_coordinate_generates_identically() {
        let config = Arc::new(small_config());
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config);
        let coordinate = ChunkCoordinate::new(1, -1);
        let a = generator.generate(coordinate, None, &map, None);
        let b = generator.generate(coordinate, None, &map, None);
        assert_eq!(a, b);
    }

    #[test]
    fn overlay_survives_above_the_surface_and_loses_to_bedrock() {
        let config = Arc::new(small_config());
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone()).without_structures();
        let dimensions = config.chunk_dimensions();

        let mut overlay = ChunkVoxelData::new_air(dimensions);
        overlay.set_xyz(2, 63, 2, BlockType::Log);
        overlay.set_xyz(2, 0, 2, BlockType::Leaves);

        let chunk = generator.generate(ChunkCoordinate::new(0, 0), None, &map, Some(overlay));
        assert_eq!(chunk.data.get_xyz(2, 63, 2), BlockType::Log);
        assert_eq!(chunk.data.get_xyz(2, 0, 2), BlockType::Bedrock);
    }

    #[test]
    fn mismatched_overlay_is_ignored() {
        let config = Arc::new(small_config());
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone()).without_structures();
        let coordinate = ChunkCoordinate::new(0, 0);

        let mut overlay = ChunkVoxelData::new_air(
            crate::terrain_state::voxels::coordinates::ChunkDimensions::new(2, 2, 2),
        );
        overlay.set_xyz(1, 1, 1, BlockType::Log);

        let with = generator.generate(coordinate, None, &map, Some(overlay));
        let without = generator.generate(coordinate, None, &map, None);
        assert_eq!(with, without);
    }

    #[test]
    fn flooded_columns_get_seabed_and_a_water_surface() {
        let config = Arc::new(TerrainConfig {
            water_offset: 60,
            height_offset: 10.0,
            height_intensity: 10.0,
            ..small_config()
        });
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone());
        let chunk = generator.generate(ChunkCoordinate::new(0, 0), None, &map, None);

        for x in 0..config.chunk_width {
            for z in 0..config.chunk_depth {
                assert_eq!(chunk.data.get_xyz(x, 59, z), BlockType::WaterSurface);
                assert_eq!(chunk.data.get_xyz(x, 58, z), BlockType::WaterBody);
                assert_eq!(chunk.data.get_xyz(x, 60, z), BlockType::Air);
                let height = config.surface_height(map.sample_world(
                    x as i32,
                    z as i32,
                    config.noise_scale,
                    config.noise_offset,
                ));
                assert_eq!(chunk.data.get_xyz(x, height, z), BlockType::Sand);
            }
        }
    }

    #[test]
    fn flooded_columns_keep_biome_layers_below_the_seabed() {
        let config = Arc::new(TerrainConfig {
            water_offset: 60,
            height_offset: 10.0,
            height_intensity: 10.0,
            ..small_config()
        });
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone()).without_structures();
        let coordinate = ChunkCoordinate::new(0, 0);
        let desert = generator.generate(coordinate, Some(Biome::Desert), &map, None);
        let plains = generator.generate(coordinate, Some(Biome::Plains), &map, None);

        let height = config.surface_height(map.sample_world(
            2,
            5,
            config.noise_scale,
            config.noise_offset,
        ));
        for depth in 0..SEABED_DEPTH {
            assert_eq!(desert.data.get_xyz(2, height - depth, 5), BlockType::Sand);
            assert_eq!(plains.data.get_xyz(2, height - depth, 5), BlockType::Sand);
        }
        assert_eq!(desert.data.get_xyz(2, height - 3, 5), BlockType::Sand);
        assert_eq!(plains.data.get_xyz(2, height - 3, 5), BlockType::Dirt);
    }

    #[test]
    fn ocean_hint_fills_with_water() {
        let config = Arc::new(TerrainConfig {
            water_offset: 0,
            ..small_config()
        });
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone());
        let chunk = generator.generate(ChunkCoordinate::new(0, 0), Some(Biome::Ocean), &map, None);

        let sample = map.sample_world(0, 0, config.noise_scale, config.noise_offset);
        let height = config.surface_height(sample);
        assert_eq!(chunk.data.get_xyz(0, height, 0), BlockType::WaterBody);
        assert_eq!(chunk.data.get_xyz(0, 1, 0), BlockType::WaterBody);
        assert_eq!(chunk.data.get_xyz(0, 0, 0), BlockType::Bedrock);
    }

    #[test]
    fn desert_hint_layers_sand() {
        let config = Arc::new(TerrainConfig {
            water_offset: 0,
            ..small_config()
        });
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone()).without_structures();
        let chunk = generator.generate(ChunkCoordinate::new(0, 0), Some(Biome::Desert), &map, None);

        let sample = map.sample_world(3, 3, config.noise_scale, config.noise_offset);
        let height = config.surface_height(sample);
        for depth in 0..SUBSOIL_DEPTH {
            assert_eq!(chunk.data.get_xyz(3, height - depth, 3), BlockType::Sand);
        }
    }

    #[test]
    fn mountains_are_capped_with_snow_above_the_line() {
        let config = Arc::new(TerrainConfig {
            chunk_height: 160,
            height_offset: 130.0,
            height_intensity: 10.0,
            water_offset: 0,
            ..small_config()
        });
        let map = height_map_for(&config);
        let generator = ChunkGenerator::new(config.clone()).without_structures();
        let coordinate = ChunkCoordinate::new(0, 0);
        let chunk = generator.generate(coordinate, Some(Biome::Mountains), &map, None);

        let sample = map.sample_world(0, 0, config.noise_scale, config.noise_offset);
        let height = config.surface_height(sample);
        assert!(height >= SNOW_LINE);
        assert_eq!(chunk.data.get_xyz(0, height, 0), BlockType::Snow);
        assert_eq!(chunk.data.get_xyz(0, height - 1, 0), BlockType::Snow);
    }

    #[test]
    fn linear_curve_maps_samples_directly() {
        let config = TerrainConfig {
            height_curve: HeightCurve::linear(),
            height_offset: 0.0,
            height_intensity: 10.0,
            ..small_config()
        };
        assert_eq!(config.surface_height(0.55), 6);
    }
}
