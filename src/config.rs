//! # Terrain Configuration
//!
//! Load-time settings for chunk dimensions, streaming radius, noise parameters,
//! the height response curve and the per-biome block table.
//!
//! Configuration is read from JSON with camelCase keys. Every field has a
//! default, so a partial file only overrides what it names:
//!
//! ```json
//! { "renderDistance": 6, "seed": 1337, "waterOffset": 48 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::terrain_state::generation::biome::Biome;
use crate::terrain_state::voxels::block::block_type::BlockType;
use crate::terrain_state::voxels::coordinates::ChunkDimensions;

/// Smallest fractal scale accepted; anything at or below zero is raised to this.
pub const MIN_NOISE_SCALE: f64 = 0.0001;

/// Top-level terrain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainConfig {
    /// Chunk extent along X, in blocks.
    pub chunk_width: usize,
    /// Chunk extent along Y, in blocks.
    pub chunk_height: usize,
    /// Chunk extent along Z, in blocks.
    pub chunk_depth: usize,
    /// Chebyshev radius, in chunks, of the materialized window around the player.
    pub render_distance: u32,
    /// Seed for every noise source and structure draw.
    pub seed: u32,
    /// Scale applied to world X/Z when mapping columns onto the height map and biome noise.
    pub noise_scale: [f64; 2],
    /// Offset applied to world X/Z when mapping columns, and to the fractal octave offsets.
    pub noise_offset: [f64; 2],
    /// Number of fractal octaves in the height map.
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Base surface height added to the curve response.
    pub height_offset: f64,
    /// Multiplier applied to the curve response.
    pub height_intensity: f64,
    /// Water level; columns lower than this are flooded.
    pub water_offset: i32,
    /// Block types assigned by the column fill.
    pub block_type_table: BlockTypeTable,
    /// Height map extent as `[width, depth]` samples.
    pub map_size: [usize; 2],
    /// Fractal noise scale of the height map.
    pub map_scale: f64,
    /// Response curve mapping a normalized height sample onto `[0, 1]`.
    pub height_curve: HeightCurve,
    /// Per-column chance that a structure is attempted.
    pub structure_density: f64,
    /// Whether the default structure stamper runs during generation.
    pub structures_enabled: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunk_width: 16,
            chunk_height: 256,
            chunk_depth: 16,
            render_distance: 4,
            seed: 0,
            noise_scale: [1.0, 1.0],
            noise_offset: [0.0, 0.0],
            octaves: 10,
            persistence: 0.49,
            lacunarity: 2.34,
            height_offset: 40.0,
            height_intensity: 90.0,
            water_offset: 52,
            block_type_table: BlockTypeTable::default(),
            map_size: [256, 256],
            map_scale: 100.0,
            height_curve: HeightCurve::default(),
            structure_density: 0.01,
            structures_enabled: true,
        }
    }
}

impl TerrainConfig {
    /// Reads and validates a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parses and validates a JSON config string.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: TerrainConfig = serde_json::from_str(contents)?;
        config.validate()
    }

    /// Checks the configuration, failing fast on unusable chunk or map
    /// dimensions and clamping a non-positive map scale.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.chunk_width == 0 || self.chunk_height == 0 || self.chunk_depth == 0 {
            return Err(ConfigError::InvalidChunkDimensions {
                width: self.chunk_width,
                height: self.chunk_height,
                depth: self.chunk_depth,
            });
        }

        if self.map_size[0] == 0 || self.map_size[1] == 0 {
            return Err(ConfigError::InvalidMapSize {
                width: self.map_size[0],
                depth: self.map_size[1],
            });
        }

        if let Some(index) = self.height_curve.first_unsorted_key() {
            return Err(ConfigError::InvalidHeightCurve { index });
        }

        if !(self.map_scale > 0.0) {
            log::warn!(
                "Map scale {} is not positive, clamping to {}",
                self.map_scale,
                MIN_NOISE_SCALE
            );
            self.map_scale = MIN_NOISE_SCALE;
        }

        Ok(self)
    }

    /// The configured chunk extent.
    pub fn chunk_dimensions(&self) -> ChunkDimensions {
        ChunkDimensions::new(self.chunk_width, self.chunk_height, self.chunk_depth)
    }

    /// Maps a normalized height sample to a surface height in blocks,
    /// clamped into the chunk's vertical extent.
    pub fn surface_height(&self, sample: f64) -> usize {
        let response = self.height_curve.evaluate(sample);
        let height = (self.height_offset + response * self.height_intensity).round();
        let max_height = (self.chunk_height - 1) as f64;
        height.clamp(0.0, max_height) as usize
    }

    /// The water level clamped into `[0, chunk_height]`.
    pub fn water_level(&self) -> usize {
        self.water_offset.clamp(0, self.chunk_height as i32) as usize
    }
}

/// One key of a [`HeightCurve`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveKey {
    pub time: f64,
    pub value: f64,
}

/// A piecewise-linear response curve.
///
/// Inputs before the first key or after the last key take that key's value.
/// An empty curve is the identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::new(vec![
            CurveKey { time: 0.0, value: 0.0 },
            CurveKey { time: 0.4, value: 0.2 },
            CurveKey { time: 0.7, value: 0.45 },
            CurveKey { time: 1.0, value: 1.0 },
        ])
    }
}

impl HeightCurve {
    pub fn new(keys: Vec<CurveKey>) -> Self {
        Self { keys }
    }

    /// A curve that returns its input unchanged.
    pub fn linear() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return t,
        };

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.time {
                let span = b.time - a.time;
                if span <= 0.0 {
                    return b.value;
                }
                let f = (t - a.time) / span;
                return a.value + (b.value - a.value) * f;
            }
        }

        last.value
    }

    fn first_unsorted_key(&self) -> Option<usize> {
        self.keys
            .windows(2)
            .position(|pair| pair[1].time < pair[0].time)
            .map(|index| index + 1)
    }
}

/// The block layering used by one biome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BiomeBlocks {
    /// The topmost cell of the column.
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub surface: BlockType,
    /// The cells less than four blocks below the surface.
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub subsoil: BlockType,
    /// Everything deeper.
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub deep: BlockType,
}

/// Block types assigned by the column fill, per biome and for the shared layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockTypeTable {
    pub plains: BiomeBlocks,
    pub desert: BiomeBlocks,
    pub mountains: BiomeBlocks,
    pub ocean: BiomeBlocks,
    /// Mountain cells at or above the snow line.
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub snow_cap: BlockType,
    /// The top layers of a flooded column.
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub seabed: BlockType,
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub bedrock: BlockType,
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub water_surface: BlockType,
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub water_body: BlockType,
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub ore_primary: BlockType,
    #[serde(deserialize_with = "BlockType::deserialize_name_or_id")]
    pub ore_secondary: BlockType,
}

impl Default for BlockTypeTable {
    fn default() -> Self {
        Self {
            plains: BiomeBlocks {
                surface: BlockType::Grass,
                subsoil: BlockType::Dirt,
                deep: BlockType::Stone,
            },
            desert: BiomeBlocks {
                surface: BlockType::Sand,
                subsoil: BlockType::Sand,
                deep: BlockType::Stone,
            },
            mountains: BiomeBlocks {
                surface: BlockType::Stone,
                subsoil: BlockType::Dirt,
                deep: BlockType::Stone,
            },
            ocean: BiomeBlocks {
                surface: BlockType::WaterBody,
                subsoil: BlockType::WaterBody,
                deep: BlockType::WaterBody,
            },
            snow_cap: BlockType::Snow,
            seabed: BlockType::Sand,
            bedrock: BlockType::Bedrock,
            water_surface: BlockType::WaterSurface,
            water_body: BlockType::WaterBody,
            ore_primary: BlockType::CoalOre,
            ore_secondary: BlockType::IronOre,
        }
    }
}

impl BlockTypeTable {
    pub fn for_biome(&self, biome: Biome) -> &BiomeBlocks {
        match biome {
            Biome::Plains => &self.plains,
            Biome::Desert => &self.desert,
            Biome::Mountains => &self.mountains,
            Biome::Ocean => &self.ocean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            TerrainConfig::from_json_str(r#"{ "renderDistance": 2, "seed": 7 }"#).unwrap();
        assert_eq!(config.render_distance, 2);
        assert_eq!(config.seed, 7);
        assert_eq!(config.chunk_height, 256);
        assert_eq!(config.block_type_table, BlockTypeTable::default());
    }

    #[test]
    fn zero_chunk_dimension_fails_fast() {
        let result = TerrainConfig::from_json_str(r#"{ "chunkWidth": 0 }"#);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidChunkDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn non_positive_map_scale_is_clamped() {
        let config = TerrainConfig::from_json_str(r#"{ "mapScale": -3.0 }"#).unwrap();
        assert_eq!(config.map_scale, MIN_NOISE_SCALE);
    }

    #[test]
    fn unsorted_curve_is_rejected() {
        let json = r#"{ "heightCurve": [
            { "time": 0.0, "value": 0.0 },
            { "time": 0.8, "value": 0.5 },
            { "time": 0.5, "value": 1.0 }
        ] }"#;
        assert!(matches!(
            TerrainConfig::from_json_str(json),
            Err(ConfigError::InvalidHeightCurve { index: 2 })
        ));
    }

    #[test]
    fn block_table_reads_block_names() {
        let json = r#"{ "blockTypeTable": { "snowCap": "stone", "bedrock": "dirt" } }"#;
        let config = TerrainConfig::from_json_str(json).unwrap();
        assert_eq!(config.block_type_table.snow_cap, BlockType::Stone);
        assert_eq!(config.block_type_table.bedrock, BlockType::Dirt);
        assert_eq!(config.block_type_table.plains.surface, BlockType::Grass);
    }

    #[test]
    fn block_table_reads_block_ids() {
        let json = r#"{ "blockTypeTable": {
            "seabed": 4,
            "plains": { "surface": "sand", "subsoil": 2, "deep": 3 }
        } }"#;
        let table = TerrainConfig::from_json_str(json).unwrap().block_type_table;
        assert_eq!(table.seabed, BlockType::Bedrock);
        assert_eq!(table.plains.surface, BlockType::Sand);
        assert_eq!(table.plains.subsoil, BlockType::Dirt);
        assert_eq!(table.plains.deep, BlockType::Stone);
    }

    #[test]
    fn unknown_block_id_is_a_parse_error() {
        let json = r#"{ "blockTypeTable": { "seabed": 200 } }"#;
        assert!(matches!(
            TerrainConfig::from_json_str(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn curve_interpolates_and_clamps() {
        let curve = HeightCurve::new(vec![
            CurveKey { time: 0.0, value: 0.0 },
            CurveKey { time: 0.5, value: 1.0 },
        ]);
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert!((curve.evaluate(0.25) - 0.5).abs() < 1e-9);
        assert_eq!(curve.evaluate(0.9), 1.0);
        assert_eq!(HeightCurve::linear().evaluate(0.3), 0.3);
    }

    #[test]
    fn surface_height_stays_inside_chunk() {
        let config = TerrainConfig {
            chunk_height: 64,
            height_offset: 50.0,
            height_intensity: 100.0,
            height_curve: HeightCurve::linear(),
            ..TerrainConfig::default()
        };
        assert_eq!(config.surface_height(1.0), 63);
        assert_eq!(config.surface_height(0.0), 50);
    }
}
