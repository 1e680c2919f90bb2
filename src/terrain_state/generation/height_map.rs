//! # Height Map
//!
//! A one-time grid of fractal noise samples normalized into `[0, 1]`.
//!
//! The map is generated once when the terrain starts and shared read-only by
//! every generation task. Each world column samples the grid through
//! [`HeightMap::sample_world`]; the grid tiles, so the terrain repeats every
//! `width` × `depth` mapped columns.
//!
//! ## Fractal Sum
//!
//! Each cell accumulates `amplitude * noise(sampled_x, sampled_y)` over the
//! octaves, multiplying amplitude by `persistence` and frequency by
//! `lacunarity` at each step. Every octave samples at its own random offset,
//! drawn once from the seed. The finished grid is min-max normalized.

use crate::config::{TerrainConfig, MIN_NOISE_SCALE};

use super::noise_field::NoiseField;

/// Range of the per-octave offsets drawn from the seed.
const OCTAVE_OFFSET_RANGE: std::ops::Range<i32> = -100_000..100_000;

/// Inputs of [`HeightMap::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMapParams {
    pub width: usize,
    pub depth: usize,
    pub scale: f64,
    pub seed: u32,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    pub offset: [f64; 2],
}

impl HeightMapParams {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            width: config.map_size[0],
            depth: config.map_size[1],
            scale: config.map_scale,
            seed: config.seed,
            octaves: config.octaves,
            persistence: config.persistence,
            lacunarity: config.lacunarity,
            offset: config.noise_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap {
    width: usize,
    depth: usize,
    samples: Vec<f64>,
}

impl HeightMap {
    /// Generates the full grid. A pure function of `params`.
    pub fn generate(params: &HeightMapParams) -> Self {
        let noise = NoiseField::new(params.seed);
        let mut rng = fastrand::Rng::with_seed(params.seed as u64);
        let octave_offsets: Vec<(f64, f64)> = (0..params.octaves)
            .map(|_| {
                let x = rng.i32(OCTAVE_OFFSET_RANGE) as f64 + params.offset[0];
                let y = rng.i32(OCTAVE_OFFSET_RANGE) as f64 - params.offset[1];
                (x, y)
            })
            .collect();

        let scale = if params.scale > 0.0 {
            params.scale
        } else {
            MIN_NOISE_SCALE
        };

        let half_width = (params.width / 2) as f64;
        let half_depth = (params.depth / 2) as f64;

        let mut samples = Vec::with_capacity(params.width * params.depth);
        let mut min_height = f64::MAX;
        let mut max_height = f64::MIN;

        for z in 0..params.depth {
            for x in 0..params.width {
                let mut amplitude = 1.0;
                let mut frequency = 1.0;
                let mut height = 0.0;

                for &(offset_x, offset_y) in &octave_offsets {
                    let sampled_x =
                        (x as f64 - half_width) / scale * frequency + offset_x * frequency;
                    let sampled_y =
                        (z as f64 - half_depth) / scale * frequency - offset_y * frequency;

                    height += noise.sample_2d(sampled_x, sampled_y) * amplitude;

                    amplitude *= params.persistence;
                    frequency *= params.lacunarity;
                }

                min_height = min_height.min(height);
                max_height = max_height.max(height);
                samples.push(height);
            }
        }

        let range = max_height - min_height;
        for sample in &mut samples {
            *sample = if range > 0.0 {
                (*sample - min_height) / range
            } else {
                0.0
            };
        }

        HeightMap {
            width: params.width,
            depth: params.depth,
            samples,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The normalized sample at a grid cell.
    ///
    /// # Panics
    /// Panics if the cell is outside the grid.
    pub fn get(&self, x: usize, z: usize) -> f64 {
        self.samples[x + self.width * z]
    }

    /// Samples the grid for a world column.
    ///
    /// The column is mapped to `floor(world * scale + offset)` on each axis and
    /// wrapped into the grid.
    pub fn sample_world(
        &self,
        world_x: i32,
        world_z: i32,
        scale: [f64; 2],
        offset: [f64; 2],
    ) -> f64 {
        let map_x = (world_x as f64 * scale[0] + offset[0]).floor() as i64;
        let map_z = (world_z as f64 * scale[1] + offset[1]).floor() as i64;
        let x = map_x.rem_euclid(self.width as i64) as usize;
        let z = map_z.rem_euclid(self.depth as i64) as usize;
        self.get(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> HeightMapParams {
        HeightMapParams {
            width: 48,
            depth: 32,
            scale: 25.0,
            seed: 99,
            octaves: 4,
            persistence: 0.49,
            lacunarity: 2.34,
            offset: [3.0, -7.0],
        }
    }

    #[test]
    fn identical_params_give_bit_identical_grids() {
        let a = HeightMap::generate(&params());
        let b = HeightMap::generate(&params());
        assert_eq!(a, b);
    }

    #[test]
    fn grid_is_normalized() {
        let map = HeightMap::generate(&params());
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for z in 0..map.depth() {
            for x in 0..map.width() {
                let sample = map.get(x, z);
                min = min.min(sample);
                max = max.max(sample);
            }
        }
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn different_seeds_differ() {
        let a = HeightMap::generate(&params());
        let b = HeightMap::generate(&HeightMapParams {
            seed: 100,
            ..params()
        });
        assert_ne!(a, b);
    }

    #[test]
    fn zero_scale_does_not_divide_by_zero() {
        let map = HeightMap::generate(&HeightMapParams {
            scale: 0.0,
            ..params()
        });
        assert!(map.samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn world_sampling_wraps_negative_columns() {
        let map = HeightMap::generate(&params());
        assert_eq!(
            map.sample_world(-1, -1, [1.0, 1.0], [0.0, 0.0]),
            map.get(47, 31)
        );
        assert_eq!(map.sample_world(48, 0, [1.0, 1.0], [0.0, 0.0]), map.get(0, 0));
    }
}
