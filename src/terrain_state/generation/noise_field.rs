//! # Noise Field
//!
//! Deterministic Perlin sampling for terrain generation. A `NoiseField` is a
//! pure function of its seed and the sample coordinates, and is cheap to share
//! between threads.

use noise::{NoiseFn, Perlin};

#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Signed 2D noise in `[-1, 1]`.
    pub fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.perlin.get([x, y]).clamp(-1.0, 1.0)
    }

    /// 2D noise remapped to `[0, 1]`.
    pub fn sample_unit_2d(&self, x: f64, y: f64) -> f64 {
        (self.sample_2d(x, y) + 1.0) * 0.5
    }

    /// 3D noise in `[0, 1]`.
    ///
    /// This is a cheap approximation rather than coherent 3D noise: it averages
    /// the six 2D samples over the coordinate pairs (x,y), (y,z), (x,z) and
    /// their swaps. It is smooth enough for carving caves and ore veins.
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let ab = self.sample_unit_2d(x, y);
        let bc = self.sample_unit_2d(y, z);
        let ac = self.sample_unit_2d(x, z);

        let ba = self.sample_unit_2d(y, x);
        let cb = self.sample_unit_2d(z, y);
        let ca = self.sample_unit_2d(z, x);

        (ab + bc + ac + ba + cb + ca) / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_deterministic_per_seed() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        for i in 0..32 {
            let x = i as f64 * 0.37;
            assert_eq!(a.sample_2d(x, -x), b.sample_2d(x, -x));
            assert_eq!(a.sample_3d(x, x * 0.5, -x), b.sample_3d(x, x * 0.5, -x));
        }
    }

    #[test]
    fn samples_stay_in_range() {
        let field = NoiseField::new(7);
        for i in 0..200 {
            let x = i as f64 * 0.173 - 10.0;
            let signed = field.sample_2d(x, x * 1.3);
            assert!((-1.0..=1.0).contains(&signed));
            let unit = field.sample_3d(x, x * 0.7, x * 1.9);
            assert!((0.0..=1.0).contains(&unit));
        }
    }
}
