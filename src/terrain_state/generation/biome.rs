use serde::{Deserialize, Serialize};

/// Secondary-noise value at or below which a column is desert.
pub const DESERT_THRESHOLD: f64 = 0.4;
/// Tertiary-noise value at or below which a high enough column is mountains.
pub const MOUNTAIN_THRESHOLD: f64 = 0.3;
/// Minimum surface height of a mountain column.
pub const MOUNTAIN_MIN_HEIGHT: usize = 90;

/// The layering rule applied to a terrain column.
///
/// Recomputed every time a column is generated; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Plains,
    Desert,
    Ocean,
    Mountains,
}

impl Biome {
    /// Classifies a column from its two biome noise samples and its surface height.
    ///
    /// Never yields [`Biome::Ocean`]; ocean columns only come from a request's
    /// biome hint.
    pub fn classify(secondary: f64, tertiary: f64, height: usize) -> Biome {
        if secondary <= DESERT_THRESHOLD {
            Biome::Desert
        } else if tertiary <= MOUNTAIN_THRESHOLD && height >= MOUNTAIN_MIN_HEIGHT {
            Biome::Mountains
        } else {
            Biome::Plains
        }
    }
}
