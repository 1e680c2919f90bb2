//! # Block Type Module
//!
//! This module defines the materials a voxel cell can hold.
//! Zero is reserved for air: an empty cell is `BlockType::Air`, never a missing entry.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::BlockTypeSize;

/// Enumerates all voxel materials in the world.
///
/// The discriminants are the compact ids handed to the mesh consumer and the
/// item spawner. The `FromPrimitive` derive allows conversion back from those ids.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// Empty space.
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    /// The indestructible floor at y = 0.
    Bedrock = 4,
    Sand = 5,
    Snow = 6,
    Log = 7,
    WaterBody = 8,
    WaterSurface = 9,
    CoalOre = 10,
    IronOre = 11,
    Leaves = 12,
    Cactus = 13,
}

impl BlockType {
    /// Converts a compact id back into a `BlockType`.
    ///
    /// # Returns
    /// `None` if the id does not name a block type.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        <Self as FromPrimitive>::from_u8(id)
    }

    /// The compact id of this block type.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Deserializes a block given either by its snake_case name or by its id.
    pub fn deserialize_name_or_id<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NameOrId {
            Id(BlockTypeSize),
            Name(BlockType),
        }

        match NameOrId::deserialize(deserializer)? {
            NameOrId::Name(block) => Ok(block),
            NameOrId::Id(id) => {
                Self::from_id(id).ok_or_else(|| D::Error::custom(format!("unknown block id {id}")))
            }
        }
    }

    pub fn is_air(self) -> bool {
        self == BlockType::Air
    }

    /// Whether the block occludes its neighbours' faces.
    pub fn is_opaque(self) -> bool {
        !matches!(
            self,
            BlockType::Air | BlockType::WaterBody | BlockType::WaterSurface | BlockType::Leaves
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_id() {
        assert_eq!(BlockType::from_id(0), Some(BlockType::Air));
        assert_eq!(BlockType::from_id(4), Some(BlockType::Bedrock));
        assert_eq!(BlockType::from_id(200), None);
        assert_eq!(BlockType::IronOre.id(), 11);
    }

    #[test]
    fn default_is_air() {
        assert!(BlockType::default().is_air());
    }
}
