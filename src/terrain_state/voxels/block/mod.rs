//! # Block Module
//!
//! Block type definitions and block face handling.

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// This is the id exchanged with the mesh consumer and the item spawner.
pub type BlockTypeSize = u8;
