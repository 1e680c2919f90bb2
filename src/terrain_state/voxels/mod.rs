//! # Voxels Module
//!
//! The voxel data model: block materials, chunk arrays, the coordinate
//! systems between world, chunk and cell, and the world store that owns
//! committed chunks, pending overlays and the active set.

pub mod block;
pub mod chunk;
pub mod chunk_store;
pub mod coordinates;
pub mod overlay;
pub mod tasks;
pub mod world;
