//! # Voxel Task System
//!
//! Tasks that fill chunk data on a background worker. They own everything
//! they read and hand their output back to the cooperative thread for commit.

pub mod chunk_generation_task;
