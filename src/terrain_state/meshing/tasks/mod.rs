//! Background tasks run by the mesh consumers.

pub mod chunk_mesh_generation_task;
