//! # Entity Spawning
//!
//! Side effects of world edits that create entities instead of voxels: the
//! item dropped by a destroyed block and decorative special placements.

use cgmath::{Deg, Point3};

use crate::terrain_state::voxels::block::block_type::BlockType;

/// Opaque id of a placeable special object, resolved by the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefabHandle(pub u32);

/// Receives entity side effects of edits. Called on the cooperative thread.
pub trait EntitySpawner {
    /// A destroyed block left an item of its former type at `position`.
    fn spawn_dropped_item(&mut self, block: BlockType, position: Point3<i32>);

    /// A special object was placed at `position`, turned to `facing` about Y.
    fn spawn_special(&mut self, prefab: PrefabHandle, position: Point3<i32>, facing: Deg<f32>);
}

/// Logs every spawn and does nothing else.
#[derive(Debug, Default)]
pub struct LoggingSpawner;

impl EntitySpawner for LoggingSpawner {
    fn spawn_dropped_item(&mut self, block: BlockType, position: Point3<i32>) {
        log::info!("Dropped {:?} at {:?}", block, position);
    }

    fn spawn_special(&mut self, prefab: PrefabHandle, position: Point3<i32>, facing: Deg<f32>) {
        log::info!("Placed prefab {:?} at {:?} facing {:?}", prefab, position, facing);
    }
}
