//! # Block Editing
//!
//! Single-block edits of committed terrain. Edits happen on the cooperative
//! thread between ticks and take effect in the store immediately; the owning
//! chunk is re-meshed if it has a mesh or is waiting for one.

use cgmath::{Deg, Point3};

use crate::error::EditError;

use super::meshing::MeshConsumer;
use super::spawner::{EntitySpawner, PrefabHandle};
use super::voxels::block::block_type::BlockType;
use super::TerrainState;

/// A decorative object placed instead of a voxel write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialPlacement {
    pub prefab: PrefabHandle,
    /// Facing of the actor placing it, about the Y axis.
    pub facing: Deg<f32>,
}

impl<M: MeshConsumer, S: EntitySpawner> TerrainState<M, S> {
    /// Edits the block at a world position.
    ///
    /// * With `destroy`, the block previously in the cell is reported to the
    ///   spawner as a dropped item.
    /// * With `special`, the spawner places the object and the cell is left
    ///   untouched.
    /// * Otherwise `block` is written and the owning chunk is re-meshed.
    ///
    /// # Errors
    /// * [`EditError::OutOfBounds`] if the position is above or below the world
    /// * [`EditError::ChunkNotGenerated`] if the owning chunk has no data yet
    pub fn set_block(
        &mut self,
        position: Point3<i32>,
        block: BlockType,
        destroy: bool,
        special: Option<SpecialPlacement>,
    ) -> Result<(), EditError> {
        let (coordinate, local) = self
            .world
            .dimensions()
            .world_to_local(position)
            .ok_or(EditError::OutOfBounds { position })?;

        let data = self
            .world
            .chunks_mut()
            .get_mut(coordinate)
            .ok_or(EditError::ChunkNotGenerated { coordinate })?;

        if destroy {
            self.spawner.spawn_dropped_item(data.get(local), position);
        }

        if let Some(special) = special {
            self.spawner
                .spawn_special(special.prefab, position, special.facing);
            return Ok(());
        }

        data.set(local, block);
        log::debug!("Set {:?} to {:?}", position, block);

        self.lifecycle
            .request_refresh(coordinate, &self.world, &mut self.mesh_consumer);
        Ok(())
    }
}
