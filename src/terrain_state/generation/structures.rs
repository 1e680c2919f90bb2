//! # Structure Stamping
//!
//! Structures are stamped column by column after the column fill. A stamper
//! writes through a [`StampTarget`], which keeps in-chunk writes in the chunk
//! being generated and routes everything that spills over a horizontal chunk
//! edge into a task-local overlay map keyed by the neighbour's coordinate.
//! Writes above or below the world are clipped.

use cgmath::Point3;

use crate::terrain_state::voxels::block::block_type::BlockType;
use crate::terrain_state::voxels::chunk::ChunkVoxelData;
use crate::terrain_state::voxels::coordinates::{
    ChunkCoordinate, ChunkDimensions, LocalBlockPosition,
};
use crate::terrain_state::voxels::overlay::PendingOverlays;

/// Mutable view of a chunk under generation plus its spill-over overlays.
pub struct StampTarget<'a> {
    coordinate: ChunkCoordinate,
    chunk: &'a mut ChunkVoxelData,
    neighbors: &'a mut PendingOverlays,
}

impl<'a> StampTarget<'a> {
    pub fn new(
        coordinate: ChunkCoordinate,
        chunk: &'a mut ChunkVoxelData,
        neighbors: &'a mut PendingOverlays,
    ) -> Self {
        Self {
            coordinate,
            chunk,
            neighbors,
        }
    }

    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    pub fn dimensions(&self) -> ChunkDimensions {
        self.chunk.dimensions()
    }

    /// World X/Z of a local column.
    pub fn world_column(&self, local_x: usize, local_z: usize) -> (i32, i32) {
        self.dimensions()
            .column_to_world(self.coordinate, local_x, local_z)
    }

    /// The highest non-air cell of a local column.
    pub fn surface_height(&self, local_x: usize, local_z: usize) -> Option<usize> {
        self.chunk.surface_height(local_x, local_z)
    }

    /// Reads a cell of the chunk under generation; `None` outside it.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        self.chunk.try_get(x, y, z)
    }

    /// Writes a cell given in chunk-local coordinates, which may lie outside
    /// the chunk horizontally.
    ///
    /// # Returns
    /// `false` if the write was clipped by the vertical extent.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        let dimensions = self.dimensions();
        if y < 0 || y as usize >= dimensions.height {
            return false;
        }

        let inside_x = x >= 0 && (x as usize) < dimensions.width;
        let inside_z = z >= 0 && (z as usize) < dimensions.depth;
        if inside_x && inside_z {
            self.chunk
                .set(LocalBlockPosition::new(x as usize, y as usize, z as usize), block);
            return true;
        }

        let origin = dimensions.local_to_world(self.coordinate, LocalBlockPosition::new(0, 0, 0));
        let world = Point3::new(origin.x + x, y, origin.z + z);
        match dimensions.world_to_local(world) {
            Some((neighbor, local)) => {
                self.neighbors.write(neighbor, dimensions, local, block);
                true
            }
            None => false,
        }
    }

    /// Like [`set_block`](Self::set_block), but leaves non-air cells of the
    /// chunk under generation alone. Spill-over writes always apply.
    pub fn set_block_if_air(&mut self, x: i32, y: i32, z: i32, block: BlockType) -> bool {
        match self.get_block(x, y, z) {
            Some(existing) if !existing.is_air() => false,
            _ => self.set_block(x, y, z, block),
        }
    }
}

/// Places structures onto freshly filled columns.
///
/// Implementations must be deterministic in the world column so that a chunk
/// regenerates identically.
pub trait StructureStamper {
    fn stamp(&self, target: &mut StampTarget<'_>, local_x: usize, local_z: usize);
}

/// A quarter-turn rotation about the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    /// Rotates a horizontal template offset.
    pub fn apply(self, dx: i32, dz: i32) -> (i32, i32) {
        match self {
            Rotation::R0 => (dx, dz),
            Rotation::R90 => (-dz, dx),
            Rotation::R180 => (-dx, -dz),
            Rotation::R270 => (dz, -dx),
        }
    }
}

/// Trees on grass and cacti on sand.
pub struct TreeStamper {
    seed: u32,
    density: f64,
}

impl TreeStamper {
    pub fn new(seed: u32, density: f64) -> Self {
        Self {
            seed,
            density: density.clamp(0.0, 1.0),
        }
    }

    fn column_rng(&self, world_x: i32, world_z: i32) -> fastrand::Rng {
        let x = (world_x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let z = (world_z as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        fastrand::Rng::with_seed((self.seed as u64) ^ x ^ z.rotate_left(31))
    }

    fn place_tree(
        target: &mut StampTarget<'_>,
        rng: &mut fastrand::Rng,
        x: i32,
        base: i32,
        z: i32,
        rotation: Rotation,
    ) {
        let trunk = rng.i32(4..=6);
        for dy in 1..=trunk {
            target.set_block(x, base + dy, z, BlockType::Log);
        }

        let top = base + trunk;
        for dy in -1..=1 {
            let radius: i32 = if dy < 1 { 2 } else { 1 };
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    if radius == 2 && dx.abs() == 2 && dz.abs() == 2 {
                        continue;
                    }
                    target.set_block_if_air(x + dx, top + dy, z + dz, BlockType::Leaves);
                }
            }
        }
        target.set_block_if_air(x, top + 2, z, BlockType::Leaves);

        // Side branch
        let (bx, bz) = rotation.apply(1, 0);
        target.set_block(x + bx, top - 2, z + bz, BlockType::Log);
        let (lx, lz) = rotation.apply(3, 0);
        target.set_block_if_air(x + lx, top - 1, z + lz, BlockType::Leaves);
    }

    fn place_cactus(
        target: &mut StampTarget<'_>,
        rng: &mut fastrand::Rng,
        x: i32,
        base: i32,
        z: i32,
        rotation: Rotation,
    ) {
        let height = rng.i32(2..=4);
        for dy in 1..=height {
            target.set_block(x, base + dy, z, BlockType::Cactus);
        }
        if height >= 3 {
            let (ax, az) = rotation.apply(1, 0);
            target.set_block_if_air(x + ax, base + 2, z + az, BlockType::Cactus);
            target.set_block_if_air(x + ax, base + 3, z + az, BlockType::Cactus);
        }
    }
}

impl StructureStamper for TreeStamper {
    fn stamp(&self, target: &mut StampTarget<'_>, local_x: usize, local_z: usize) {
        let (world_x, world_z) = target.world_column(local_x, local_z);
        let mut rng = self.column_rng(world_x, world_z);
        if rng.f64() >= self.density {
            return;
        }

        let Some(surface) = target.surface_height(local_x, local_z) else {
            return;
        };
        let (x, base, z) = (local_x as i32, surface as i32, local_z as i32);
        let rotation = Rotation::from_quarter_turns(rng.u8(0..4));

        match target.get_block(x, base, z) {
            Some(BlockType::Grass) => Self::place_tree(target, &mut rng, x, base, z, rotation),
            Some(BlockType::Sand) => Self::place_cactus(target, &mut rng, x, base, z, rotation),
            _ => {}
        }
    }
}
