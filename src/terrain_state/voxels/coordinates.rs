//! # Coordinates Module
//!
//! The three coordinate spaces of the voxel world and the conversions between them:
//!
//! * **World block positions** (`Point3<i32>`) address a single voxel anywhere in the world.
//! * **Chunk coordinates** ([`ChunkCoordinate`]) address a full-height column of voxels on the
//!   horizontal chunk grid.
//! * **Local block positions** ([`LocalBlockPosition`]) address a cell inside one chunk.
//!
//! World → chunk conversion floor-divides by the chunk width/depth, so negative world
//! positions land in negative chunks (`-1` is in chunk `-1`, not chunk `0`).

use cgmath::Point3;

/// Integer pair identifying a chunk on the horizontal grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoordinate {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Grid distance to `other`, measured as the larger of the two axis distances.
    pub fn chebyshev_distance(&self, other: &ChunkCoordinate) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        dx.max(dz)
    }

    /// Every coordinate within `radius` of this one, inclusive, in row-major order (X outer).
    pub fn square_around(&self, radius: u32) -> Vec<ChunkCoordinate> {
        let r = radius as i32;
        let side = (2 * radius as usize) + 1;
        let mut coordinates = Vec::with_capacity(side * side);
        for x in (self.x - r)..=(self.x + r) {
            for z in (self.z - r)..=(self.z + r) {
                coordinates.push(ChunkCoordinate::new(x, z));
            }
        }
        coordinates
    }
}

/// Integer triple addressing a cell inside one chunk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalBlockPosition {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalBlockPosition {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

/// The fixed extent of every chunk in the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkDimensions {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl ChunkDimensions {
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Number of cells in one chunk.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }

    pub fn contains(&self, local: LocalBlockPosition) -> bool {
        local.x < self.width && local.y < self.height && local.z < self.depth
    }

    /// The chunk that owns the given world block position.
    pub fn chunk_of(&self, position: Point3<i32>) -> ChunkCoordinate {
        ChunkCoordinate::new(
            position.x.div_euclid(self.width as i32),
            position.z.div_euclid(self.depth as i32),
        )
    }

    /// The chunk containing a continuous world position, such as the player's.
    pub fn chunk_of_point(&self, position: Point3<f32>) -> ChunkCoordinate {
        ChunkCoordinate::new(
            (position.x / self.width as f32).floor() as i32,
            (position.z / self.depth as f32).floor() as i32,
        )
    }

    /// Splits a world block position into its owning chunk and the cell inside it.
    ///
    /// # Returns
    /// `None` if the position lies outside the vertical extent of the world.
    pub fn world_to_local(
        &self,
        position: Point3<i32>,
    ) -> Option<(ChunkCoordinate, LocalBlockPosition)> {
        if position.y < 0 || position.y as usize >= self.height {
            return None;
        }
        let coordinate = self.chunk_of(position);
        let local = LocalBlockPosition::new(
            position.x.rem_euclid(self.width as i32) as usize,
            position.y as usize,
            position.z.rem_euclid(self.depth as i32) as usize,
        );
        Some((coordinate, local))
    }

    /// The world position of a cell in the given chunk.
    pub fn local_to_world(
        &self,
        coordinate: ChunkCoordinate,
        local: LocalBlockPosition,
    ) -> Point3<i32> {
        Point3::new(
            coordinate.x * self.width as i32 + local.x as i32,
            local.y as i32,
            coordinate.z * self.depth as i32 + local.z as i32,
        )
    }

    /// World X/Z of a column in the given chunk.
    pub fn column_to_world(
        &self,
        coordinate: ChunkCoordinate,
        local_x: usize,
        local_z: usize,
    ) -> (i32, i32) {
        (
            coordinate.x * self.width as i32 + local_x as i32,
            coordinate.z * self.depth as i32 + local_z as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: ChunkDimensions = ChunkDimensions::new(16, 256, 16);

    #[test]
    fn negative_positions_floor_into_negative_chunks() {
        assert_eq!(DIMS.chunk_of(Point3::new(-1, 10, -16)), ChunkCoordinate::new(-1, -1));
        assert_eq!(DIMS.chunk_of(Point3::new(-17, 10, 15)), ChunkCoordinate::new(-2, 0));
        assert_eq!(
            DIMS.chunk_of_point(Point3::new(-0.5, 64.0, 31.9)),
            ChunkCoordinate::new(-1, 1)
        );
    }

    #[test]
    fn world_to_local_round_trips() {
        let position = Point3::new(-3, 70, 37);
        let (coordinate, local) = DIMS.world_to_local(position).unwrap();
        assert_eq!(coordinate, ChunkCoordinate::new(-1, 2));
        assert_eq!(local, LocalBlockPosition::new(13, 70, 5));
        assert_eq!(DIMS.local_to_world(coordinate, local), position);
    }

    #[test]
    fn world_to_local_rejects_out_of_height() {
        assert!(DIMS.world_to_local(Point3::new(0, -1, 0)).is_none());
        assert!(DIMS.world_to_local(Point3::new(0, 256, 0)).is_none());
    }

    #[test]
    fn square_around_is_inclusive_and_row_major() {
        let square = ChunkCoordinate::new(0, 0).square_around(1);
        assert_eq!(square.len(), 9);
        assert_eq!(square[0], ChunkCoordinate::new(-1, -1));
        assert_eq!(square[1], ChunkCoordinate::new(-1, 0));
        assert_eq!(square[8], ChunkCoordinate::new(1, 1));
        assert!(square
            .iter()
            .all(|c| c.chebyshev_distance(&ChunkCoordinate::new(0, 0)) <= 1));
    }
}
