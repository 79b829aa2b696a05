use strata_core::glam::{IVec2, IVec3};
use strata_core::static_assertions::const_assert_eq;
use strata_core::units::{ChunkUnits, RegionUnits, VoxelUnits};

/// Edge length of one region file, in voxels, along x and z.
pub const REGION_LENGTH: i32 = 512;
pub const REGION_LENGTH_LOG2: i32 = 9;

/// Edge length of one chunk within a region, along x and z.
pub const CHUNK_LENGTH: i32 = 16;
pub const CHUNK_LENGTH_LOG2: i32 = 4;

pub const CHUNKS_PER_REGION_EDGE: i32 = REGION_LENGTH >> CHUNK_LENGTH_LOG2;

const_assert_eq!(1 << REGION_LENGTH_LOG2, REGION_LENGTH);
const_assert_eq!(1 << CHUNK_LENGTH_LOG2, CHUNK_LENGTH);
const_assert_eq!(CHUNKS_PER_REGION_EDGE, 32);

/// The (x, z) coordinates of the region file containing `p`.
///
/// Arithmetic right shift floor-divides, which is what the region grid needs for negative
/// coordinates.
pub fn region_coords(p: VoxelUnits<IVec3>) -> RegionUnits<IVec2> {
    RegionUnits(IVec2::new(
        p.0.x >> REGION_LENGTH_LOG2,
        p.0.z >> REGION_LENGTH_LOG2,
    ))
}

/// The (x, z) index of the chunk containing `p`, relative to its own region.
pub fn chunk_coords_in_region(p: VoxelUnits<IVec3>) -> ChunkUnits<IVec2> {
    let region_local = IVec2::new(p.0.x & (REGION_LENGTH - 1), p.0.z & (REGION_LENGTH - 1));
    ChunkUnits(region_local >> CHUNK_LENGTH_LOG2)
}

/// Offset of `p` within its chunk: x and z in `[0, 16)`, y untouched (chunks span full height).
pub fn coords_in_chunk(p: VoxelUnits<IVec3>) -> VoxelUnits<IVec3> {
    VoxelUnits(IVec3::new(
        p.0.x & (CHUNK_LENGTH - 1),
        p.0.y,
        p.0.z & (CHUNK_LENGTH - 1),
    ))
}
