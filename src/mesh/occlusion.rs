//! Per-corner ambient occlusion for cube faces

use glam::IVec3;

use crate::voxel::{FaceDirection, VoxelGrid};
use super::tables::cube_face;

/// Occlusion of one face corner, 0-3.
///
/// Two blocking edge cells fully shadow the corner; otherwise each blocking
/// cell among the two edges and the diagonal adds one.
pub fn corner_occlusion(grid: &VoxelGrid, p: IVec3, face: FaceDirection, corner: usize) -> i32 {
    let [diagonal, edge1, edge2] = cube_face(face).occlusion[corner];

    let edge1 = grid.is_occluder(p + edge1);
    let edge2 = grid.is_occluder(p + edge2);
    if edge1 && edge2 {
        return 3;
    }
    i32::from(edge1) + i32::from(edge2) + i32::from(grid.is_occluder(p + diagonal))
}

/// Occlusion for all four corners of `face`, in table corner order
pub fn face_occlusion(grid: &VoxelGrid, p: IVec3, face: FaceDirection) -> [i32; 4] {
    [0, 1, 2, 3].map(|corner| corner_occlusion(grid, p, face, corner))
}
