//! Small procedural grids for demos, benches and tests

use glam::IVec3;
use rayon::prelude::*;

use crate::core::Result;
use super::grid::{GridSize, VoxelGrid};
use super::voxel::{Voxel, SLOPE_TYPE_COUNT};

/// Hollow rock sphere in a `side`³ grid.
///
/// Voxels at distance `d` from the centre with `inner_r <= d < r` are Rock,
/// everything else is Empty, where `r = side/2 - 1` and
/// `inner_r = inner_side/2 - 1`. Visible faces are computed.
pub fn ball(side: u32, inner_side: u32) -> Result<VoxelGrid> {
    let size = GridSize::cubic(side);
    let r = (side / 2) as f64 - 1.0;
    let inner_r = (inner_side / 2) as f64 - 1.0;

    let mut voxels = vec![Voxel::EMPTY; size.checked_volume().unwrap_or(0)];
    voxels
        .par_chunks_mut(size.slab_len().max(1))
        .enumerate()
        .for_each(|(z, slab)| {
            for (i, voxel) in slab.iter_mut().enumerate() {
                let x = (i % side as usize) as f64;
                let y = (i / side as usize) as f64;
                let d = ((x - r).powi(2) + (y - r).powi(2) + (z as f64 - r).powi(2)).sqrt();
                if d < r && d >= inner_r {
                    *voxel = Voxel::ROCK;
                }
            }
        });

    let mut grid = VoxelGrid::from_voxels(size, voxels)?;
    grid.compute_all_visible_faces();
    Ok(grid)
}

/// 16³ Empty grid holding one slope of every shape and rotation.
///
/// Shape `t` sits on level `2 + 2t`, rotation `d` at `x = 4 + 2d`, all on `y = 8`.
pub fn slope_showcase() -> Result<VoxelGrid> {
    let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY)?;
    for slope_type in 0..SLOPE_TYPE_COUNT {
        for dir in 0..4u8 {
            let p = IVec3::new(4 + dir as i32 * 2, 8, 2 + slope_type as i32 * 2);
            grid.set_raw(p, Voxel::slope(slope_type, dir));
        }
    }
    grid.compute_all_visible_faces();
    Ok(grid)
}

/// 16³ Empty grid with a rock column ringed by slopes whose shapes are
/// derived from the rock around them
pub fn slope_ring() -> Result<VoxelGrid> {
    let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY)?;
    let center = IVec3::splat(8);
    grid.set_raw(center, Voxel::ROCK);
    for y in -1..=1 {
        for x in -1..=1 {
            if x != 0 || y != 0 {
                grid.set_raw(center + IVec3::new(x, y, 0), Voxel::SLOPE);
            }
        }
    }
    grid.assign_slope_dirs();
    grid.compute_all_visible_faces();
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::VoxelType;

    #[test]
    fn test_ball_is_hollow() {
        let grid = ball(16, 8).unwrap();
        assert!(grid.voxel_at(IVec3::splat(7)).is_empty());
        assert_eq!(grid.voxel_at(IVec3::new(7, 7, 1)).voxel_type(), VoxelType::Rock);
        assert!(grid.voxel_at(IVec3::ZERO).is_empty());
        assert!(grid.visible_face_count() > 0);
    }

    #[test]
    fn test_solid_ball() {
        let grid = ball(8, 0).unwrap();
        assert_eq!(grid.voxel_at(IVec3::splat(3)).voxel_type(), VoxelType::Rock);
    }

    #[test]
    fn test_slope_showcase_has_every_shape() {
        let grid = slope_showcase().unwrap();
        let slopes: Vec<_> = grid.voxels().iter().filter(|v| v.is_slope()).collect();
        assert_eq!(slopes.len(), 20);
        let v = grid.voxel_at(IVec3::new(10, 8, 10));
        assert_eq!((v.slope_type(), v.dir()), (4, 3));
    }

    #[test]
    fn test_slope_ring_faces_rock() {
        let grid = slope_ring().unwrap();
        // Rock to the east gives a ramp rotated by one step
        let west = grid.voxel_at(IVec3::new(7, 8, 8));
        assert_eq!((west.slope_type(), west.dir()), (0, 1));
        // Only diagonal rock: flat-bottom corner
        let corner = grid.voxel_at(IVec3::new(7, 7, 8));
        assert_eq!(corner.slope_type(), 3);
    }
}
