//! Deferred voxel writes drained between chunk update passes

use glam::IVec3;

use super::grid::{VoxelGrid, VoxelObserver};
use super::voxel::Voxel;

/// FIFO of pending voxel writes.
///
/// Edits made while a chunk update may be reading the grid are queued here
/// and applied on the update thread before the next pass.
#[derive(Debug, Default, Clone)]
pub struct EditQueue {
    pending: Vec<(IVec3, Voxel)>,
}

impl EditQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write of `voxel` at `p`
    pub fn push(&mut self, p: IVec3, voxel: Voxel) {
        self.pending.push((p, voxel));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending edit in submission order through
    /// [`VoxelGrid::set_voxel_with`]. Returns the number of voxels whose
    /// stored state was updated.
    pub fn apply<O>(&mut self, grid: &mut VoxelGrid, observer: &mut O) -> usize
    where
        O: VoxelObserver + ?Sized,
    {
        let mut updated = 0;
        for (p, voxel) in self.pending.drain(..) {
            updated += grid.set_voxel_with(p, voxel, observer).len();
        }
        if updated > 0 {
            log::debug!("Applied queued edits, {} voxels updated", updated);
        }
        updated
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::GridSize;

    #[test]
    fn test_apply_in_order() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(8), Voxel::ROCK).unwrap();
        let mut queue = EditQueue::new();
        let p = IVec3::splat(4);
        queue.push(p, Voxel::EMPTY);
        queue.push(p, Voxel::WATER);
        assert_eq!(queue.len(), 2);

        let mut seen = Vec::new();
        let updated = queue.apply(&mut grid, &mut |c: IVec3| seen.push(c));

        assert!(queue.is_empty());
        assert_eq!(updated, 14);
        assert_eq!(seen.len(), 14);
        assert_eq!(grid.voxel_at(p).voxel_type(), crate::voxel::VoxelType::Water);
    }

    #[test]
    fn test_out_of_bounds_edits_are_dropped() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(2), Voxel::ROCK).unwrap();
        let mut queue = EditQueue::new();
        queue.push(IVec3::new(5, 5, 5), Voxel::EMPTY);
        assert_eq!(queue.apply(&mut grid, &mut |_: IVec3| {}), 0);
    }
}
