//! Tracks which chunks need a remesh after voxel edits

use std::collections::HashSet;

use glam::IVec3;

use crate::voxel::VoxelObserver;
use super::chunk::CHUNK_SIZE;

/// Collects dirty chunk coordinates between frames.
///
/// Hand it to [`VoxelGrid::set_voxel_with`](crate::voxel::VoxelGrid::set_voxel_with)
/// as the observer, then feed it to
/// [`ChunkManager::apply_invalidator`](super::ChunkManager::apply_invalidator).
/// Coordinates outside the chunk grid are kept here and ignored by the manager.
#[derive(Debug, Default)]
pub struct ChunkInvalidator {
    dirty_chunks: HashSet<IVec3>,
}

impl ChunkInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every chunk overlapping the inclusive voxel range `min..=max`
    pub fn mark_region(&mut self, min: IVec3, max: IVec3) {
        let lo = min.div_euclid(IVec3::splat(CHUNK_SIZE));
        let hi = max.div_euclid(IVec3::splat(CHUNK_SIZE));
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    self.dirty_chunks.insert(IVec3::new(x, y, z));
                }
            }
        }
    }

    /// Mark the chunks whose meshes can read voxel `p`: those holding it or
    /// any of its 26 neighbours
    pub fn mark_voxel(&mut self, p: IVec3) {
        self.mark_region(p - IVec3::ONE, p + IVec3::ONE);
    }

    /// Take all dirty chunks and clear the dirty list
    pub fn take_dirty_chunks(&mut self) -> Vec<IVec3> {
        self.dirty_chunks.drain().collect()
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty_chunks.is_empty()
    }
}

impl VoxelObserver for ChunkInvalidator {
    fn voxel_changed(&mut self, p: IVec3) {
        self.mark_voxel(p);
    }
}
