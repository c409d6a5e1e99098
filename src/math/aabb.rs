//! Axis-aligned bounding box

use crate::core::types::{IVec3, Vec3};

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box covering the voxel cells `origin .. origin + extent` (exclusive upper corner)
    pub fn from_cells(origin: IVec3, extent: IVec3) -> Self {
        let min = origin.as_vec3();
        Self {
            min,
            max: min + extent.as_vec3(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells() {
        let aabb = Aabb::from_cells(IVec3::new(16, 0, 32), IVec3::splat(16));
        assert_eq!(aabb.min, Vec3::new(16.0, 0.0, 32.0));
        assert_eq!(aabb.max, Vec3::new(32.0, 16.0, 48.0));
        assert_eq!(aabb, Aabb::new(aabb.min, aabb.max));
    }
}
