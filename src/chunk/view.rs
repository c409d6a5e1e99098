//! View bounds, chunk-level face culling and per-chunk view footprints

use glam::{IVec3, Vec3};

use crate::voxel::{FaceDirection, FaceSet, GridSize};
use super::chunk::CHUNK_SIZE;

/// Inclusive voxel range currently shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewBounds {
    pub min: IVec3,
    pub max: IVec3,
}

impl ViewBounds {
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Whole grid in view
    pub fn full(size: GridSize) -> Self {
        Self::new(IVec3::ZERO, size.as_ivec3() - IVec3::ONE)
    }

    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Copy with the top level lowered to `z`, the usual way to peel off
    /// upper layers
    pub fn with_max_z(mut self, z: i32) -> Self {
        self.max.z = z;
        self
    }
}

/// Chunk coordinate containing a world position
pub fn chunk_coord_of(position: Vec3) -> IVec3 {
    (position / CHUNK_SIZE as f32).floor().as_ivec3()
}

/// Faces a chunk may show to a camera in chunk `camera_chunk`.
///
/// On each axis the side facing the camera is kept; when the camera is
/// level with the chunk on that axis both sides are kept.
pub fn chunk_face_mask(camera_chunk: IVec3, chunk: IVec3) -> FaceSet {
    let diff = camera_chunk - chunk;
    let mut mask = FaceSet::NONE;
    for axis in 0..3 {
        if diff[axis] >= 0 {
            mask.insert(FaceDirection::from_axis(axis, true));
        }
        if diff[axis] <= 0 {
            mask.insert(FaceDirection::from_axis(axis, false));
        }
    }
    mask
}

/// The part of a chunk meshing visits under a given view, plus the view
/// boundary sides that get capped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewFootprint {
    /// Inclusive world voxel range
    pub min: IVec3,
    pub max: IVec3,
    /// Cap sides: the footprint touches the view boundary on that side and
    /// the face mask allows it
    pub caps: FaceSet,
}

impl ViewFootprint {
    /// Intersection of the chunk at `offset` with the grid and the view, or
    /// None when they do not overlap
    pub fn compute(offset: IVec3, grid: GridSize, view: &ViewBounds, face_mask: FaceSet) -> Option<Self> {
        let chunk_max = offset + IVec3::splat(CHUNK_SIZE - 1);
        let min = offset.max(view.min).max(IVec3::ZERO);
        let max = chunk_max.min(view.max).min(grid.as_ivec3() - IVec3::ONE);
        if min.cmpgt(max).any() {
            return None;
        }

        let mut caps = FaceSet::NONE;
        let touches = [
            (FaceDirection::PositiveZ, max.z == view.max.z),
            (FaceDirection::PositiveX, max.x == view.max.x),
            (FaceDirection::NegativeX, min.x == view.min.x),
            (FaceDirection::PositiveY, max.y == view.max.y),
            (FaceDirection::NegativeY, min.y == view.min.y),
        ];
        for (face, touching) in touches {
            if touching && face_mask.contains(face) {
                caps.insert(face);
            }
        }

        Some(Self { min, max, caps })
    }

    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Caps that apply to the voxel at `p`
    pub fn caps_at(&self, p: IVec3) -> FaceSet {
        let mut caps = FaceSet::NONE;
        for face in self.caps.iter() {
            let on_boundary = if face.is_positive() {
                p[face.axis()] == self.max[face.axis()]
            } else {
                p[face.axis()] == self.min[face.axis()]
            };
            if on_boundary {
                caps.insert(face);
            }
        }
        caps
    }

    /// Voxel positions in meshing order: top level first, then rows of y, then x
    pub fn iter_top_down(&self) -> impl Iterator<Item = IVec3> + '_ {
        (self.min.z..=self.max.z).rev().flat_map(move |z| {
            (self.min.y..=self.max.y).flat_map(move |y| {
                (self.min.x..=self.max.x).map(move |x| IVec3::new(x, y, z))
            })
        })
    }
}
