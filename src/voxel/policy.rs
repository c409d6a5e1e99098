//! Face visibility and occlusion policy

use serde::{Deserialize, Serialize};

use super::voxel::{Voxel, VoxelType};
use super::face::FaceDirection;

/// Rules deciding which neighbors hide a face and which block light.
///
/// Chosen once per world and applied by every visibility, occlusion and
/// meshing pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityPolicy {
    /// Water hides the faces of its neighbors
    pub water_opaque: bool,
    /// A slope directly above hides the top face of the voxel below it
    pub slope_above_hides_top: bool,
    /// Faces pointing out of the grid are visible
    pub boundary_faces_visible: bool,
    /// Cells outside the grid count as ambient occlusion blockers
    pub boundary_occludes: bool,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            water_opaque: true,
            slope_above_hides_top: true,
            boundary_faces_visible: false,
            boundary_occludes: true,
        }
    }
}

impl VisibilityPolicy {
    /// The voxel cannot be seen through
    pub fn is_opaque(&self, voxel: Voxel) -> bool {
        match voxel.voxel_type() {
            VoxelType::Rock | VoxelType::Undefined => true,
            VoxelType::Water => self.water_opaque,
            VoxelType::Empty | VoxelType::Slope => false,
        }
    }

    /// Whether `neighbor`, seen through `face` of some voxel, hides that face
    pub fn hides_face(&self, neighbor: Voxel, face: FaceDirection) -> bool {
        if self.is_opaque(neighbor) {
            return true;
        }
        face == FaceDirection::PositiveZ && self.slope_above_hides_top && neighbor.is_slope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_opacity() {
        let policy = VisibilityPolicy::default();
        assert!(policy.is_opaque(Voxel::ROCK));
        assert!(policy.is_opaque(Voxel::UNDEFINED));
        assert!(policy.is_opaque(Voxel::WATER));
        assert!(!policy.is_opaque(Voxel::EMPTY));
        assert!(!policy.is_opaque(Voxel::SLOPE));
    }

    #[test]
    fn test_transparent_water() {
        let policy = VisibilityPolicy { water_opaque: false, ..Default::default() };
        assert!(!policy.is_opaque(Voxel::WATER));
        assert!(!policy.hides_face(Voxel::WATER, FaceDirection::PositiveX));
    }

    #[test]
    fn test_slope_hides_only_top() {
        let policy = VisibilityPolicy::default();
        assert!(policy.hides_face(Voxel::SLOPE, FaceDirection::PositiveZ));
        assert!(!policy.hides_face(Voxel::SLOPE, FaceDirection::PositiveX));
        assert!(!policy.hides_face(Voxel::SLOPE, FaceDirection::NegativeZ));

        let lenient = VisibilityPolicy { slope_above_hides_top: false, ..Default::default() };
        assert!(!lenient.hides_face(Voxel::SLOPE, FaceDirection::PositiveZ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let policy: VisibilityPolicy = serde_json::from_str(r#"{"water_opaque": false}"#).unwrap();
        assert!(!policy.water_opaque);
        assert!(policy.slope_above_hides_top);
        assert!(policy.boundary_occludes);
    }
}
