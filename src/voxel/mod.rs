//! Voxel data structures and operations

pub mod voxel;
pub mod face;
pub mod policy;
pub mod grid;
pub mod slope;
pub mod persist;
pub mod edit;
pub mod testmaps;

pub use voxel::{flags, Voxel, VoxelType, SLOPE_TYPE_COUNT};
pub use face::{FaceDirection, FaceSet};
pub use policy::VisibilityPolicy;
pub use grid::{ChangedVoxels, GridSize, VoxelGrid, VoxelObserver};
pub use edit::EditQueue;
