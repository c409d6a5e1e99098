//! Voxmesh - chunked voxel terrain meshing

pub mod core;
pub mod math;
pub mod voxel;
pub mod mesh;
pub mod chunk;
pub mod render;
