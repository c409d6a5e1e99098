//! Chunked meshing of a voxel grid and GPU buffer management

pub mod chunk;
pub mod config;
pub mod invalidator;
pub mod manager;
pub mod mesher;
pub mod view;

pub use chunk::{Chunk, CHUNK_SIZE};
pub use config::{ChunkConfig, MeshMode};
pub use invalidator::ChunkInvalidator;
pub use manager::{ChunkManager, FrameInput, FrameStats};
pub use mesher::ChunkMesh;
pub use view::{chunk_coord_of, chunk_face_mask, ViewBounds, ViewFootprint};
