//! Mesh building blocks shared by the chunk mesher

pub mod tables;
pub mod texture;
pub mod vertex;
pub mod occlusion;
pub mod greedy;

pub use greedy::{GreedyMesher, GreedyQuad, VoxelFace};
pub use texture::{select_textures, FaceTexture, GameColor, Symbol, VoxelTextures};
pub use vertex::{SceneryVertex, SlopeVertex, TerrainVertex};
