//! GPU vertex formats for the three mesh streams

use bytemuck::{Pod, Zeroable};
use glam::IVec3;

use super::texture::{FaceTexture, GameColor, Symbol};

/// Cube face corner, chunk-local integer position.
///
/// `occlusion` is 0-3 from blocking neighbors, or
/// [`TerrainVertex::HIDDEN_OCCLUSION`] for view-cap faces.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [i32; 3],
    pub occlusion: i32,
    pub texture: FaceTexture,
}

impl TerrainVertex {
    pub const HIDDEN_OCCLUSION: i32 = 4;

    pub fn new(position: IVec3, occlusion: i32, texture: FaceTexture) -> Self {
        Self { position: position.to_array(), occlusion, texture }
    }

    pub fn position(&self) -> IVec3 {
        IVec3::from_array(self.position)
    }
}

/// Slope triangle corner
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SlopeVertex {
    pub position: [i32; 3],
    pub tex_coord: [f32; 2],
    pub texture: FaceTexture,
}

impl SlopeVertex {
    pub fn new(position: IVec3, tex_coord: [f32; 2], texture: FaceTexture) -> Self {
        Self { position: position.to_array(), tex_coord, texture }
    }
}

/// Billboard point for decorations
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SceneryVertex {
    pub position: [i32; 3],
    pub color: u8,
    pub symbol: u8,
    /// Padding for alignment
    pub _pad: [u8; 2],
}

impl SceneryVertex {
    pub fn new(position: IVec3, color: GameColor, symbol: Symbol) -> Self {
        Self {
            position: position.to_array(),
            color: color as u8,
            symbol: symbol as u8,
            _pad: [0; 2],
        }
    }

    /// Tree marker at a chunk-local voxel position
    pub fn tree(position: IVec3) -> Self {
        Self::new(position, GameColor::LightGreen, Symbol::ConiferousTree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_sizes() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 20);
        assert_eq!(std::mem::size_of::<SlopeVertex>(), 24);
        assert_eq!(std::mem::size_of::<SceneryVertex>(), 16);
    }

    #[test]
    fn test_cast_to_bytes() {
        let verts = [TerrainVertex::new(IVec3::new(1, 2, 3), 2, FaceTexture::WALL)];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[0..4], &1i32.to_ne_bytes());
    }
}
