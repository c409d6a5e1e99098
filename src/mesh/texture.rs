//! Face texture selection

use bytemuck::{Pod, Zeroable};

use crate::voxel::{flags, FaceDirection, Voxel, VoxelType};

/// Symbol ids understood by the terrain shader's symbol atlas
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Symbol {
    #[default]
    None = 0,
    Unknown,
    Water,
    Wall,
    Floor,
    Grass,
    ConiferousTree,
}

/// Palette indices
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameColor {
    #[default]
    None = 0,
    LightGray,
    MediumBlue,
    SeaGreen,
    LightGreen,
}

/// Two-layer face texture: a background color plus a tinted symbol.
/// Must match the vertex layout consumed by the terrain shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct FaceTexture {
    pub symbol0: u8,
    pub color0: u8,
    pub symbol1: u8,
    pub color1: u8,
}

impl FaceTexture {
    pub const fn new(color0: GameColor, symbol1: Symbol, color1: GameColor) -> Self {
        Self {
            symbol0: Symbol::None as u8,
            color0: color0 as u8,
            symbol1: symbol1 as u8,
            color1: color1 as u8,
        }
    }

    pub const UNKNOWN: FaceTexture = FaceTexture::new(GameColor::None, Symbol::Unknown, GameColor::LightGray);
    pub const WATER: FaceTexture = FaceTexture::new(GameColor::MediumBlue, Symbol::Water, GameColor::SeaGreen);
    pub const WALL: FaceTexture = FaceTexture::new(GameColor::LightGray, Symbol::Wall, GameColor::LightGray);
    pub const FLOOR: FaceTexture = FaceTexture::new(GameColor::LightGray, Symbol::Floor, GameColor::LightGray);
    pub const GRASS: FaceTexture = FaceTexture::new(GameColor::LightGreen, Symbol::Grass, GameColor::LightGreen);
}

/// Textures for one voxel: `base` for sides and bottom, `top` for +Z
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelTextures {
    pub base: FaceTexture,
    pub top: FaceTexture,
}

impl VoxelTextures {
    pub fn for_face(&self, face: FaceDirection) -> FaceTexture {
        if face == FaceDirection::PositiveZ { self.top } else { self.base }
    }
}

/// Pick the base and top textures of a non-Empty voxel
pub fn select_textures(voxel: Voxel) -> VoxelTextures {
    match voxel.voxel_type() {
        VoxelType::Undefined => VoxelTextures { base: FaceTexture::UNKNOWN, top: FaceTexture::UNKNOWN },
        VoxelType::Water => VoxelTextures { base: FaceTexture::WATER, top: FaceTexture::WATER },
        _ => {
            let top = if voxel.has_flag(flags::GRASS) {
                FaceTexture::GRASS
            } else if voxel.visible_faces().contains(FaceDirection::PositiveZ) {
                FaceTexture::FLOOR
            } else {
                FaceTexture::WALL
            };
            VoxelTextures { base: FaceTexture::WALL, top }
        }
    }
}
