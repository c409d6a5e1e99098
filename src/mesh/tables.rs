//! Immutable geometry tables built once on first use

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::LazyLock;

use glam::{IVec3, Quat};

use crate::voxel::{FaceDirection, SLOPE_TYPE_COUNT};

/// Corner order for emitting a face as a 4-vertex strip
pub const QUAD_ORDER: [usize; 4] = [0, 1, 3, 2];

/// One cube face
#[derive(Clone, Copy, Debug)]
pub struct CubeFace {
    /// Corners in [-1, 1] space around the voxel centre
    pub corners: [IVec3; 4],
    /// Corners as {0, 1} offsets from the voxel origin
    pub vertices: [IVec3; 4],
    /// Per corner: diagonal cell, edge cell toward the previous corner,
    /// edge cell toward the next corner
    pub occlusion: [[IVec3; 3]; 4],
}

/// The authored face, looking at +Y
const SOUTH_FACE: [IVec3; 4] = [
    IVec3::new(-1, 1, 1),
    IVec3::new(1, 1, 1),
    IVec3::new(1, 1, -1),
    IVec3::new(-1, 1, -1),
];

fn face_rotation(face: FaceDirection) -> Quat {
    match face {
        FaceDirection::PositiveX => Quat::from_rotation_z(-FRAC_PI_2),
        FaceDirection::NegativeX => Quat::from_rotation_z(FRAC_PI_2),
        FaceDirection::PositiveY => Quat::IDENTITY,
        FaceDirection::NegativeY => Quat::from_rotation_z(PI),
        FaceDirection::PositiveZ => Quat::from_rotation_x(FRAC_PI_2),
        FaceDirection::NegativeZ => Quat::from_rotation_x(-FRAC_PI_2),
    }
}

/// Rotation about +Z for slope `dir` 0..3
fn slope_rotation(dir: usize) -> Quat {
    match dir {
        0 => Quat::from_rotation_z(-FRAC_PI_2),
        1 => Quat::from_rotation_z(FRAC_PI_2),
        2 => Quat::IDENTITY,
        _ => Quat::from_rotation_z(PI),
    }
}

fn rotate(q: Quat, v: IVec3) -> IVec3 {
    (q * v.as_vec3()).round().as_ivec3()
}

/// Map [-1, 1] corner space onto {0, 1} voxel offsets
fn to_unit(v: IVec3) -> IVec3 {
    (v + IVec3::ONE) / 2
}

fn build_cube_face(face: FaceDirection) -> CubeFace {
    let q = face_rotation(face);
    let corners = SOUTH_FACE.map(|c| rotate(q, c));
    let vertices = corners.map(to_unit);

    let mut occlusion = [[IVec3::ZERO; 3]; 4];
    for k in 0..4 {
        let corner = corners[k];
        let prev = corners[(k + 3) % 4];
        let next = corners[(k + 1) % 4];
        occlusion[k] = [corner, (corner + prev) / 2, (corner + next) / 2];
    }

    CubeFace { corners, vertices, occlusion }
}

/// Cube faces indexed by [`FaceDirection::index`]
pub static CUBE_FACES: LazyLock<[CubeFace; 6]> =
    LazyLock::new(|| FaceDirection::ALL.map(build_cube_face));

pub fn cube_face(face: FaceDirection) -> &'static CubeFace {
    &CUBE_FACES[face.index()]
}

/// One slope triangle corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopeCorner {
    /// {0, 1} offset from the voxel origin
    pub position: IVec3,
    pub tex_coord: [f32; 2],
}

/// Slope geometry for one (shape, rotation): the ramp plus its side walls,
/// each two triangles
#[derive(Clone, Copy, Debug)]
pub struct SlopeShape {
    pub top: [SlopeCorner; 6],
    pub sides: [SlopeCorner; 6],
}

struct SlopeSource {
    top: [[i32; 3]; 6],
    sides: [([i32; 3], [f32; 2]); 6],
}

const SIDES_RAMP: [([i32; 3], [f32; 2]); 6] = [
    ([-1, -1, 1], [0.0, 0.0]),
    ([-1, 1, -1], [1.0, 1.0]),
    ([-1, -1, -1], [0.0, 1.0]),
    ([1, -1, -1], [1.0, 1.0]),
    ([1, 1, -1], [0.0, 1.0]),
    ([1, -1, 1], [1.0, 0.0]),
];

const SIDES_TOP_CORNER: [([i32; 3], [f32; 2]); 6] = [
    ([-1, -1, 1], [0.0, 0.0]),
    ([-1, 1, -1], [1.0, 1.0]),
    ([-1, -1, -1], [0.0, 1.0]),
    ([1, 1, 1], [1.0, 0.0]),
    ([1, 1, -1], [1.0, 1.0]),
    ([-1, 1, -1], [0.0, 1.0]),
];

const SIDES_BOTTOM_CORNER: [([i32; 3], [f32; 2]); 6] = [
    ([1, -1, 1], [0.0, 0.0]),
    ([-1, -1, -1], [1.0, 1.0]),
    ([1, -1, -1], [0.0, 1.0]),
    ([1, -1, -1], [1.0, 1.0]),
    ([1, 1, -1], [0.0, 1.0]),
    ([1, -1, 1], [1.0, 0.0]),
];

/// Shapes authored facing south: straight ramp, flat-top corner, inner
/// corner, flat-bottom corner, outer corner
const SLOPE_SOURCES: [SlopeSource; SLOPE_TYPE_COUNT as usize] = [
    SlopeSource {
        top: [[-1, -1, 1], [1, -1, 1], [1, 1, -1], [1, 1, -1], [-1, 1, -1], [-1, -1, 1]],
        sides: SIDES_RAMP,
    },
    SlopeSource {
        top: [[-1, -1, 1], [1, -1, 1], [1, 1, 1], [-1, -1, 1], [1, 1, 1], [-1, 1, -1]],
        sides: SIDES_TOP_CORNER,
    },
    SlopeSource {
        top: [[-1, -1, 1], [1, -1, 1], [-1, 1, -1], [-1, 1, -1], [1, -1, 1], [1, 1, 1]],
        sides: SIDES_TOP_CORNER,
    },
    SlopeSource {
        top: [[-1, -1, -1], [1, -1, 1], [1, 1, -1], [-1, -1, -1], [1, 1, -1], [-1, 1, -1]],
        sides: SIDES_BOTTOM_CORNER,
    },
    SlopeSource {
        top: [[-1, -1, -1], [1, -1, 1], [-1, 1, -1], [-1, 1, -1], [1, -1, 1], [1, 1, -1]],
        sides: SIDES_BOTTOM_CORNER,
    },
];

/// Texture coordinate of a ramp corner from its rotated x/y quadrant
fn ramp_tex_coord(v: IVec3) -> [f32; 2] {
    match (v.x > 0, v.y > 0) {
        (false, false) => [0.0, 0.0],
        (true, false) => [1.0, 0.0],
        (true, true) => [1.0, 1.0],
        (false, true) => [0.0, 1.0],
    }
}

fn build_slope(source: &SlopeSource, dir: usize) -> SlopeShape {
    let q = slope_rotation(dir);
    let top = source.top.map(|v| {
        let r = rotate(q, IVec3::from_array(v));
        SlopeCorner { position: to_unit(r), tex_coord: ramp_tex_coord(r) }
    });
    let sides = source.sides.map(|(v, tex_coord)| {
        let r = rotate(q, IVec3::from_array(v));
        SlopeCorner { position: to_unit(r), tex_coord }
    });
    SlopeShape { top, sides }
}

/// Slope geometry indexed by `[slope_type][dir]`
pub static SLOPES: LazyLock<[[SlopeShape; 4]; SLOPE_TYPE_COUNT as usize]> = LazyLock::new(|| {
    SLOPE_SOURCES
        .each_ref()
        .map(|source| [0, 1, 2, 3].map(|dir| build_slope(source, dir)))
});

pub fn slope_shape(slope_type: u8, dir: u8) -> &'static SlopeShape {
    let t = (slope_type as usize).min(SLOPE_TYPE_COUNT as usize - 1);
    &SLOPES[t][(dir & 3) as usize]
}
