//! Voxel data type

use bytemuck::{Pod, Zeroable};

use super::face::FaceSet;

/// Material class of a voxel. Exactly one per voxel.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VoxelType {
    /// Not known to the viewer (hidden or never revealed)
    #[default]
    Undefined = 0,
    Empty = 1,
    Rock = 2,
    Water = 3,
    Slope = 4,
}

impl VoxelType {
    /// Decode a raw type byte. Unknown values decode as `Undefined`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Empty,
            2 => Self::Rock,
            3 => Self::Water,
            4 => Self::Slope,
            _ => Self::Undefined,
        }
    }
}

/// Decorative overlay flags, independent of the voxel type
pub mod flags {
    pub const GRASS: u8 = 1 << 0;
    pub const TREE: u8 = 1 << 1;
    pub const TREE2: u8 = 1 << 2;
}

const TYPE_SHIFT: u32 = 0;
const FACES_SHIFT: u32 = 8;
const FLAGS_SHIFT: u32 = 16;
const DIR_SHIFT: u32 = 24;
const SLOPE_TYPE_SHIFT: u32 = 32;

const BYTE_MASK: u64 = 0xFF;

/// Number of canonical slope shapes
pub const SLOPE_TYPE_COUNT: u8 = 5;

/// Single voxel - exactly 8 bytes, bit-packed.
///
/// Layout of the raw value (one byte per field, low to high):
/// type, visible faces, flags, slope dir, slope type, then three zero bytes.
/// The little-endian bytes of `raw()` are the persisted record.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Voxel(u64);

impl Voxel {
    pub const UNDEFINED: Voxel = Voxel::of_type(VoxelType::Undefined);
    pub const EMPTY: Voxel = Voxel::of_type(VoxelType::Empty);
    pub const ROCK: Voxel = Voxel::of_type(VoxelType::Rock);
    pub const WATER: Voxel = Voxel::of_type(VoxelType::Water);
    pub const SLOPE: Voxel = Voxel::of_type(VoxelType::Slope);

    /// Voxel of the given type with every other field cleared
    pub const fn of_type(ty: VoxelType) -> Self {
        Self((ty as u64) << TYPE_SHIFT)
    }

    /// Slope voxel with an explicit shape and rotation
    pub fn slope(slope_type: u8, dir: u8) -> Self {
        Self::SLOPE.with_slope(slope_type, dir)
    }

    /// Reinterpret a persisted record
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw packed value
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    fn field(self, shift: u32) -> u8 {
        ((self.0 >> shift) & BYTE_MASK) as u8
    }

    #[inline]
    fn set_field(&mut self, shift: u32, value: u8) {
        self.0 = (self.0 & !(BYTE_MASK << shift)) | ((value as u64) << shift);
    }

    pub fn voxel_type(self) -> VoxelType {
        VoxelType::from_u8(self.field(TYPE_SHIFT))
    }

    pub fn set_voxel_type(&mut self, ty: VoxelType) {
        self.set_field(TYPE_SHIFT, ty as u8);
    }

    /// Computed face visibility; see `VoxelGrid::compute_visible_faces`
    pub fn visible_faces(self) -> FaceSet {
        FaceSet::from_bits(self.field(FACES_SHIFT))
    }

    pub fn set_visible_faces(&mut self, faces: FaceSet) {
        self.set_field(FACES_SHIFT, faces.bits());
    }

    pub fn with_visible_faces(mut self, faces: FaceSet) -> Self {
        self.set_visible_faces(faces);
        self
    }

    pub fn flags(self) -> u8 {
        self.field(FLAGS_SHIFT)
    }

    pub fn set_flags(&mut self, flags: u8) {
        self.set_field(FLAGS_SHIFT, flags);
    }

    /// Copy with the given flag bits added
    pub fn with_flags(mut self, flags: u8) -> Self {
        let merged = self.flags() | flags;
        self.set_flags(merged);
        self
    }

    pub fn has_flag(self, flag: u8) -> bool {
        self.flags() & flag != 0
    }

    /// Slope rotation, 0-3. Meaningful only for slopes.
    pub fn dir(self) -> u8 {
        self.field(DIR_SHIFT) & 0x3
    }

    /// Slope shape index, 0-4. Meaningful only for slopes.
    pub fn slope_type(self) -> u8 {
        self.field(SLOPE_TYPE_SHIFT).min(SLOPE_TYPE_COUNT - 1)
    }

    pub fn set_slope(&mut self, slope_type: u8, dir: u8) {
        self.set_field(SLOPE_TYPE_SHIFT, slope_type.min(SLOPE_TYPE_COUNT - 1));
        self.set_field(DIR_SHIFT, dir & 0x3);
    }

    pub fn with_slope(mut self, slope_type: u8, dir: u8) -> Self {
        self.set_slope(slope_type, dir);
        self
    }

    pub fn is_undefined(self) -> bool {
        self.voxel_type() == VoxelType::Undefined
    }

    /// Check if voxel is empty (air). Flags do not matter.
    pub fn is_empty(self) -> bool {
        self.voxel_type() == VoxelType::Empty
    }

    pub fn is_slope(self) -> bool {
        self.voxel_type() == VoxelType::Slope
    }
}

impl std::fmt::Debug for Voxel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Voxel")
            .field("type", &self.voxel_type())
            .field("visible_faces", &self.visible_faces())
            .field("flags", &self.flags())
            .field("dir", &self.dir())
            .field("slope_type", &self.slope_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::face::FaceDirection;

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<Voxel>(), 8);
    }

    #[test]
    fn test_default_is_undefined() {
        assert!(Voxel::default().is_undefined());
        assert_eq!(Voxel::default().raw(), 0);
    }

    #[test]
    fn test_byte_layout() {
        let voxel = Voxel::slope(3, 2)
            .with_flags(flags::GRASS | flags::TREE)
            .with_visible_faces(FaceSet::from_bits(0b10_0001));

        let bytes = voxel.raw().to_le_bytes();
        assert_eq!(bytes, [4, 0b10_0001, 0b011, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_fields_are_independent() {
        let mut voxel = Voxel::ROCK;
        voxel.set_visible_faces(FaceSet::ALL);
        voxel.set_flags(flags::TREE2);
        voxel.set_voxel_type(VoxelType::Water);

        assert_eq!(voxel.voxel_type(), VoxelType::Water);
        assert_eq!(voxel.visible_faces(), FaceSet::ALL);
        assert!(voxel.has_flag(flags::TREE2));
        assert!(!voxel.has_flag(flags::GRASS));
        assert!(voxel.visible_faces().contains(FaceDirection::NegativeZ));
    }

    #[test]
    fn test_unknown_type_decodes_undefined() {
        assert_eq!(Voxel::from_raw(0x77).voxel_type(), VoxelType::Undefined);
    }

    #[test]
    fn test_slope_fields_clamped() {
        let voxel = Voxel::slope(9, 7);
        assert_eq!(voxel.slope_type(), 4);
        assert_eq!(voxel.dir(), 3);
    }

    #[test]
    fn test_empty_ignores_flags() {
        assert!(Voxel::EMPTY.with_flags(flags::TREE).is_empty());
    }
}
