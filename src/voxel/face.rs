//! Axis-aligned face directions and the 6-bit face mask

use glam::IVec3;

/// One of the 6 axis-aligned faces of a cube voxel.
///
/// The discriminant is the bit index in [`FaceSet`] and the row of every
/// per-face lookup table.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    PositiveX = 0,
    NegativeX = 1,
    PositiveY = 2,
    NegativeY = 3,
    PositiveZ = 4,
    NegativeZ = 5,
}

impl FaceDirection {
    /// All faces in table order
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PositiveX,
        FaceDirection::NegativeX,
        FaceDirection::PositiveY,
        FaceDirection::NegativeY,
        FaceDirection::PositiveZ,
        FaceDirection::NegativeZ,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Axis index (0 = x, 1 = y, 2 = z)
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    pub fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }

    /// Face on `axis` pointing to the positive or negative side
    pub fn from_axis(axis: usize, positive: bool) -> Self {
        Self::ALL[axis * 2 + usize::from(!positive)]
    }

    pub fn opposite(self) -> Self {
        Self::ALL[self.index() ^ 1]
    }

    /// Unit offset to the neighbor this face looks at
    pub fn offset(self) -> IVec3 {
        let mut v = IVec3::ZERO;
        v[self.axis()] = if self.is_positive() { 1 } else { -1 };
        v
    }

    pub fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// Set of faces packed into the low 6 bits of a byte
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const NONE: FaceSet = FaceSet(0);
    pub const ALL: FaceSet = FaceSet(0b11_1111);

    /// Build from raw bits; bits above the sixth are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11_1111)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, face: FaceDirection) -> bool {
        self.0 & face.bit() != 0
    }

    pub fn insert(&mut self, face: FaceDirection) {
        self.0 |= face.bit();
    }

    pub fn remove(&mut self, face: FaceDirection) {
        self.0 &= !face.bit();
    }

    pub fn with(mut self, face: FaceDirection) -> Self {
        self.insert(face);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = FaceDirection> {
        FaceDirection::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl From<FaceDirection> for FaceSet {
    fn from(face: FaceDirection) -> Self {
        Self(face.bit())
    }
}

impl std::ops::BitAnd for FaceSet {
    type Output = FaceSet;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::ops::BitOr for FaceSet {
    type Output = FaceSet;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for FaceSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::Not for FaceSet {
    type Output = FaceSet;
    fn not(self) -> Self {
        Self::from_bits(!self.0)
    }
}

impl std::fmt::Debug for FaceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(FaceDirection::PositiveX.offset(), IVec3::X);
        assert_eq!(FaceDirection::NegativeY.offset(), IVec3::NEG_Y);
        assert_eq!(FaceDirection::PositiveZ.offset(), IVec3::Z);
        for face in FaceDirection::ALL {
            assert_eq!(face.offset(), -face.opposite().offset());
        }
    }

    #[test]
    fn test_from_axis() {
        for face in FaceDirection::ALL {
            assert_eq!(FaceDirection::from_axis(face.axis(), face.is_positive()), face);
        }
    }

    #[test]
    fn test_face_set_ops() {
        let mut set = FaceSet::NONE;
        assert!(set.is_empty());
        set.insert(FaceDirection::PositiveZ);
        set.insert(FaceDirection::NegativeX);
        assert_eq!(set.len(), 2);
        assert!(set.contains(FaceDirection::PositiveZ));
        set.remove(FaceDirection::PositiveZ);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![FaceDirection::NegativeX]);
        assert_eq!(!FaceSet::NONE, FaceSet::ALL);
    }

    #[test]
    fn test_from_bits_masks_high_bits() {
        assert_eq!(FaceSet::from_bits(0xFF), FaceSet::ALL);
    }
}
