//! Slope shape selection from the surrounding rock on the same level

use glam::IVec3;

use super::grid::VoxelGrid;
use super::voxel::VoxelType;

/// Planar neighbor directions. North is −Y, East is +X.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Planar {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

impl Planar {
    pub const ALL: [Planar; 8] = [
        Planar::North,
        Planar::East,
        Planar::South,
        Planar::West,
        Planar::NorthEast,
        Planar::SouthEast,
        Planar::SouthWest,
        Planar::NorthWest,
    ];

    pub fn offset(self) -> IVec3 {
        match self {
            Planar::North => IVec3::new(0, -1, 0),
            Planar::East => IVec3::new(1, 0, 0),
            Planar::South => IVec3::new(0, 1, 0),
            Planar::West => IVec3::new(-1, 0, 0),
            Planar::NorthEast => IVec3::new(1, -1, 0),
            Planar::SouthEast => IVec3::new(1, 1, 0),
            Planar::SouthWest => IVec3::new(-1, 1, 0),
            Planar::NorthWest => IVec3::new(-1, -1, 0),
        }
    }

    pub fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Bit set over [`Planar`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlanarSet(u8);

impl PlanarSet {
    pub const NONE: PlanarSet = PlanarSet(0);
    const CARDINAL_MASK: u8 = 0x0F;

    pub fn of(dirs: &[Planar]) -> Self {
        Self(dirs.iter().fold(0, |bits, d| bits | d.bit()))
    }

    pub fn contains(self, dir: Planar) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn insert(&mut self, dir: Planar) {
        self.0 |= dir.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn cardinal(self) -> Self {
        Self(self.0 & Self::CARDINAL_MASK)
    }
}

/// Rock voxels among the 8 planar neighbors of `p` that lie inside the grid
pub fn rock_neighbors(grid: &VoxelGrid, p: IVec3) -> PlanarSet {
    let mut set = PlanarSet::NONE;
    for dir in Planar::ALL {
        if grid
            .get(p + dir.offset())
            .is_some_and(|v| v.voxel_type() == VoxelType::Rock)
        {
            set.insert(dir);
        }
    }
    set
}

/// `(slope_type, dir)` for a slope surrounded by `rock`.
///
/// Cardinal patterns pick a straight ramp (shape 0) or an inner corner
/// (shape 1). Without cardinal rock the first diagonal in NE, SE, SW, NW
/// order picks a flat-bottom corner (shape 3). Ambiguous layouts fall into
/// the nearest cardinal case instead of failing. Returns None when no
/// neighbor is rock.
pub fn shape_for(rock: PlanarSet) -> Option<(u8, u8)> {
    use Planar::*;

    if rock.is_empty() {
        return None;
    }

    let cardinal = rock.cardinal();
    let is = |dirs: &[Planar]| cardinal == PlanarSet::of(dirs);

    if is(&[East]) || is(&[North, East, South]) {
        return Some((0, 1));
    }
    if is(&[South]) || is(&[East, South, West]) {
        return Some((0, 3));
    }
    if is(&[West]) || is(&[West, East]) || is(&[South, West, North]) {
        return Some((0, 0));
    }
    if is(&[North]) || is(&[North, South]) || is(&[West, North, East])
        || is(&[North, East, South, West])
    {
        return Some((0, 2));
    }
    if is(&[East, North]) {
        return Some((1, 2));
    }
    if is(&[East, South]) {
        return Some((1, 1));
    }
    if is(&[West, South]) {
        return Some((1, 3));
    }
    if is(&[West, North]) {
        return Some((1, 0));
    }

    [(NorthEast, 2), (SouthEast, 1), (SouthWest, 3), (NorthWest, 0)]
        .into_iter()
        .find(|(dir, _)| rock.contains(*dir))
        .map(|(_, d)| (3, d))
}
