//! Greedy merging of coplanar identical voxel faces into quads
//!
//! For each face direction a plane sweeps the volume. Every plane position
//! builds a 2D mask of the faces lying in it, then grows maximal rectangles
//! of identical cells row by row.

use glam::IVec3;

use crate::voxel::{FaceDirection, FaceSet, VoxelType};
use super::tables::{cube_face, QUAD_ORDER};

/// Attributes of one voxel face that decide whether two faces may merge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelFace {
    /// Culled or see-through: never drawn
    pub transparent: bool,
    pub voxel_type: VoxelType,
    pub flags: u8,
    /// Corner occlusion in cube face table order
    pub occlusion: [i32; 4],
}

impl VoxelFace {
    pub fn transparent(voxel_type: VoxelType) -> Self {
        Self { transparent: true, voxel_type, flags: 0, occlusion: [0; 4] }
    }
}

/// Merged rectangle of identical faces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GreedyQuad {
    pub face: FaceDirection,
    /// Coordinate of the face plane along the face axis
    pub plane: i32,
    /// Lower corner along the two in-plane axes, `(face.axis() + 1) % 3`
    /// then `(face.axis() + 2) % 3`
    pub origin: [i32; 2],
    pub width: i32,
    pub height: i32,
    pub attributes: VoxelFace,
}

impl GreedyQuad {
    fn axes(&self) -> (usize, usize, usize) {
        let d = self.face.axis();
        (d, (d + 1) % 3, (d + 2) % 3)
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Quad corners in strip order, each with its occlusion value.
    ///
    /// A 1x1 quad yields the same positions and order as a single cube face.
    pub fn corners(&self) -> [(IVec3, i32); 4] {
        let (d, u, v) = self.axes();
        let table = cube_face(self.face);
        QUAD_ORDER.map(|k| {
            let unit = table.vertices[k];
            let mut pos = IVec3::ZERO;
            pos[d] = self.plane;
            pos[u] = self.origin[0] + unit[u] * self.width;
            pos[v] = self.origin[1] + unit[v] * self.height;
            (pos, self.attributes.occlusion[k])
        })
    }

    /// Volume cells whose face this quad covers
    pub fn cells(&self) -> impl Iterator<Item = IVec3> + '_ {
        let (d, u, v) = self.axes();
        let layer = if self.face.is_positive() { self.plane - 1 } else { self.plane };
        (0..self.height).flat_map(move |j| {
            (0..self.width).map(move |i| {
                let mut cell = IVec3::ZERO;
                cell[d] = layer;
                cell[u] = self.origin[0] + i;
                cell[v] = self.origin[1] + j;
                cell
            })
        })
    }
}

/// Reusable mask buffer for meshing cubic volumes of a fixed extent
#[derive(Clone, Debug)]
pub struct GreedyMesher {
    extent: i32,
    mask: Vec<Option<VoxelFace>>,
}

impl GreedyMesher {
    pub fn new(extent: i32) -> Self {
        let side = extent.max(0) as usize;
        Self { extent, mask: vec![None; side * side] }
    }

    pub fn extent(&self) -> i32 {
        self.extent
    }

    /// Append merged quads for every direction in `sides` to `quads`.
    ///
    /// `face_at(cell, face)` returns the attributes of `face` of the local
    /// cell, or None when the cell takes no part in meshing.
    pub fn mesh<F>(&mut self, sides: FaceSet, mut face_at: F, quads: &mut Vec<GreedyQuad>)
    where
        F: FnMut(IVec3, FaceDirection) -> Option<VoxelFace>,
    {
        let n = self.extent;
        if n <= 0 {
            return;
        }

        for back_face in [true, false] {
            for d in 0..3 {
                let u = (d + 1) % 3;
                let v = (d + 2) % 3;
                let face = FaceDirection::from_axis(d, !back_face);
                if !sides.contains(face) {
                    continue;
                }

                let mut q = IVec3::ZERO;
                q[d] = 1;
                let mut x = IVec3::ZERO;

                x[d] = -1;
                while x[d] < n {
                    let mut cell = 0;
                    for xv in 0..n {
                        x[v] = xv;
                        for xu in 0..n {
                            x[u] = xu;
                            // A face's own attributes already say whether the
                            // cell across the plane hides it
                            self.mask[cell] = if back_face {
                                if x[d] < n - 1 { face_at(x + q, face) } else { None }
                            } else if x[d] >= 0 {
                                face_at(x, face)
                            } else {
                                None
                            };
                            cell += 1;
                        }
                    }

                    x[d] += 1;
                    self.emit_plane(face, x[d], quads);
                }
            }
        }
    }

    /// Grow rectangles over the current mask and clear consumed cells
    fn emit_plane(&mut self, face: FaceDirection, plane: i32, quads: &mut Vec<GreedyQuad>) {
        let n = self.extent as usize;
        let mut index = 0;

        for j in 0..n {
            let mut i = 0;
            while i < n {
                let Some(current) = self.mask[index] else {
                    i += 1;
                    index += 1;
                    continue;
                };

                let mut width = 1;
                while i + width < n && self.mask[index + width] == Some(current) {
                    width += 1;
                }

                let mut height = 1;
                'grow: while j + height < n {
                    for k in 0..width {
                        if self.mask[index + k + height * n] != Some(current) {
                            break 'grow;
                        }
                    }
                    height += 1;
                }

                if !current.transparent {
                    quads.push(GreedyQuad {
                        face,
                        plane,
                        origin: [i as i32, j as i32],
                        width: width as i32,
                        height: height as i32,
                        attributes: current,
                    });
                }

                for l in 0..height {
                    for k in 0..width {
                        self.mask[index + k + l * n] = None;
                    }
                }

                i += width;
                index += width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const N: i32 = 4;

    fn solid(_: IVec3) -> bool {
        true
    }

    /// Faces of a dense solid: visible only where the neighbor leaves the
    /// volume or is not solid
    fn faces_of<'a>(is_solid: &'a dyn Fn(IVec3) -> bool) -> impl FnMut(IVec3, FaceDirection) -> Option<VoxelFace> + 'a {
        move |p, face| {
            if !is_solid(p) {
                return Some(VoxelFace::transparent(VoxelType::Empty));
            }
            let n = p + face.offset();
            let inside = n.cmpge(IVec3::ZERO).all() && n.cmplt(IVec3::splat(N)).all();
            let visible = !inside || !is_solid(n);
            Some(VoxelFace {
                transparent: !visible,
                voxel_type: VoxelType::Rock,
                flags: 0,
                occlusion: [0; 4],
            })
        }
    }

    #[test]
    fn test_solid_block_merges_to_six_quads() {
        let mut mesher = GreedyMesher::new(N);
        let mut quads = Vec::new();
        mesher.mesh(FaceSet::ALL, faces_of(&solid), &mut quads);

        assert_eq!(quads.len(), 6);
        for quad in &quads {
            assert_eq!(quad.area(), N * N);
            let expected = if quad.face.is_positive() { N } else { 0 };
            assert_eq!(quad.plane, expected);
        }
    }

    #[test]
    fn test_side_mask() {
        let mut mesher = GreedyMesher::new(N);
        let mut quads = Vec::new();
        let sides = FaceSet::from(FaceDirection::PositiveZ).with(FaceDirection::NegativeX);
        mesher.mesh(sides, faces_of(&solid), &mut quads);

        assert_eq!(quads.len(), 2);
        assert!(quads.iter().all(|q| sides.contains(q.face)));
    }

    #[test]
    fn test_occlusion_prevents_merge() {
        let mut mesher = GreedyMesher::new(N);
        let mut quads = Vec::new();
        let mut base = faces_of(&solid);
        mesher.mesh(
            FaceSet::from(FaceDirection::PositiveZ),
            |p, face| {
                let mut f = base(p, face)?;
                if p == IVec3::new(0, 0, N - 1) {
                    f.occlusion = [1, 0, 0, 0];
                }
                Some(f)
            },
            &mut quads,
        );

        assert!(quads.len() > 1);
        assert_eq!(quads.iter().map(|q| q.area()).sum::<i32>(), N * N);
        assert!(quads.iter().any(|q| q.area() == 1 && q.attributes.occlusion[0] == 1));
    }

    #[test]
    fn test_coverage_matches_per_face() {
        // Staircase with a hole
        let shape = |p: IVec3| p.z <= p.x && p != IVec3::new(2, 1, 1);
        let mut mesher = GreedyMesher::new(N);
        let mut quads = Vec::new();
        mesher.mesh(FaceSet::ALL, faces_of(&shape), &mut quads);

        for face in FaceDirection::ALL {
            let mut naive = HashSet::new();
            let mut lookup = faces_of(&shape);
            for z in 0..N {
                for y in 0..N {
                    for x in 0..N {
                        let p = IVec3::new(x, y, z);
                        if lookup(p, face).is_some_and(|f| !f.transparent) {
                            naive.insert(p);
                        }
                    }
                }
            }

            let mut merged = HashSet::new();
            for quad in quads.iter().filter(|q| q.face == face) {
                for cell in quad.cells() {
                    assert!(merged.insert(cell), "overlapping quads at {cell}");
                }
            }
            assert_eq!(merged, naive, "{face:?}");
        }
    }

    #[test]
    fn test_stacked_visible_faces_both_emitted() {
        // Two see-through cells in a column: every face is visible, and the
        // +Z faces of both cells carry identical attributes
        let column = |p: IVec3| p.x == 1 && p.y == 1 && (p.z == 1 || p.z == 2);
        let mut mesher = GreedyMesher::new(N);
        let mut quads = Vec::new();
        mesher.mesh(
            FaceSet::ALL,
            |p, _| {
                let visible = column(p);
                Some(VoxelFace {
                    transparent: !visible,
                    voxel_type: if visible { VoxelType::Water } else { VoxelType::Empty },
                    flags: 0,
                    occlusion: [0; 4],
                })
            },
            &mut quads,
        );

        let covered: usize = quads.iter().map(|q| q.area() as usize).sum();
        assert_eq!(covered, 12);
        let tops: Vec<i32> = quads.iter().filter(|q| q.face == FaceDirection::PositiveZ).map(|q| q.plane).collect();
        assert_eq!(tops.len(), 2);
        assert!(tops.contains(&2) && tops.contains(&3));
    }

    #[test]
    fn test_unit_quad_matches_cube_face() {
        let quad = GreedyQuad {
            face: FaceDirection::NegativeY,
            plane: 2,
            origin: [3, 1],
            width: 1,
            height: 1,
            attributes: VoxelFace::transparent(VoxelType::Rock),
        };
        let voxel = IVec3::new(1, 2, 3);
        let table = cube_face(FaceDirection::NegativeY);
        let expected: Vec<IVec3> = QUAD_ORDER.iter().map(|&k| voxel + table.vertices[k]).collect();
        let corners: Vec<IVec3> = quad.corners().iter().map(|c| c.0).collect();
        assert_eq!(corners, expected);
        assert_eq!(quad.cells().collect::<Vec<_>>(), vec![voxel]);
    }
}
