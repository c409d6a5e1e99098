//! Chunk vertex generation: one quad per visible cube face, or greedy quads

use glam::IVec3;

use crate::mesh::greedy::{GreedyMesher, GreedyQuad, VoxelFace};
use crate::mesh::occlusion::{corner_occlusion, face_occlusion};
use crate::mesh::tables::{cube_face, slope_shape, QUAD_ORDER};
use crate::mesh::{select_textures, SceneryVertex, SlopeVertex, TerrainVertex, VoxelTextures};
use crate::voxel::{flags, FaceDirection, FaceSet, Voxel, VoxelGrid};
use super::view::ViewFootprint;

/// Vertex streams of one chunk, positions relative to the chunk offset
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub terrain: Vec<TerrainVertex>,
    pub slopes: Vec<SlopeVertex>,
    pub scenery: Vec<SceneryVertex>,
}

impl ChunkMesh {
    pub fn clear(&mut self) {
        self.terrain.clear();
        self.slopes.clear();
        self.scenery.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.terrain.len() + self.slopes.len() + self.scenery.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

/// What a chunk remesh reads besides the grid
#[derive(Clone, Copy, Debug)]
pub struct MeshInput<'a> {
    pub grid: &'a VoxelGrid,
    /// World position of the chunk's first voxel
    pub offset: IVec3,
    pub footprint: &'a ViewFootprint,
    pub face_mask: FaceSet,
}

/// Emit one quad per visible cube face, plus slopes and scenery
pub fn mesh_per_voxel(input: &MeshInput<'_>, out: &mut ChunkMesh) {
    out.clear();
    for p in input.footprint.iter_top_down() {
        let voxel = input.grid.voxel_at(p);
        let local = p - input.offset;

        if voxel.has_flag(flags::TREE) {
            out.scenery.push(SceneryVertex::tree(local));
        }
        if voxel.is_empty() {
            continue;
        }

        let textures = select_textures(voxel);
        if voxel.is_slope() {
            emit_slope(voxel, local, &textures, &mut out.slopes);
            continue;
        }
        emit_cube(input, p, voxel, textures, &mut out.terrain);
    }
}

/// Emit greedy-merged terrain quads. Slopes and scenery are emitted as in
/// [`mesh_per_voxel`]; view caps are not produced.
pub fn mesh_greedy(
    input: &MeshInput<'_>,
    mesher: &mut GreedyMesher,
    quads: &mut Vec<GreedyQuad>,
    out: &mut ChunkMesh,
) {
    out.clear();
    for p in input.footprint.iter_top_down() {
        let voxel = input.grid.voxel_at(p);
        let local = p - input.offset;

        if voxel.has_flag(flags::TREE) {
            out.scenery.push(SceneryVertex::tree(local));
        }
        if voxel.is_slope() {
            emit_slope(voxel, local, &select_textures(voxel), &mut out.slopes);
        }
    }

    quads.clear();
    mesher.mesh(input.face_mask, |local, face| greedy_face(input, local, face), quads);

    for quad in quads.iter() {
        let Some(first) = quad.cells().next() else { continue };
        let texture = select_textures(input.grid.voxel_at(input.offset + first)).for_face(quad.face);
        for (position, occlusion) in quad.corners() {
            out.terrain.push(TerrainVertex::new(position, occlusion, texture));
        }
    }
}

/// Face attributes for the greedy pass. Cells outside the footprint take
/// no part; slopes, air and culled faces are transparent.
fn greedy_face(input: &MeshInput<'_>, local: IVec3, face: FaceDirection) -> Option<VoxelFace> {
    let p = input.offset + local;
    if !input.footprint.contains(p) {
        return None;
    }

    let voxel = input.grid.voxel_at(p);
    let drawn = !voxel.is_empty()
        && !voxel.is_slope()
        && voxel.visible_faces().contains(face)
        && !(face == FaceDirection::NegativeZ && p.z == 0);
    if !drawn {
        return Some(VoxelFace::transparent(voxel.voxel_type()));
    }

    Some(VoxelFace {
        transparent: false,
        voxel_type: voxel.voxel_type(),
        flags: voxel.flags(),
        occlusion: face_occlusion(input.grid, p, face),
    })
}

fn emit_slope(voxel: Voxel, local: IVec3, textures: &VoxelTextures, out: &mut Vec<SlopeVertex>) {
    let shape = slope_shape(voxel.slope_type(), voxel.dir());
    for corner in &shape.top {
        out.push(SlopeVertex::new(local + corner.position, corner.tex_coord, textures.top));
    }
    for corner in &shape.sides {
        out.push(SlopeVertex::new(local + corner.position, corner.tex_coord, textures.base));
    }
}

fn emit_cube(input: &MeshInput<'_>, p: IVec3, voxel: Voxel, mut textures: VoxelTextures, out: &mut Vec<TerrainVertex>) {
    let mut sides = input.face_mask & voxel.visible_faces();

    // View caps close the cut surface; faces that were not really visible
    // are drawn fully shadowed
    let caps = input.footprint.caps_at(p);
    let hidden = caps & !sides;
    sides |= caps;
    if caps.contains(FaceDirection::PositiveZ) {
        textures.top = textures.base;
    }

    // Nothing is ever drawn below the world floor
    if p.z == 0 {
        sides.remove(FaceDirection::NegativeZ);
    }
    if sides.is_empty() {
        return;
    }

    let local = p - input.offset;
    for face in sides.iter() {
        let table = cube_face(face);
        let texture = textures.for_face(face);
        for k in QUAD_ORDER {
            let occlusion = if hidden.contains(face) {
                TerrainVertex::HIDDEN_OCCLUSION
            } else {
                corner_occlusion(input.grid, p, face, k)
            };
            out.push(TerrainVertex::new(local + table.vertices[k], occlusion, texture));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use crate::chunk::chunk::CHUNK_SIZE;
    use crate::chunk::view::ViewBounds;
    use crate::mesh::FaceTexture;
    use crate::voxel::{testmaps, GridSize};

    fn footprint(grid: &VoxelGrid, offset: IVec3, view: &ViewBounds, mask: FaceSet) -> ViewFootprint {
        ViewFootprint::compute(offset, grid.size(), view, mask).unwrap()
    }

    fn mesh(grid: &VoxelGrid, offset: IVec3, view: &ViewBounds, mask: FaceSet) -> ChunkMesh {
        let fp = footprint(grid, offset, view, mask);
        let input = MeshInput { grid, offset, footprint: &fp, face_mask: mask };
        let mut out = ChunkMesh::default();
        mesh_per_voxel(&input, &mut out);
        out
    }

    /// A view larger than the grid never caps anything
    fn uncapped(grid: &VoxelGrid) -> ViewBounds {
        ViewBounds::new(IVec3::splat(-1), grid.size().as_ivec3())
    }

    #[test]
    fn test_single_block() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY).unwrap();
        grid.set_voxel(IVec3::new(3, 4, 5), Voxel::ROCK);
        let out = mesh(&grid, IVec3::ZERO, &uncapped(&grid), FaceSet::ALL);

        assert_eq!(out.terrain.len(), 6 * 4);
        assert!(out.terrain.iter().all(|v| (0..=3).contains(&v.occlusion)));
        // Top face carries the floor texture, the rest the wall
        let floor = out.terrain.iter().filter(|v| v.texture == FaceTexture::FLOOR).count();
        assert_eq!(floor, 4);
    }

    #[test]
    fn test_face_mask_culls() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY).unwrap();
        grid.set_voxel(IVec3::new(3, 4, 5), Voxel::ROCK);
        let mask = FaceSet::from(FaceDirection::PositiveZ).with(FaceDirection::NegativeY);
        let out = mesh(&grid, IVec3::ZERO, &uncapped(&grid), mask);
        assert_eq!(out.terrain.len(), 2 * 4);
    }

    #[test]
    fn test_no_floor_at_world_bottom() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY).unwrap();
        grid.set_voxel(IVec3::new(2, 2, 0), Voxel::ROCK);
        let policy = crate::voxel::VisibilityPolicy { boundary_faces_visible: true, ..Default::default() };
        grid.set_policy(policy);
        grid.compute_all_visible_faces();
        assert!(grid.voxel_at(IVec3::new(2, 2, 0)).visible_faces().contains(FaceDirection::NegativeZ));

        let out = mesh(&grid, IVec3::ZERO, &uncapped(&grid), FaceSet::ALL);
        assert_eq!(out.terrain.len(), 5 * 4);
        // Every bottom-layer vertex belongs to a side face, never a -Z face at z = 0
        let bottom = cube_face(FaceDirection::NegativeZ).vertices;
        for quad in out.terrain.chunks(4) {
            let positions: Vec<IVec3> = quad.iter().map(|v| v.position()).collect();
            let is_floor = QUAD_ORDER.iter().all(|&k| positions.contains(&(IVec3::new(2, 2, 0) + bottom[k])));
            assert!(!is_floor);
        }
    }

    #[test]
    fn test_view_cap_is_hidden() {
        // Solid block cut by the view at z = 7
        let grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::ROCK).unwrap();
        let view = ViewBounds::full(grid.size()).with_max_z(7);
        let out = mesh(&grid, IVec3::ZERO, &view, FaceSet::from(FaceDirection::PositiveZ));

        assert_eq!(out.terrain.len(), 16 * 16 * 4);
        assert!(out.terrain.iter().all(|v| v.occlusion == TerrainVertex::HIDDEN_OCCLUSION));
        assert!(out.terrain.iter().all(|v| v.texture == FaceTexture::WALL));
        assert!(out.terrain.iter().all(|v| v.position[2] == 8));
    }

    #[test]
    fn test_occlusion_bound() {
        let grid = testmaps::ball(32, 12).unwrap();
        let view = ViewBounds::full(grid.size()).with_max_z(20);
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    let offset = IVec3::new(x, y, z) * CHUNK_SIZE;
                    let Some(fp) = ViewFootprint::compute(offset, grid.size(), &view, FaceSet::ALL) else { continue };
                    let input = MeshInput { grid: &grid, offset, footprint: &fp, face_mask: FaceSet::ALL };
                    let mut out = ChunkMesh::default();
                    mesh_per_voxel(&input, &mut out);
                    assert!(out.terrain.iter().all(|v| (0..=4).contains(&v.occlusion)));
                }
            }
        }
    }

    #[test]
    fn test_scenery_and_slopes() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY).unwrap();
        grid.set_voxel(IVec3::new(1, 1, 1), Voxel::EMPTY.with_flags(flags::TREE));
        grid.set_voxel(IVec3::new(5, 5, 1), Voxel::slope(0, 2));
        let out = mesh(&grid, IVec3::ZERO, &uncapped(&grid), FaceSet::ALL);

        assert_eq!(out.scenery, vec![SceneryVertex::tree(IVec3::new(1, 1, 1))]);
        assert_eq!(out.slopes.len(), 12);
        assert!(out.terrain.is_empty());
    }

    fn drawn_faces(grid: &VoxelGrid, fp: &ViewFootprint, mask: FaceSet) -> HashSet<(FaceDirection, IVec3)> {
        let mut faces = HashSet::new();
        for p in fp.iter_top_down() {
            let voxel = grid.voxel_at(p);
            if voxel.is_empty() || voxel.is_slope() {
                continue;
            }
            for face in (voxel.visible_faces() & mask).iter() {
                if !(face == FaceDirection::NegativeZ && p.z == 0) {
                    faces.insert((face, p));
                }
            }
        }
        faces
    }

    #[test]
    fn test_greedy_covers_same_faces() {
        let mut grid = testmaps::ball(32, 10).unwrap();
        grid.set_voxel(IVec3::new(8, 8, 3), Voxel::slope(1, 1));
        grid.set_voxel(IVec3::new(9, 8, 3), Voxel::ROCK.with_flags(flags::GRASS));
        let view = uncapped(&grid);
        let mut mesher = GreedyMesher::new(CHUNK_SIZE);

        for offset in [IVec3::ZERO, IVec3::new(16, 0, 0), IVec3::new(0, 16, 16)] {
            for mask in [FaceSet::ALL, FaceSet::from_bits(0b01_0110)] {
                let fp = footprint(&grid, offset, &view, mask);
                let input = MeshInput { grid: &grid, offset, footprint: &fp, face_mask: mask };

                let mut naive = ChunkMesh::default();
                mesh_per_voxel(&input, &mut naive);

                let mut quads = Vec::new();
                let mut greedy = ChunkMesh::default();
                mesh_greedy(&input, &mut mesher, &mut quads, &mut greedy);

                let mut covered = HashSet::new();
                for quad in &quads {
                    for cell in quad.cells() {
                        assert!(covered.insert((quad.face, offset + cell)));
                    }
                }
                let expected = drawn_faces(&grid, &fp, mask);
                assert_eq!(covered, expected);
                assert_eq!(naive.terrain.len(), expected.len() * 4);
                assert!(greedy.terrain.len() <= naive.terrain.len());
                assert_eq!(greedy.slopes, naive.slopes);
                assert_eq!(greedy.scenery, naive.scenery);
            }
        }
    }

    #[test]
    fn test_greedy_covers_same_faces_with_clear_water() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY).unwrap();
        grid.set_policy(crate::voxel::VisibilityPolicy { water_opaque: false, ..Default::default() });
        grid.set_voxel(IVec3::new(4, 4, 4), Voxel::WATER);
        grid.set_voxel(IVec3::new(4, 4, 5), Voxel::WATER);
        for x in 8..11 {
            grid.set_voxel(IVec3::new(x, 8, 1), Voxel::WATER);
            grid.set_voxel(IVec3::new(x, 8, 0), Voxel::ROCK);
        }
        let view = uncapped(&grid);
        let fp = footprint(&grid, IVec3::ZERO, &view, FaceSet::ALL);
        let input = MeshInput { grid: &grid, offset: IVec3::ZERO, footprint: &fp, face_mask: FaceSet::ALL };

        let mut naive = ChunkMesh::default();
        mesh_per_voxel(&input, &mut naive);
        let mut quads = Vec::new();
        let mut greedy = ChunkMesh::default();
        mesh_greedy(&input, &mut GreedyMesher::new(CHUNK_SIZE), &mut quads, &mut greedy);

        let mut covered = HashSet::new();
        for quad in &quads {
            for cell in quad.cells() {
                assert!(covered.insert((quad.face, cell)));
            }
        }
        let expected = drawn_faces(&grid, &fp, FaceSet::ALL);
        assert_eq!(covered, expected);
        assert_eq!(naive.terrain.len(), expected.len() * 4);
        assert!(expected.contains(&(FaceDirection::PositiveZ, IVec3::new(4, 4, 4))));
    }

    #[test]
    fn test_greedy_merges_flat_floor() {
        let mut grid = VoxelGrid::filled(GridSize::cubic(16), Voxel::EMPTY).unwrap();
        for y in 0..16 {
            for x in 0..16 {
                grid.set_raw(IVec3::new(x, y, 0), Voxel::ROCK);
            }
        }
        // Keep the world edge from shadowing the outer ring
        grid.set_policy(crate::voxel::VisibilityPolicy { boundary_occludes: false, ..Default::default() });
        grid.compute_all_visible_faces();
        let fp = footprint(&grid, IVec3::ZERO, &uncapped(&grid), FaceSet::ALL);
        let input = MeshInput { grid: &grid, offset: IVec3::ZERO, footprint: &fp, face_mask: FaceSet::ALL };

        let mut quads = Vec::new();
        let mut out = ChunkMesh::default();
        mesh_greedy(&input, &mut GreedyMesher::new(CHUNK_SIZE), &mut quads, &mut out);

        // One top quad; the sides face the grid boundary and the bottom is the world floor
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].area(), 256);
        assert_eq!(out.terrain.len(), 4);
    }
}
