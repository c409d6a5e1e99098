//! One 16³ partition of the grid and its generated mesh

use glam::IVec3;

use crate::math::Aabb;
use crate::mesh::greedy::{GreedyMesher, GreedyQuad};
use crate::voxel::{flags, FaceSet, VoxelGrid};
use super::config::MeshMode;
use super::mesher::{mesh_greedy, mesh_per_voxel, ChunkMesh, MeshInput};
use super::view::{chunk_face_mask, ViewBounds, ViewFootprint};

/// Chunk edge length in voxels
pub const CHUNK_SIZE: i32 = 16;

/// Per-thread buffers reused across remeshes
#[derive(Debug)]
pub struct MeshScratch {
    greedy: GreedyMesher,
    quads: Vec<GreedyQuad>,
}

impl Default for MeshScratch {
    fn default() -> Self {
        Self {
            greedy: GreedyMesher::new(CHUNK_SIZE),
            quads: Vec::new(),
        }
    }
}

/// Inputs shared by every chunk remesh in a frame
#[derive(Clone, Copy, Debug)]
pub struct RemeshContext<'a> {
    pub grid: &'a VoxelGrid,
    pub camera_chunk: IVec3,
    pub view: &'a ViewBounds,
    pub mode: MeshMode,
}

/// A chunk never owns voxels; it reads the grid when remeshing and is told
/// from outside when its voxels changed.
#[derive(Debug)]
pub struct Chunk {
    coord: IVec3,
    offset: IVec3,
    bounds: Aabb,
    valid: bool,
    empty: bool,
    enabled: bool,
    /// Voxel contents changed since emptiness was last scanned
    rescan: bool,
    face_mask: Option<FaceSet>,
    footprint: Option<ViewFootprint>,
    mesh: ChunkMesh,
    /// Bumped whenever `mesh` changes
    revision: u64,
}

impl Chunk {
    pub fn new(coord: IVec3, grid: &VoxelGrid) -> Self {
        let offset = coord * CHUNK_SIZE;
        let mut chunk = Self {
            coord,
            offset,
            bounds: Aabb::from_cells(offset, IVec3::splat(CHUNK_SIZE)),
            valid: false,
            empty: true,
            enabled: false,
            rescan: false,
            face_mask: None,
            footprint: None,
            mesh: ChunkMesh::default(),
            revision: 0,
        };
        chunk.empty = chunk.scan_empty(grid);
        chunk
    }

    pub fn coord(&self) -> IVec3 {
        self.coord
    }

    /// World position of the first voxel
    pub fn offset(&self) -> IVec3 {
        self.offset
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Every voxel is Undefined or Empty, and none carries a tree
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn scan_empty(&self, grid: &VoxelGrid) -> bool {
        let size = grid.size().as_ivec3();
        let min = self.offset.max(IVec3::ZERO);
        let max = (self.offset + IVec3::splat(CHUNK_SIZE)).min(size);
        for z in min.z..max.z {
            for y in min.y..max.y {
                for x in min.x..max.x {
                    let voxel = grid.voxel_at(IVec3::new(x, y, z));
                    // Trees stand on the air voxel above the ground
                    if voxel.has_flag(flags::TREE) || !(voxel.is_undefined() || voxel.is_empty()) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Force a remesh on the next update
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Voxels inside or next to this chunk changed
    pub fn invalidate_contents(&mut self) {
        self.valid = false;
        self.rescan = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Drop the mesh; the next update while enabled rebuilds it
    pub fn free(&mut self) {
        if !self.mesh.is_empty() {
            self.mesh = ChunkMesh::default();
            self.revision += 1;
        }
        self.valid = false;
        self.face_mask = None;
        self.footprint = None;
    }

    /// Rebuild the mesh if it is invalid or was made for another face mask
    /// or view footprint. Returns true when the mesh was regenerated.
    pub fn update(&mut self, ctx: &RemeshContext<'_>, scratch: &mut MeshScratch) -> bool {
        if self.rescan {
            self.empty = self.scan_empty(ctx.grid);
            self.rescan = false;
        }

        if self.empty {
            let had_mesh = !self.mesh.is_empty();
            if had_mesh {
                self.mesh.clear();
                self.revision += 1;
            }
            self.valid = true;
            self.face_mask = None;
            self.footprint = None;
            return had_mesh;
        }

        let face_mask = chunk_face_mask(ctx.camera_chunk, self.coord);
        let footprint = ViewFootprint::compute(self.offset, ctx.grid.size(), ctx.view, face_mask);
        if self.valid && self.face_mask == Some(face_mask) && self.footprint == footprint {
            return false;
        }

        match &footprint {
            Some(fp) => {
                let input = MeshInput {
                    grid: ctx.grid,
                    offset: self.offset,
                    footprint: fp,
                    face_mask,
                };
                match ctx.mode {
                    MeshMode::PerVoxel => mesh_per_voxel(&input, &mut self.mesh),
                    MeshMode::Greedy => {
                        mesh_greedy(&input, &mut scratch.greedy, &mut scratch.quads, &mut self.mesh)
                    }
                }
            }
            None => self.mesh.clear(),
        }

        self.valid = true;
        self.face_mask = Some(face_mask);
        self.footprint = footprint;
        self.revision += 1;
        true
    }
}
