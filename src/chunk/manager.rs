//! Chunk grid ownership, per-frame culling, remeshing and GPU upload

use std::fmt;

use glam::{IVec3, Vec3};
use rayon::prelude::*;

use crate::core::{Error, Result};
use crate::math::{Containment, Frustum};
use crate::render::{GpuDevice, MeshStream};
use crate::voxel::{GridSize, VoxelGrid};
use super::chunk::{Chunk, MeshScratch, RemeshContext, CHUNK_SIZE};
use super::config::{ChunkConfig, MeshMode};
use super::invalidator::ChunkInvalidator;
use super::mesher::ChunkMesh;
use super::view::{chunk_coord_of, ViewBounds};

/// Camera state for one frame
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub frustum: Frustum,
    pub camera_position: Vec3,
    pub view: ViewBounds,
}

/// Counters from the last update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Vertices across all streams of enabled chunks
    pub vertices_rendered: usize,
    /// Enabled chunks that hold any solid voxel
    pub chunks_rendered: usize,
    /// Chunks whose mesh was regenerated
    pub chunk_recalcs: usize,
}

struct StreamBuffer<B> {
    buffer: B,
    /// High-water mark in vertices
    capacity: usize,
    /// Vertices currently valid
    count: usize,
}

struct ChunkBuffers<B> {
    streams: [Option<StreamBuffer<B>>; 3],
    /// Chunk mesh revision last uploaded
    revision: Option<u64>,
}

impl<B> ChunkBuffers<B> {
    fn new() -> Self {
        Self {
            streams: std::array::from_fn(|_| None),
            revision: None,
        }
    }

    fn free(&mut self) {
        self.streams = std::array::from_fn(|_| None);
        self.revision = None;
    }

    fn is_allocated(&self) -> bool {
        self.streams.iter().any(Option::is_some)
    }
}

fn stream_data(mesh: &ChunkMesh, stream: MeshStream) -> (&[u8], usize) {
    match stream {
        MeshStream::Terrain => (bytemuck::cast_slice(&mesh.terrain), mesh.terrain.len()),
        MeshStream::Slopes => (bytemuck::cast_slice(&mesh.slopes), mesh.slopes.len()),
        MeshStream::Scenery => (bytemuck::cast_slice(&mesh.scenery), mesh.scenery.len()),
    }
}

/// Copy a chunk mesh into its buffers, growing a stream's buffer only when
/// the mesh outgrows it
fn upload<D: GpuDevice>(
    device: &mut D,
    coord: IVec3,
    mesh: &ChunkMesh,
    buffers: &mut ChunkBuffers<D::Buffer>,
) -> Result<()> {
    for stream in MeshStream::ALL {
        let (bytes, count) = stream_data(mesh, stream);
        let slot = &mut buffers.streams[stream.index()];

        if count == 0 {
            if let Some(sb) = slot.as_mut() {
                sb.count = 0;
            }
            continue;
        }

        if slot.as_ref().is_none_or(|sb| sb.capacity < count) {
            let buffer = device.create_buffer(stream, count)?;
            log::debug!("Chunk {coord}: {stream:?} buffer grown to {count} vertices");
            *slot = Some(StreamBuffer { buffer, capacity: count, count: 0 });
        }

        if let Some(sb) = slot.as_mut() {
            sb.count = 0;
            device.write_buffer(&mut sb.buffer, bytes)?;
            sb.count = count;
        }
    }
    Ok(())
}

/// Owns every chunk of a grid and the GPU buffers holding their meshes.
///
/// Chunks are kept in draw order: z descending, then y, then x.
pub struct ChunkManager<D: GpuDevice> {
    size: GridSize,
    counts: IVec3,
    config: ChunkConfig,
    chunks: Vec<Chunk>,
    buffers: Vec<ChunkBuffers<D::Buffer>>,
    scratch: MeshScratch,
    stats: FrameStats,
}

impl<D: GpuDevice> ChunkManager<D> {
    /// Partition `grid` into chunks. Partial chunks cover any remainder.
    pub fn new(grid: &VoxelGrid, config: ChunkConfig) -> Self {
        let size = grid.size();
        let counts = (size.as_ivec3() + IVec3::splat(CHUNK_SIZE - 1)) / CHUNK_SIZE;
        if *grid.policy() != config.policy {
            log::warn!("Grid visibility policy differs from chunk config; call ChunkConfig::apply_policy first");
        }

        let mut chunks = Vec::with_capacity((counts.x * counts.y * counts.z) as usize);
        for z in (0..counts.z).rev() {
            for y in 0..counts.y {
                for x in 0..counts.x {
                    chunks.push(Chunk::new(IVec3::new(x, y, z), grid));
                }
            }
        }
        let buffers = chunks.iter().map(|_| ChunkBuffers::new()).collect();

        let empty = chunks.iter().filter(|c| c.is_empty()).count();
        log::info!(
            "Created {} chunks ({}x{}x{}) for {} grid, {} empty",
            chunks.len(), counts.x, counts.y, counts.z, size, empty
        );

        Self {
            size,
            counts,
            config,
            chunks,
            buffers,
            scratch: MeshScratch::default(),
            stats: FrameStats::default(),
        }
    }

    pub fn grid_size(&self) -> GridSize {
        self.size
    }

    /// Chunks along each axis
    pub fn chunk_counts(&self) -> IVec3 {
        self.counts
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Switch meshing strategy; every chunk is remeshed on the next update
    pub fn set_mesh_mode(&mut self, mode: MeshMode) {
        if self.config.mesh_mode != mode {
            self.config.mesh_mode = mode;
            self.invalidate_all();
        }
    }

    pub fn set_parallel_update(&mut self, parallel: bool) {
        self.config.parallel_update = parallel;
    }

    /// Chunks in draw order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    fn index_of(&self, coord: IVec3) -> Option<usize> {
        if coord.cmplt(IVec3::ZERO).any() || coord.cmpge(self.counts).any() {
            return None;
        }
        let z = self.counts.z - 1 - coord.z;
        Some(((z * self.counts.y + coord.y) * self.counts.x + coord.x) as usize)
    }

    pub fn chunk(&self, coord: IVec3) -> Option<&Chunk> {
        self.index_of(coord).map(|i| &self.chunks[i])
    }

    /// Stats of the last update
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Chunks currently holding GPU buffers
    pub fn allocated_chunks(&self) -> usize {
        self.buffers.iter().filter(|b| b.is_allocated()).count()
    }

    /// Remesh every chunk on the next update and rescan its emptiness, so
    /// a grid rewritten in bulk can keep its manager
    pub fn invalidate_all(&mut self) {
        for chunk in &mut self.chunks {
            chunk.invalidate_contents();
        }
    }

    /// Invalidate chunks overlapping the layers `from..=to`, rescanning
    /// their emptiness
    pub fn invalidate_z_range(&mut self, from: i32, to: i32) {
        for chunk in &mut self.chunks {
            let z = chunk.offset().z;
            if z <= to && z + CHUNK_SIZE >= from {
                chunk.invalidate_contents();
            }
        }
    }

    /// Invalidate every chunk whose mesh can depend on voxel `p`, rescanning
    /// their emptiness
    pub fn invalidate_voxel(&mut self, p: IVec3) {
        let lo = (p - IVec3::ONE).div_euclid(IVec3::splat(CHUNK_SIZE));
        let hi = (p + IVec3::ONE).div_euclid(IVec3::splat(CHUNK_SIZE));
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    if let Some(i) = self.index_of(IVec3::new(x, y, z)) {
                        self.chunks[i].invalidate_contents();
                    }
                }
            }
        }
    }

    /// Drain `invalidator` and invalidate the chunks it marked. Returns how
    /// many chunks inside the grid were affected.
    pub fn apply_invalidator(&mut self, invalidator: &mut ChunkInvalidator) -> usize {
        if !invalidator.has_dirty() {
            return 0;
        }
        let mut applied = 0;
        for coord in invalidator.take_dirty_chunks() {
            if let Some(i) = self.index_of(coord) {
                self.chunks[i].invalidate_contents();
                applied += 1;
            }
        }
        applied
    }

    /// Release every mesh and GPU buffer; chunks rebuild when next visible
    pub fn free_all(&mut self) {
        for (chunk, buffers) in self.chunks.iter_mut().zip(&mut self.buffers) {
            chunk.set_enabled(false);
            chunk.free();
            buffers.free();
        }
    }

    /// Cull chunks against the frustum, remesh the stale ones and upload
    /// changed meshes.
    ///
    /// Culling and meshing run on the rayon pool when `parallel_update` is
    /// set; uploads always run on the calling thread.
    pub fn update(&mut self, grid: &VoxelGrid, input: &FrameInput, device: &mut D) -> Result<FrameStats> {
        if grid.size() != self.size {
            return Err(Error::FormatMismatch { expected: self.size, found: grid.size() });
        }

        let ctx = RemeshContext {
            grid,
            camera_chunk: chunk_coord_of(input.camera_position),
            view: &input.view,
            mode: self.config.mesh_mode,
        };
        let frustum = &input.frustum;
        let visit = |scratch: &mut MeshScratch, chunk: &mut Chunk| -> bool {
            if frustum.classify_aabb(chunk.bounds()) == Containment::Disjoint {
                if chunk.is_enabled() {
                    chunk.set_enabled(false);
                    chunk.free();
                }
                return false;
            }
            chunk.set_enabled(true);
            chunk.update(&ctx, scratch)
        };

        let chunk_recalcs = if self.config.parallel_update {
            self.chunks
                .par_iter_mut()
                .map_init(MeshScratch::default, visit)
                .filter(|&remeshed| remeshed)
                .count()
        } else {
            let scratch = &mut self.scratch;
            self.chunks
                .iter_mut()
                .map(|chunk| visit(&mut *scratch, chunk))
                .filter(|&remeshed| remeshed)
                .count()
        };

        let mut stats = FrameStats { chunk_recalcs, ..Default::default() };
        for (chunk, buffers) in self.chunks.iter().zip(&mut self.buffers) {
            if !chunk.is_enabled() {
                if buffers.is_allocated() {
                    log::debug!("Chunk {} left the frustum, buffers freed", chunk.coord());
                }
                buffers.free();
                continue;
            }

            if buffers.revision != Some(chunk.revision()) {
                upload(device, chunk.coord(), chunk.mesh(), buffers)?;
                buffers.revision = Some(chunk.revision());
            }

            stats.vertices_rendered += chunk.mesh().vertex_count();
            if !chunk.is_empty() {
                stats.chunks_rendered += 1;
            }
        }

        if stats.chunk_recalcs > 0 {
            log::debug!(
                "Chunk update: {} remeshed, {} rendered, {} vertices",
                stats.chunk_recalcs, stats.chunks_rendered, stats.vertices_rendered
            );
        }
        self.stats = stats;
        Ok(stats)
    }

    /// Issue draws for every enabled chunk, one pass per stream
    pub fn draw(&self, device: &mut D) {
        for stream in MeshStream::ALL {
            for (chunk, buffers) in self.chunks.iter().zip(&self.buffers) {
                if !chunk.is_enabled() {
                    continue;
                }
                if let Some(sb) = &buffers.streams[stream.index()] {
                    if sb.count > 0 {
                        device.set_chunk_offset(chunk.offset());
                        device.draw(&sb.buffer, stream.topology(), sb.count);
                    }
                }
            }
        }
    }
}

impl<D: GpuDevice> fmt::Debug for ChunkManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkManager")
            .field("size", &self.size)
            .field("counts", &self.counts)
            .field("config", &self.config)
            .field("allocated", &self.allocated_chunks())
            .field("stats", &self.stats)
            .finish()
    }
}
