//! In-memory GPU device for tools and tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::IVec3;

use crate::core::{Error, Result};
use crate::mesh::{SceneryVertex, SlopeVertex, TerrainVertex};
use super::{GpuDevice, MeshStream, Topology};

fn vertex_size(stream: MeshStream) -> usize {
    match stream {
        MeshStream::Terrain => std::mem::size_of::<TerrainVertex>(),
        MeshStream::Slopes => std::mem::size_of::<SlopeVertex>(),
        MeshStream::Scenery => std::mem::size_of::<SceneryVertex>(),
    }
}

/// CPU-side vertex buffer
#[derive(Debug)]
pub struct HeadlessBuffer {
    pub stream: MeshStream,
    /// Capacity in vertices
    pub capacity: usize,
    pub data: Vec<u8>,
    live: Arc<AtomicUsize>,
}

impl Drop for HeadlessBuffer {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}

/// One recorded draw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub offset: IVec3,
    pub stream: MeshStream,
    pub topology: Topology,
    pub vertex_count: usize,
}

/// Records allocations and draws instead of talking to a GPU
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    offset: IVec3,
    live: Arc<AtomicUsize>,
    /// Buffers allocated since creation
    pub buffers_created: usize,
    pub bytes_written: usize,
    pub draws: Vec<DrawCall>,
    /// Fail allocations larger than this many bytes
    pub max_buffer_bytes: Option<usize>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers currently alive
    pub fn live_buffers(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Vertices submitted by the recorded draws
    pub fn drawn_vertices(&self) -> usize {
        self.draws.iter().map(|d| d.vertex_count).sum()
    }
}

impl GpuDevice for HeadlessDevice {
    type Buffer = HeadlessBuffer;

    fn create_buffer(&mut self, stream: MeshStream, capacity: usize) -> Result<HeadlessBuffer> {
        let bytes = capacity * vertex_size(stream);
        if self.max_buffer_bytes.is_some_and(|max| bytes > max) {
            return Err(Error::Gpu(format!("{bytes} byte {stream:?} buffer exceeds device limit")));
        }

        self.buffers_created += 1;
        self.live.fetch_add(1, Ordering::Relaxed);
        Ok(HeadlessBuffer {
            stream,
            capacity,
            data: vec![0; bytes],
            live: Arc::clone(&self.live),
        })
    }

    fn write_buffer(&mut self, buffer: &mut HeadlessBuffer, data: &[u8]) -> Result<()> {
        if data.len() > buffer.data.len() {
            return Err(Error::Gpu(format!(
                "write of {} bytes overflows {} byte buffer", data.len(), buffer.data.len()
            )));
        }
        buffer.data[..data.len()].copy_from_slice(data);
        self.bytes_written += data.len();
        Ok(())
    }

    fn set_chunk_offset(&mut self, offset: IVec3) {
        self.offset = offset;
    }

    fn draw(&mut self, buffer: &HeadlessBuffer, topology: Topology, vertex_count: usize) {
        self.draws.push(DrawCall {
            offset: self.offset,
            stream: buffer.stream,
            topology,
            vertex_count,
        });
    }
}
