//! Rendering interfaces consumed by the chunk manager

pub mod headless;

use glam::IVec3;

use crate::core::Result;

pub use headless::{DrawCall, HeadlessBuffer, HeadlessDevice};

/// Primitive topology of a vertex stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Four vertices per cube face, expanded into quads by the shader
    LineListWithAdjacency,
    TriangleList,
    PointList,
}

/// The three per-chunk vertex streams, in draw order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshStream {
    Terrain,
    Slopes,
    Scenery,
}

impl MeshStream {
    pub const ALL: [MeshStream; 3] = [MeshStream::Terrain, MeshStream::Slopes, MeshStream::Scenery];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn topology(self) -> Topology {
        match self {
            MeshStream::Terrain => Topology::LineListWithAdjacency,
            MeshStream::Slopes => Topology::TriangleList,
            MeshStream::Scenery => Topology::PointList,
        }
    }
}

/// Minimal GPU surface: vertex buffers, a per-chunk translation and draws.
///
/// Buffers are freed by dropping them.
pub trait GpuDevice {
    type Buffer;

    /// Allocate a vertex buffer holding `capacity` vertices of `stream`
    fn create_buffer(&mut self, stream: MeshStream, capacity: usize) -> Result<Self::Buffer>;

    /// Overwrite the start of `buffer` with `data`
    fn write_buffer(&mut self, buffer: &mut Self::Buffer, data: &[u8]) -> Result<()>;

    /// Translation applied to subsequent draws
    fn set_chunk_offset(&mut self, offset: IVec3);

    fn draw(&mut self, buffer: &Self::Buffer, topology: Topology, vertex_count: usize);
}
