//! Binary grid file: three little-endian i32 dimensions then one u64 record
//! per voxel in z, y, x order

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

use crate::core::{Error, Result};
use super::grid::{GridSize, VoxelGrid};
use super::voxel::Voxel;

const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = std::mem::size_of::<u64>();

/// Serialize `grid` into `writer`
pub fn write_grid<W: Write>(grid: &VoxelGrid, writer: &mut W) -> io::Result<()> {
    let size = grid.size();
    for dim in [size.width, size.height, size.depth] {
        writer.write_all(&(dim as i32).to_le_bytes())?;
    }
    for voxel in grid.voxels() {
        writer.write_all(&voxel.raw().to_le_bytes())?;
    }
    Ok(())
}

/// Read only the stored dimensions
pub fn read_size<R: Read>(reader: &mut R) -> Result<GridSize> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;

    let dim = |i: usize| {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&header[i * 4..i * 4 + 4]);
        i32::from_le_bytes(bytes)
    };
    let (w, h, d) = (dim(0), dim(1), dim(2));
    if w <= 0 || h <= 0 || d <= 0 {
        return Err(Error::InvalidDimensions(GridSize::new(
            w.max(0) as u32,
            h.max(0) as u32,
            d.max(0) as u32,
        )));
    }
    Ok(GridSize::new(w as u32, h as u32, d as u32))
}

/// Deserialize a grid whose stored size must equal `expected`
pub fn read_grid<R: Read>(reader: &mut R, expected: GridSize) -> Result<VoxelGrid> {
    let found = read_size(reader)?;
    if found != expected {
        return Err(Error::FormatMismatch { expected, found });
    }

    let len = expected
        .checked_volume()
        .ok_or(Error::InvalidDimensions(expected))?;
    let mut bytes = Vec::with_capacity(len * RECORD_LEN);
    reader.take((len * RECORD_LEN) as u64).read_to_end(&mut bytes)?;
    if bytes.len() < len * RECORD_LEN {
        return Err(Error::Truncated { expected: len, found: bytes.len() / RECORD_LEN });
    }

    let voxels = bytes
        .chunks_exact(RECORD_LEN)
        .map(|record| {
            let mut raw = [0u8; RECORD_LEN];
            raw.copy_from_slice(record);
            Voxel::from_raw(u64::from_le_bytes(raw))
        })
        .collect();

    VoxelGrid::from_voxels(expected, voxels)
}

/// Write `grid` to `path`, replacing any existing file
pub fn save(grid: &VoxelGrid, path: &Path) -> Result<()> {
    let start = Instant::now();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_grid(grid, &mut writer)?;
    writer.flush()?;

    log::info!("Saved {} grid to {} in {:.1}ms",
        grid.size(), path.display(), start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

/// Load a grid of the expected size from `path`
pub fn load(path: &Path, expected: GridSize) -> Result<VoxelGrid> {
    let start = Instant::now();
    let mut reader = BufReader::new(File::open(path)?);
    let grid = read_grid(&mut reader, expected)?;

    log::info!("Loaded {} grid from {} in {:.1}ms",
        expected, path.display(), start.elapsed().as_secs_f64() * 1000.0);
    Ok(grid)
}

/// Load `path`, or build a fresh grid with `generate` and save it when the
/// file is missing, unreadable or of a different size
pub fn load_or_generate<F>(path: &Path, expected: GridSize, generate: F) -> Result<VoxelGrid>
where
    F: FnOnce() -> Result<VoxelGrid>,
{
    match load(path, expected) {
        Ok(grid) => Ok(grid),
        Err(e) => {
            log::warn!("Cannot use grid file {}: {}; regenerating", path.display(), e);
            let grid = generate()?;
            save(&grid, path)?;
            Ok(grid)
        }
    }
}
