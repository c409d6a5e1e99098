//! Error types for the voxmesh crate

use thiserror::Error;

use crate::voxel::GridSize;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grid size mismatch: expected {expected}, found {found}")]
    FormatMismatch { expected: GridSize, found: GridSize },

    #[error("Truncated voxel data: expected {expected} records, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(GridSize),

    #[error("Config error: {0}")]
    Config(String),

    #[error("GPU error: {0}")]
    Gpu(String),
}
