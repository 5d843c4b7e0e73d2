//! Setup-time error type.
//!
//! Energy anomalies are never errors: they surface as `NaN` and fail the
//! acceptance test. Only lattice construction, cell registration and buffer
//! transfers can fail.

use thiserror::Error;

/// Errors raised while configuring or populating a lattice.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PottsError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Cell IDs must be strictly positive; `0` is media.
    #[error("cell id {0} is reserved")]
    ReservedId(i32),
    #[error("cell id {0} is already registered")]
    DuplicateCell(i32),
    #[error("cell id {0} is not registered")]
    UnknownCell(i32),
    #[error("voxel ({x}, {y}, {z}) is outside the lattice")]
    OutOfBounds { x: i16, y: i16, z: i16 },
    /// Region tags are negative; `0` marks untagged voxels.
    #[error("tag {0} is not a region tag")]
    InvalidTag(i32),
    #[error("lattice has no tag layer")]
    Untagged,
    #[error("region is empty after clamping to the lattice")]
    EmptyRegion,
    #[error("buffer holds {actual} values but the region needs {expected}")]
    BufferTooSmall { expected: usize, actual: usize },
}
