//! Error types shared by both engines and the grid collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelaxError {
    /// The worker pool (or a rank thread) could not be started.
    /// Fatal, the run is abandoned.
    #[error("Failed to spawn workers: {0}")]
    WorkerSpawn(String),

    /// A peer disconnected, panicked, or sent something unexpected.
    #[error("Peer communication failed: {0}")]
    PeerCommunication(String),

    /// The contiguous band formula leaves some rank without rows.
    #[error("Cannot split a {dimension}x{dimension} grid into {ranks} row bands")]
    InvalidPartition { dimension: usize, ranks: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RelaxResult<T> = Result<T, RelaxError>;
