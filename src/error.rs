// ============================================================
// Error Taxonomy
// ============================================================
// Typed errors raised by the domain and data layers.
// The application and CLI layers wrap these in anyhow::Error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading volumes or producing samples.
#[derive(Error, Debug)]
pub enum DataError {
    /// Unknown dataset name, bad scale list, zero slices, patch larger
    /// than the slices it will be cut from.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// A raw volume file could not be found or read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A raw volume file exists but its length does not match the table.
    #[error("'{}' holds {actual} bytes, expected {expected} ({dims:?})", path.display())]
    LengthMismatch {
        /// Offending file.
        path: PathBuf,
        /// nx * ny * nz.
        expected: usize,
        /// Bytes on disk.
        actual: usize,
        /// The (nx, ny, nz) the file was expected to hold.
        dims: [usize; 3],
    },

    /// A directory that should contain a .DAT volume holds none.
    #[error("no .DAT volume found in '{}'", path.display())]
    MissingVolume {
        /// Directory that was scanned.
        path: PathBuf,
    },

    /// Logical index outside the sample space.
    #[error("index {index} out of range for {len} samples")]
    Index {
        /// Requested logical index.
        index: usize,
        /// Number of addressable samples.
        len: usize,
    },

    /// Requested patch does not fit the slice it is cut from.
    #[error("invalid geometry: {message}")]
    InvalidGeometry {
        /// Description of the mismatch.
        message: String,
    },
}

impl DataError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry { message: message.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Result type for the data pipeline.
pub type Result<T> = std::result::Result<T, DataError>;
