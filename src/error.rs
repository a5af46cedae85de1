//! Error types for the scanning core.
//!
//! Only [`ScanError::RootNotFound`], [`ScanError::InvalidOptions`] and
//! [`ScanError::Output`] ever stop a scan. The rest describe a single
//! archive or entry; the scanner logs them and moves on.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("invalid scan options: {0}")]
    InvalidOptions(&'static str),

    #[error("io error: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A container or one of its entries could not be decoded.
    #[error("archive error: {entry}: {source}")]
    Archive {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to write findings: {0}")]
    Output(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
