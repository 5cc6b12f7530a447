//! Error types for retrieval and verification.

use std::path::PathBuf;

use thiserror::Error;

use crate::archive::error::ArchiveError;
use crate::phone::PhoneError;

/// Errors raised while retrieving and verifying a single asset.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The re-read file's length differs from the phone's `_filesize`.
    #[error("size mismatch for {path}: {actual} bytes on disk, phone reported {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// The re-read file's MD5 differs from the phone's `_md5`.
    #[error("md5 mismatch for {path}: got {actual}, phone reported {expected}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Phone(#[from] PhoneError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("archive I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode metadata sidecar: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SyncError {
    /// Verification failures are fatal for the asset but not for the run:
    /// the sidecar was never written, so the next run retries. Everything
    /// else aborts the whole sync.
    pub fn is_per_asset(&self) -> bool {
        matches!(
            self,
            SyncError::SizeMismatch { .. } | SyncError::ChecksumMismatch { .. }
        )
    }
}
