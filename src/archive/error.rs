//! Error types for the local archive.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while deriving paths or reading archive entries.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// A path template needs a date the asset does not carry.
    #[error("asset {local_id} is missing required field '{field}'")]
    MissingField {
        local_id: String,
        field: &'static str,
    },

    /// A timestamp outside chrono's representable range.
    #[error("asset {local_id} has out-of-range timestamp {value}")]
    InvalidTimestamp { local_id: String, value: i64 },

    /// The path template references a field that does not exist.
    #[error("unknown placeholder {{{name}}} in path template")]
    UnknownPlaceholder { name: String },

    /// A `{` without a matching `}` in the template.
    #[error("unterminated placeholder in path template '{template}'")]
    UnterminatedPlaceholder { template: String },

    /// An entry expected to be archived has a missing or unreadable file.
    /// Deletion proofs must never be built from such entries.
    #[error("archive entry for {local_id} is missing or unreadable at {path}: {source}")]
    Corruption {
        local_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata sidecar exists but does not parse as asset metadata.
    #[error("cannot decode metadata sidecar {path}: {source}")]
    SidecarDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ArchiveError {
    /// Whether this error means the local entry cannot back a deletion proof
    /// (as opposed to a template/configuration problem).
    pub fn is_entry_unusable(&self) -> bool {
        matches!(
            self,
            ArchiveError::Corruption { .. } | ArchiveError::SidecarDecode { .. }
        )
    }
}
