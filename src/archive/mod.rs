//! The local archive: one data file and one `.json` metadata sidecar per
//! asset, at template-derived paths under a root directory.
//!
//! The sidecar is the commit marker for a verified download — `files_to_sync`
//! treats a missing sidecar, or one whose stored `modification_date` differs
//! from the phone's, as "needs download". `load_from_disk` rebuilds a
//! deletion proof by recomputing size and digest from the actual bytes on
//! disk, never from a cached value, so the proof attests current state.

pub mod error;
pub mod template;

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};

use crate::types::{Asset, DeletionProof};
use error::ArchiveError;

/// Lowercase hex MD5 of a byte slice, matching the digest format the phone
/// reports in `_md5`.
pub fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// The on-disk archive layout: root directory plus the two path templates.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
    path_template: String,
    metadata_template: String,
}

impl Storage {
    pub fn new(
        dir: impl Into<PathBuf>,
        path_template: impl Into<String>,
        metadata_template: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            path_template: path_template.into(),
            metadata_template: metadata_template.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn expand_under_root(&self, tpl: &str, asset: &Asset) -> Result<PathBuf, ArchiveError> {
        let fields = template::expansion_map(asset)?;
        let relative = template::expand(tpl, &fields)?;
        // Join forward-slash segments as components so templates stay
        // portable across platforms.
        let mut path = self.dir.clone();
        for component in relative.split('/') {
            if !component.is_empty() {
                path.push(component);
            }
        }
        Ok(path)
    }

    /// Path of the asset's data file. Pure function of the asset metadata.
    pub fn get_path(&self, asset: &Asset) -> Result<PathBuf, ArchiveError> {
        self.expand_under_root(&self.path_template, asset)
    }

    /// Path of the asset's metadata sidecar; the extension is always
    /// replaced with `.json`.
    pub fn get_metadata_path(&self, asset: &Asset) -> Result<PathBuf, ArchiveError> {
        let mut path = self.expand_under_root(&self.metadata_template, asset)?;
        path.set_extension("json");
        Ok(path)
    }

    /// Diff the phone's asset list against the archive.
    ///
    /// An asset needs syncing when its sidecar is missing or stores a
    /// different `modification_date`. Result order follows the input order.
    pub fn files_to_sync<'a>(&self, on_phone: &'a [Asset]) -> Result<Vec<&'a Asset>, ArchiveError> {
        let mut to_sync = Vec::new();
        for asset in on_phone {
            let sidecar = self.get_metadata_path(asset)?;
            if !sidecar.is_file() {
                to_sync.push(asset);
                continue;
            }
            let stored: Asset = match std::fs::read(&sidecar) {
                Ok(bytes) => match serde_json::from_slice(&bytes) {
                    Ok(stored) => stored,
                    Err(e) => {
                        // An unreadable sidecar means the entry cannot be
                        // trusted; re-sync it rather than failing the run.
                        tracing::warn!(
                            path = %sidecar.display(),
                            error = %e,
                            "sidecar does not parse, scheduling re-sync",
                        );
                        to_sync.push(asset);
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %sidecar.display(),
                        error = %e,
                        "sidecar unreadable, scheduling re-sync",
                    );
                    to_sync.push(asset);
                    continue;
                }
            };
            if stored.modification_date != asset.modification_date {
                to_sync.push(asset);
            }
        }
        Ok(to_sync)
    }

    /// Rebuild a deletion proof from the archive.
    ///
    /// The sidecar supplies the trusted metadata; size and MD5 are recomputed
    /// from the data file's bytes so the proof describes what is on disk
    /// right now, not what was once written.
    pub fn load_from_disk(&self, asset: &Asset) -> Result<DeletionProof, ArchiveError> {
        let sidecar_path = self.get_metadata_path(asset)?;
        let sidecar_bytes =
            std::fs::read(&sidecar_path).map_err(|source| ArchiveError::Corruption {
                local_id: asset.local_id.clone(),
                path: sidecar_path.clone(),
                source,
            })?;
        let stored: Asset =
            serde_json::from_slice(&sidecar_bytes).map_err(|source| ArchiveError::SidecarDecode {
                path: sidecar_path,
                source,
            })?;

        let data_path = self.get_path(asset)?;
        let data = std::fs::read(&data_path).map_err(|source| ArchiveError::Corruption {
            local_id: asset.local_id.clone(),
            path: data_path,
            source,
        })?;

        Ok(DeletionProof {
            asset: stored,
            filesize: data.len() as u64,
            md5: md5_hex(&data),
        })
    }
}
