//! Sync engine: diff the phone's library against the archive, then retrieve
//! and verify each missing or changed asset in order.
//!
//! The metadata sidecar is written only after the downloaded bytes have been
//! re-read from disk and both the size and MD5 checks passed. That write is
//! the sole commit point, which makes repeated runs idempotent: a failed or
//! interrupted retrieval leaves no sidecar and the asset is listed again next
//! run.

pub mod error;

use std::io::IsTerminal;

use chrono::DateTime;
use indicatif::{ProgressBar, ProgressStyle};

use crate::archive::{md5_hex, Storage};
use crate::phone::Phone;
use crate::types::{Asset, RetrievedAsset};
pub use error::SyncError;

/// Retrieve one asset from the phone, persist it, and verify it.
///
/// Order matters: write the data file, re-read it from disk, check the length
/// against the phone's `_filesize`, recompute MD5 against `_md5`, and only
/// then write the sidecar. Re-reading rather than trusting the write call
/// means a short or corrupted write fails verification instead of being
/// committed.
pub async fn retrieve(
    phone: &dyn Phone,
    storage: &Storage,
    asset: &Asset,
) -> Result<RetrievedAsset, SyncError> {
    let data_path = storage.get_path(asset)?;
    let metadata_path = storage.get_metadata_path(asset)?;

    let retrieved = phone.retrieve_asset_by_local_id(&asset.local_id).await?;

    if let Some(parent) = data_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if let Some(parent) = metadata_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(&data_path, &retrieved.data).await?;

    let on_disk = tokio::fs::read(&data_path).await?;
    if on_disk.len() as u64 != retrieved.filesize {
        return Err(SyncError::SizeMismatch {
            path: data_path,
            expected: retrieved.filesize,
            actual: on_disk.len() as u64,
        });
    }

    let digest = md5_hex(&on_disk);
    if !digest.eq_ignore_ascii_case(&retrieved.md5) {
        return Err(SyncError::ChecksumMismatch {
            path: data_path,
            expected: retrieved.md5,
            actual: digest,
        });
    }

    // Commit point: sidecar holds the clean asset fields only.
    let sidecar = serde_json::to_vec_pretty(&retrieved.asset)?;
    tokio::fs::write(&metadata_path, sidecar).await?;

    Ok(retrieved)
}

/// Hidden when the user asked for no bar or stdout is not a TTY, so piped
/// output stays clean.
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb
}

fn format_creation_date(asset: &Asset) -> String {
    asset
        .creation_date
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "????-??-?? ??:??:??".to_string())
}

/// Run a full incremental sync pass.
///
/// Verification failures are logged and the queue continues; the failed asset
/// keeps no sidecar and is retried on the next run. Transport and archive
/// errors abort the run. Exits with an error if any asset failed.
pub async fn run_sync(
    phone: &dyn Phone,
    storage: &Storage,
    no_progress_bar: bool,
) -> anyhow::Result<()> {
    let on_phone = phone.get_all_metadata().await?;
    tracing::info!(on_phone = on_phone.len(), "fetched phone metadata");

    let to_sync = storage.files_to_sync(&on_phone)?;
    tracing::info!(to_sync = to_sync.len(), "assets needing download");
    if to_sync.is_empty() {
        tracing::info!("archive is up to date");
        return Ok(());
    }

    let total = to_sync.len();
    let pb = create_progress_bar(no_progress_bar, total as u64);
    let mut failed: Vec<String> = Vec::new();

    for (i, asset) in to_sync.iter().enumerate() {
        pb.set_message(asset.filename.clone());
        match retrieve(phone, storage, asset).await {
            Ok(retrieved) => {
                pb.suspend(|| {
                    tracing::info!(
                        "{:>5} / {:>5}: {:>20} {} ({:>9} bytes)",
                        i + 1,
                        total,
                        retrieved.asset.filename,
                        format_creation_date(&retrieved.asset),
                        retrieved.filesize,
                    );
                });
            }
            Err(e) if e.is_per_asset() => {
                pb.suspend(|| {
                    tracing::error!(local_id = %asset.local_id, "verification failed: {e}");
                });
                failed.push(asset.filename.clone());
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e.into());
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} assets failed verification: {}",
            failed.len(),
            total,
            failed.join(", ")
        );
    }
    Ok(())
}
