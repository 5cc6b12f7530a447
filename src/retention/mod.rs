//! Retention planning: decide which phone assets are old enough and
//! unprotected enough to prune, assemble deletion proofs from the archive,
//! and submit them in one batch.
//!
//! Only user-created albums preserve assets. Smart albums, moments, and the
//! system albums (favorites, screenshots, ...) are not preservation sources.

use std::collections::HashSet;

use thiserror::Error;

use crate::archive::Storage;
use crate::phone::Phone;
use crate::types::{Asset, CollectionSet, DeletionProof};

const SECS_PER_DAY: i64 = 86_400;

/// Malformed `--retain-duration` value. Raised before any network call.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("duration '{0}' must end in d (days), w (weeks) or m (months)")]
    BadSuffix(String),
    #[error("cannot parse '{0}' as a number")]
    BadNumber(String),
    #[error("duration '{0}' must not be negative")]
    Negative(String),
}

/// Parse a retention duration into seconds.
///
/// Accepts an integer or float followed by `d` (days), `w` (weeks, = 7d) or
/// `m` (months, approximated as 31d). Any other suffix is a usage error.
pub fn parse_retain_duration(s: &str) -> Result<i64, DurationParseError> {
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    let (last_index, suffix) = s.char_indices().last().expect("non-empty");
    let number = &s[..last_index];
    let days_per_unit = match suffix {
        'd' => 1.0,
        'w' => 7.0,
        'm' => 31.0,
        _ => return Err(DurationParseError::BadSuffix(s.to_string())),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| DurationParseError::BadNumber(number.to_string()))?;
    if value < 0.0 {
        return Err(DurationParseError::Negative(s.to_string()));
    }
    Ok((value * days_per_unit * SECS_PER_DAY as f64).round() as i64)
}

/// Union of `local_id`s across every manually-created album.
pub fn keep_set(collections: &CollectionSet) -> HashSet<&str> {
    collections
        .albums
        .iter()
        .flat_map(|album| album.assets.iter())
        .map(|asset| asset.local_id.as_str())
        .collect()
}

/// Assets stale enough to prune and not preserved by any manual album.
///
/// Staleness is measured from `modification_date`; an asset without one
/// cannot be judged and is skipped with a warning.
pub fn prune_candidates<'a>(
    assets: &'a [Asset],
    keep: &HashSet<&str>,
    retain_secs: i64,
    now: i64,
) -> Vec<&'a Asset> {
    let mut candidates = Vec::new();
    for asset in assets {
        let Some(modified) = asset.modification_date else {
            tracing::warn!(local_id = %asset.local_id, "no modification date, skipping");
            continue;
        };
        let staleness = now - modified;
        if staleness < retain_secs {
            continue;
        }
        if keep.contains(asset.local_id.as_str()) {
            tracing::debug!(local_id = %asset.local_id, "kept by manual album");
            continue;
        }
        candidates.push(asset);
    }
    candidates
}

/// Build deletion proofs for the candidates from the local archive.
///
/// A candidate that was never fully archived cannot be proven and is
/// excluded from the batch (logged at error level) rather than aborting the
/// run: it will become prunable once a later sync archives it.
pub fn build_proofs(
    storage: &Storage,
    candidates: &[&Asset],
) -> anyhow::Result<Vec<DeletionProof>> {
    let mut proofs = Vec::with_capacity(candidates.len());
    for asset in candidates {
        match storage.load_from_disk(asset) {
            Ok(proof) => proofs.push(proof),
            Err(e) if e.is_entry_unusable() => {
                tracing::error!(
                    local_id = %asset.local_id,
                    "not archived locally, excluded from prune batch: {e}",
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(proofs)
}

/// Run a full prune pass.
///
/// Ends at submission: the phone independently re-verifies the batch and is
/// the sole arbiter of the all-or-nothing commit. A rejection surfaces as
/// `PhoneError::IntegrityRejected` with nothing deleted.
pub async fn run_delete(
    phone: &dyn Phone,
    storage: &Storage,
    retain_secs: i64,
    ignore_integrity: bool,
) -> anyhow::Result<()> {
    let assets = phone.get_all_metadata().await?;
    let collections = phone.get_asset_collections().await?;
    tracing::info!(
        on_phone = assets.len(),
        manual_albums = collections.albums.len(),
        "fetched phone state",
    );

    let keep = keep_set(&collections);
    let now = chrono::Utc::now().timestamp();
    let candidates = prune_candidates(&assets, &keep, retain_secs, now);
    tracing::info!(
        candidates = candidates.len(),
        kept = keep.len(),
        "retention plan",
    );
    if candidates.is_empty() {
        tracing::info!("nothing eligible for pruning");
        return Ok(());
    }

    let proofs = build_proofs(storage, &candidates)?;
    if proofs.is_empty() {
        tracing::warn!("no candidate has a verified local copy, nothing submitted");
        return Ok(());
    }

    phone
        .delete_assets_by_metadata(&proofs, ignore_integrity)
        .await?;
    tracing::info!(pruned = proofs.len(), "phone accepted deletion batch");
    Ok(())
}
