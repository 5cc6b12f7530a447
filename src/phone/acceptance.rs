//! Device-side deletion acceptance.
//!
//! The phone never deletes on the client's word alone. Each proof in a batch
//! is re-verified against the live library: the clean metadata (every asset
//! field, transient fields excluded) must match field for field, and the
//! proof must carry a size and digest — evidence the client actually
//! downloaded bytes rather than copying metadata. One mismatch rejects the
//! whole batch unless the integrity override is set, in which case mismatches
//! are logged and deletion proceeds for those records anyway.
//!
//! This module is transport-independent so the contract can be tested without
//! a device; the on-device RPC process calls [`verify_batch`] before its
//! batch-delete primitive.

use thiserror::Error;

use crate::types::{Asset, DeletionProof};

/// Read access to the live library, as the device sees it.
pub trait LiveLibrary {
    /// The current serializable state of the asset with this `local_id`,
    /// or `None` if the device cannot resolve it.
    fn live_asset(&self, local_id: &str) -> Option<Asset>;
}

/// Why a single proof failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    /// No live asset with the proof's `local_id`.
    UnknownAsset,
    /// Live metadata differs from the proof's metadata.
    MetadataDiverged,
    /// The proof carries no digest, so possession of the bytes is unproven.
    MissingDigest,
}

impl std::fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MismatchReason::UnknownAsset => write!(f, "no such asset on the phone"),
            MismatchReason::MetadataDiverged => write!(f, "live metadata diverged from proof"),
            MismatchReason::MissingDigest => write!(f, "proof carries no checksum"),
        }
    }
}

/// Batch rejection: one bad proof and no override means nothing is deleted.
#[derive(Error, Debug)]
#[error("deletion batch rejected at asset {local_id}: {reason}")]
pub struct BatchRejected {
    pub local_id: String,
    pub reason: MismatchReason,
}

fn check_proof(live: &dyn LiveLibrary, proof: &DeletionProof) -> Option<MismatchReason> {
    if proof.md5.is_empty() {
        return Some(MismatchReason::MissingDigest);
    }
    match live.live_asset(&proof.asset.local_id) {
        None => Some(MismatchReason::UnknownAsset),
        // Field-for-field comparison of the clean metadata; `_filesize` and
        // `_md5` are not part of the comparison.
        Some(current) if current != proof.asset => Some(MismatchReason::MetadataDiverged),
        Some(_) => None,
    }
}

/// Verify a proof batch against the live library.
///
/// Returns the `local_id`s accepted for deletion, in batch order. With the
/// override off, the first mismatch rejects the entire batch; with it on,
/// mismatched records are logged and still accepted.
pub fn verify_batch(
    live: &dyn LiveLibrary,
    proofs: &[DeletionProof],
    ignore_integrity: bool,
) -> Result<Vec<String>, BatchRejected> {
    let mut accepted = Vec::with_capacity(proofs.len());
    for proof in proofs {
        if let Some(reason) = check_proof(live, proof) {
            if !ignore_integrity {
                return Err(BatchRejected {
                    local_id: proof.asset.local_id.clone(),
                    reason,
                });
            }
            tracing::warn!(
                local_id = %proof.asset.local_id,
                %reason,
                "integrity override set, deleting despite mismatch",
            );
        }
        accepted.push(proof.asset.local_id.clone());
    }
    Ok(accepted)
}
