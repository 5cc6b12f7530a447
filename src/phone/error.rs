//! Error types for the phone RPC boundary.

use thiserror::Error;

/// Errors surfaced by the phone's RPC interface.
#[derive(Error, Debug)]
pub enum PhoneError {
    /// The RPC endpoint is unreachable or returned a malformed response.
    #[error("phone transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The phone answered with an error the client has no specific type for.
    #[error("phone RPC error in {method}: {message}")]
    Rpc { method: String, message: String },

    /// The phone cannot resolve a `local_id`.
    #[error("phone does not know asset {0}")]
    UnknownAsset(String),

    /// The phone rejected the deletion batch: the proofs did not match its
    /// live state and the integrity override was off. Nothing was deleted.
    #[error("phone rejected deletion batch: {0}")]
    IntegrityRejected(String),

    /// The phone's response did not decode into the expected shape.
    #[error("cannot decode phone response for {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Error body returned inside the RPC envelope.
#[derive(Debug, serde::Deserialize)]
pub struct RpcErrorBody {
    pub code: String,
    pub message: String,
}

impl PhoneError {
    /// Map a wire-level error body onto the client taxonomy.
    pub fn from_rpc_body(method: &str, body: RpcErrorBody) -> Self {
        match body.code.as_str() {
            "unknown_asset" => PhoneError::UnknownAsset(body.message),
            "integrity_rejected" => PhoneError::IntegrityRejected(body.message),
            _ => PhoneError::Rpc {
                method: method.to_string(),
                message: format!("{}: {}", body.code, body.message),
            },
        }
    }
}
