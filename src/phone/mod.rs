//! The phone boundary.
//!
//! The on-device process owns all assets and collections; this side only ever
//! reads them, except for the single destructive `delete_assets_by_metadata`
//! call. The surface is a trait so the planners can be exercised against an
//! in-memory library in tests, with `HttpPhone` as the thin JSON-over-HTTP
//! binding used in production. All calls are strictly request/response; the
//! client never issues concurrent RPCs.

pub mod acceptance;
pub mod error;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::types::{Asset, CollectionSet, DeletionProof, RetrievedAsset};
pub use error::PhoneError;
use error::RpcErrorBody;

/// The four operations the phone process exposes.
#[async_trait]
pub trait Phone: Send + Sync {
    /// Full metadata for every image and video asset. No transient fields.
    async fn get_all_metadata(&self) -> Result<Vec<Asset>, PhoneError>;

    /// Albums, smart albums, moments, and the system albums.
    async fn get_asset_collections(&self) -> Result<CollectionSet, PhoneError>;

    /// Raw bytes plus full metadata for one asset. The phone computes
    /// `_filesize` and `_md5` itself at retrieval time — its own assertion
    /// of what it believes it sent.
    async fn retrieve_asset_by_local_id(
        &self,
        local_id: &str,
    ) -> Result<RetrievedAsset, PhoneError>;

    /// Submit a deletion-proof batch. The phone independently re-verifies
    /// every proof against its live state before deleting anything; see
    /// [`acceptance`] for the contract. Destructive and irreversible.
    async fn delete_assets_by_metadata(
        &self,
        proofs: &[DeletionProof],
        ignore_integrity: bool,
    ) -> Result<(), PhoneError>;
}

/// Envelope for one RPC call: `POST {host}/rpc` with a method name and a
/// positional parameter array, answered by `{"result": ...}` or
/// `{"error": {"code", "message"}}`.
#[derive(Debug, serde::Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, serde::Deserialize)]
struct RpcResponse {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorBody>,
}

/// JSON-over-HTTP binding to the phone process.
pub struct HttpPhone {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPhone {
    pub fn new(host: &str) -> Result<Self, PhoneError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/rpc", host.trim_end_matches('/')),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, PhoneError> {
        tracing::debug!(method, "phone rpc");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RpcRequest { method, params })
            .send()
            .await?;
        let envelope: RpcResponse = response.error_for_status()?.json().await?;

        if let Some(body) = envelope.error {
            return Err(PhoneError::from_rpc_body(method, body));
        }
        let result = envelope.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(result).map_err(|source| PhoneError::Decode {
            method: method.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Phone for HttpPhone {
    async fn get_all_metadata(&self) -> Result<Vec<Asset>, PhoneError> {
        self.call("get_all_metadata", json!([])).await
    }

    async fn get_asset_collections(&self) -> Result<CollectionSet, PhoneError> {
        self.call("get_asset_collections", json!([])).await
    }

    async fn retrieve_asset_by_local_id(
        &self,
        local_id: &str,
    ) -> Result<RetrievedAsset, PhoneError> {
        self.call("retrieve_asset_by_local_id", json!([local_id]))
            .await
    }

    async fn delete_assets_by_metadata(
        &self,
        proofs: &[DeletionProof],
        ignore_integrity: bool,
    ) -> Result<(), PhoneError> {
        let _: serde_json::Value = self
            .call(
                "delete_assets_by_metadata",
                json!([proofs, ignore_integrity]),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let phone = HttpPhone::new("http://10.0.0.7:1338/").unwrap();
        assert_eq!(phone.endpoint, "http://10.0.0.7:1338/rpc");
        let phone = HttpPhone::new("http://10.0.0.7:1338").unwrap();
        assert_eq!(phone.endpoint, "http://10.0.0.7:1338/rpc");
    }

    #[test]
    fn test_request_envelope_shape() {
        let req = RpcRequest {
            method: "retrieve_asset_by_local_id",
            params: json!(["A1"]),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["method"], "retrieve_asset_by_local_id");
        assert_eq!(v["params"][0], "A1");
    }

    #[test]
    fn test_response_envelope_decodes_both_arms() {
        let ok: RpcResponse = serde_json::from_str(r#"{"result": [1, 2]}"#).unwrap();
        assert!(ok.error.is_none());
        assert_eq!(ok.result.unwrap()[1], 2);

        let err: RpcResponse =
            serde_json::from_str(r#"{"error": {"code": "unknown_asset", "message": "X"}}"#)
                .unwrap();
        assert_eq!(err.error.unwrap().code, "unknown_asset");
    }
}
