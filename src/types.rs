//! Canonical asset and collection structures shared by the archive, the sync
//! engine, and the phone RPC boundary.
//!
//! The wire format keeps the phone's field names: transient fields carry a
//! leading underscore (`_filesize`, `_md5`, `_data`) and are never written to
//! a metadata sidecar.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    #[serde(other)]
    Unknown,
}

/// GPS coordinates as reported by the phone, when the asset has any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// One photo or video in the phone's library.
///
/// `local_id` is stable for the life of the asset; `modification_date` is the
/// sole dirtiness signal for incremental sync. Exactly these fields are
/// persisted in the metadata sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub local_id: String,
    pub media_type: MediaType,
    pub pixel_width: u32,
    pub pixel_height: u32,
    #[serde(default)]
    pub media_subtypes: Vec<String>,
    /// Seconds since epoch, integer precision.
    pub creation_date: Option<i64>,
    /// Seconds since epoch, integer precision.
    pub modification_date: Option<i64>,
    pub hidden: bool,
    pub favorite: bool,
    pub duration: f64,
    pub location: Option<Location>,
    pub filename: String,
}

/// An asset plus the transient retrieval fields the phone computes fresh on
/// every `retrieve_asset_by_local_id` call: the raw bytes, their length, and
/// their MD5 digest (lowercase hex). None of these survive past verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedAsset {
    #[serde(flatten)]
    pub asset: Asset,
    #[serde(rename = "_filesize")]
    pub filesize: u64,
    #[serde(rename = "_md5")]
    pub md5: String,
    #[serde(rename = "_data", with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// A deletion proof: the clean asset metadata plus a size and digest freshly
/// recomputed from the bytes on disk. Submitted to the phone to justify
/// deleting the remote asset. Carries no `_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionProof {
    #[serde(flatten)]
    pub asset: Asset,
    #[serde(rename = "_filesize")]
    pub filesize: u64,
    #[serde(rename = "_md5")]
    pub md5: String,
}

/// A named grouping of assets: album, smart album, moment, or one of the
/// system albums. Only user-created albums participate in retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCollection {
    pub local_id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// The full `get_asset_collections` response. The keep-set for pruning is
/// built from `albums` alone; everything else is informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionSet {
    #[serde(default)]
    pub albums: Vec<AssetCollection>,
    #[serde(default)]
    pub smart_albums: Vec<AssetCollection>,
    #[serde(default)]
    pub moments: Vec<AssetCollection>,
    pub favorites_album: Option<AssetCollection>,
    pub recently_added_album: Option<AssetCollection>,
    pub selfies_album: Option<AssetCollection>,
    pub screenshots_album: Option<AssetCollection>,
}

/// Serialize raw asset bytes as a base64 string so they survive the JSON
/// envelope; the phone's RPC layer has no native bytes type.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

impl RetrievedAsset {
    /// Drop the raw bytes, keeping the metadata and the phone's own
    /// size/digest assertion.
    pub fn into_proof(self) -> DeletionProof {
        DeletionProof {
            asset: self.asset,
            filesize: self.filesize,
            md5: self.md5,
        }
    }
}
