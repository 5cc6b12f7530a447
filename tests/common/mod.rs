//! In-memory phone fixture.
//!
//! Holds assets with their raw bytes and a collection set, answers the four
//! RPC operations the way the real on-device process does: size and digest
//! are computed fresh on every retrieval, and deletion goes through the
//! acceptance check before touching the library.

use std::sync::Mutex;

use async_trait::async_trait;

use photopull::archive::md5_hex;
use photopull::phone::acceptance::{self, LiveLibrary};
use photopull::phone::{Phone, PhoneError};
use photopull::types::{
    Asset, AssetCollection, CollectionSet, DeletionProof, MediaType, RetrievedAsset,
};

struct Library {
    assets: Vec<(Asset, Vec<u8>)>,
    collections: CollectionSet,
}

impl LiveLibrary for Library {
    fn live_asset(&self, local_id: &str) -> Option<Asset> {
        self.assets
            .iter()
            .find(|(a, _)| a.local_id == local_id)
            .map(|(a, _)| a.clone())
    }
}

pub struct MemoryPhone {
    inner: Mutex<Library>,
    /// When set, responses to `retrieve_asset_by_local_id` carry only this
    /// many data bytes while still asserting the full size and digest —
    /// simulates a truncated transfer.
    truncate_data_to: Mutex<Option<usize>>,
}

impl MemoryPhone {
    pub fn new(assets: Vec<(Asset, Vec<u8>)>, collections: CollectionSet) -> Self {
        Self {
            inner: Mutex::new(Library {
                assets,
                collections,
            }),
            truncate_data_to: Mutex::new(None),
        }
    }

    pub fn truncate_retrievals_to(&self, bytes: usize) {
        *self.truncate_data_to.lock().unwrap() = Some(bytes);
    }

    pub fn stop_truncating(&self) {
        *self.truncate_data_to.lock().unwrap() = None;
    }

    pub fn remaining_local_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .assets
            .iter()
            .map(|(a, _)| a.local_id.clone())
            .collect()
    }

    pub fn touch(&self, local_id: &str, new_modification_date: i64) {
        let mut inner = self.inner.lock().unwrap();
        let (asset, _) = inner
            .assets
            .iter_mut()
            .find(|(a, _)| a.local_id == local_id)
            .expect("asset exists");
        asset.modification_date = Some(new_modification_date);
    }
}

#[async_trait]
impl Phone for MemoryPhone {
    async fn get_all_metadata(&self) -> Result<Vec<Asset>, PhoneError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .assets
            .iter()
            .map(|(a, _)| a.clone())
            .collect())
    }

    async fn get_asset_collections(&self) -> Result<CollectionSet, PhoneError> {
        Ok(self.inner.lock().unwrap().collections.clone())
    }

    async fn retrieve_asset_by_local_id(
        &self,
        local_id: &str,
    ) -> Result<RetrievedAsset, PhoneError> {
        let inner = self.inner.lock().unwrap();
        let (asset, data) = inner
            .assets
            .iter()
            .find(|(a, _)| a.local_id == local_id)
            .ok_or_else(|| PhoneError::UnknownAsset(local_id.to_string()))?;

        // The phone's own assertion: computed from the full bytes, even when
        // the transfer is then truncated.
        let filesize = data.len() as u64;
        let md5 = md5_hex(data);
        let sent = match *self.truncate_data_to.lock().unwrap() {
            Some(n) if n < data.len() => data[..n].to_vec(),
            _ => data.clone(),
        };
        Ok(RetrievedAsset {
            asset: asset.clone(),
            filesize,
            md5,
            data: sent,
        })
    }

    async fn delete_assets_by_metadata(
        &self,
        proofs: &[DeletionProof],
        ignore_integrity: bool,
    ) -> Result<(), PhoneError> {
        let mut inner = self.inner.lock().unwrap();
        let accepted = acceptance::verify_batch(&*inner, proofs, ignore_integrity)
            .map_err(|e| PhoneError::IntegrityRejected(e.to_string()))?;
        inner
            .assets
            .retain(|(a, _)| !accepted.contains(&a.local_id));
        Ok(())
    }
}

pub fn image_asset(local_id: &str, modified: i64) -> Asset {
    Asset {
        local_id: local_id.to_string(),
        media_type: MediaType::Image,
        pixel_width: 4032,
        pixel_height: 3024,
        media_subtypes: vec![],
        creation_date: Some(modified),
        modification_date: Some(modified),
        hidden: false,
        favorite: false,
        duration: 0.0,
        location: None,
        filename: format!("{local_id}.JPG"),
    }
}

pub fn manual_album(title: &str, members: Vec<Asset>) -> AssetCollection {
    AssetCollection {
        local_id: format!("album-{title}"),
        title: Some(title.to_string()),
        kind: "album".to_string(),
        subtype: "regular".to_string(),
        start_date: None,
        end_date: None,
        assets: members,
    }
}
