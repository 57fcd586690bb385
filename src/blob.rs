use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DossierError, Result};

/// Where uploaded bytes live. The pipeline only ever sees opaque locators.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn store(&self, bytes: &[u8], name: &str) -> Result<String>;

    async fn delete(&self, locator: &str) -> Result<()>;
}

/// Retrieves previously stored bytes. Transient failures are expected; the
/// pipeline wraps calls in a bounded retry.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}

/// In-process blob store backing both collaborator traits. Used in tests and
/// in deployments that keep uploads in memory.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStore {
    async fn store(&self, bytes: &[u8], name: &str) -> Result<String> {
        let locator = format!("mem://{}/{}", Uuid::new_v4(), name);
        let mut blobs = self.blobs.lock().expect("blob lock");
        blobs.insert(locator.clone(), bytes.to_vec());
        Ok(locator)
    }

    async fn delete(&self, locator: &str) -> Result<()> {
        let mut blobs = self.blobs.lock().expect("blob lock");
        blobs
            .remove(locator)
            .map(|_| ())
            .ok_or_else(|| DossierError::NotFound(locator.to_string()))
    }
}

#[async_trait]
impl ContentFetcher for InMemoryBlobStore {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let blobs = self.blobs.lock().expect("blob lock");
        blobs
            .get(locator)
            .cloned()
            .ok_or_else(|| DossierError::StorageFailure(format!("unknown locator {locator}")))
    }
}
