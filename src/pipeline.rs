use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{Datelike, Utc};
use log::{info, warn};
use tokio::time::sleep;
use uuid::Uuid;

use crate::blob::{BlobStorage, ContentFetcher};
use crate::classifier;
use crate::consistency::quota_exceeded_message;
use crate::content::{self, ExtractedContent, Extraction, FileKind};
use crate::error::{DossierError, Result};
use crate::facts::{self, YearMode};
use crate::integrity::{self, IntegrityPolicy, RandomRejection};
use crate::oracle::ClassificationOracle;
use crate::schema::{
    CompanyCategory, ContextUpdate, Document, DocumentType, IdentityKey, OrganizationalContext,
};
use crate::store::{DocumentStore, StoreOutcome};
use crate::validators::{self, ValidationInput, Verdict};

const FETCH_RETRY_ATTEMPTS: u32 = 3;
const FETCH_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// What a validation attempt produced. The document is returned whether it
/// was accepted or not; no attempt is silently dropped.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub accepted: bool,
    pub document: Document,
}

/// The classification-and-validation pipeline, wired to its collaborators.
///
/// Validation and upsert are serialized per identity key: concurrent
/// submissions for the same key cannot interleave, while oracle calls for
/// independent documents still run concurrently. Year-consistency checks read
/// a snapshot of the store, so cross-key races are possible under concurrent
/// writes of different types; each upsert itself is atomic.
pub struct DossierPipeline {
    blob: Arc<dyn BlobStorage>,
    fetcher: Arc<dyn ContentFetcher>,
    oracle: Arc<dyn ClassificationOracle>,
    integrity: Arc<dyn IntegrityPolicy>,
    store: DocumentStore,
    context: RwLock<OrganizationalContext>,
    key_locks: Mutex<HashMap<IdentityKey, Arc<tokio::sync::Mutex<()>>>>,
    reference_year: i32,
}

impl DossierPipeline {
    pub fn new(
        blob: Arc<dyn BlobStorage>,
        fetcher: Arc<dyn ContentFetcher>,
        oracle: Arc<dyn ClassificationOracle>,
    ) -> Self {
        Self {
            blob,
            fetcher,
            oracle,
            integrity: Arc::new(RandomRejection::new()),
            store: DocumentStore::new(),
            context: RwLock::new(OrganizationalContext::default()),
            key_locks: Mutex::new(HashMap::new()),
            reference_year: Utc::now().year(),
        }
    }

    /// Replace the binary structural-integrity policy (tests inject an
    /// always-pass policy to stay deterministic).
    pub fn with_integrity_policy(mut self, policy: Arc<dyn IntegrityPolicy>) -> Self {
        self.integrity = policy;
        self
    }

    /// Pin the year used for year-window and coverage calculations.
    pub fn with_reference_year(mut self, reference_year: i32) -> Self {
        self.reference_year = reference_year;
        self
    }

    /// Store the bytes with the blob collaborator, then validate them.
    pub async fn upload_and_validate(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<ValidationOutcome> {
        let locator = self.blob.store(bytes, filename).await?;
        self.validate(&locator, filename).await
    }

    /// Validate previously stored bytes: fetch, normalize, classify, run the
    /// type validator, gate binary integrity, then apply the keyed upsert
    /// policy. Structural and classification failures come back as invalid
    /// documents; only infrastructure failures surface as errors.
    pub async fn validate(&self, locator: &str, filename: &str) -> Result<ValidationOutcome> {
        let bytes = self.fetch_with_retry(locator).await?;
        let context = self.get_context();

        let content = match content::extract(&bytes, filename) {
            Extraction::Supported(content) => content,
            Extraction::Unsupported { extension } => {
                info!("rejecting {filename}: unsupported extension {extension:?}");
                let document = self.build_document(
                    locator,
                    filename,
                    DocumentType::Unrecognized,
                    None,
                    &context,
                    Verdict::invalid(content::unsupported_format_message()),
                );
                self.store.upsert(document.clone());
                return Ok(ValidationOutcome {
                    accepted: false,
                    document,
                });
            }
        };

        let document_type = classifier::classify(&content.text, filename);
        let year_mode = match document_type {
            DocumentType::FlujoDeFondos => YearMode::Projection,
            _ => YearMode::Historical,
        };
        let document_year =
            facts::extract_year(&content.text, filename, year_mode, self.reference_year);

        let key = IdentityKey::derive(document_type, context.company_category, document_year);
        let key_lock = self.key_lock(key);
        let _guard = key_lock.lock().await;

        let existing = self.store.valid_documents();
        let input = ValidationInput {
            content: &content,
            document_year,
            context: &context,
            existing: &existing,
            reference_year: self.reference_year,
        };
        let mut verdict = validators::run(document_type, &input, self.oracle.as_ref()).await;
        verdict = self.gate_binary_integrity(&content, document_type, verdict);

        let mut document = self.build_document(
            locator,
            filename,
            document_type,
            document_year,
            &context,
            verdict,
        );

        if self.store.upsert(document.clone()) == StoreOutcome::QuotaRejected {
            document.is_valid = false;
            document.validation_message = Some(quota_exceeded_message());
            self.store.upsert(document.clone());
        }

        info!(
            "validated {filename} as {} ({}): {}",
            document.document_type.label(),
            if document.is_valid { "valid" } else { "invalid" },
            document
                .validation_message
                .as_deref()
                .unwrap_or("no findings"),
        );

        Ok(ValidationOutcome {
            accepted: document.is_valid,
            document,
        })
    }

    /// Documents visible to the caller, newest first.
    pub fn list_documents(&self) -> Vec<Document> {
        self.store.list()
    }

    /// Remove a document and its stored bytes.
    pub async fn delete_document(&self, id: Uuid) -> Result<()> {
        let removed = self
            .store
            .remove_by_id(id)
            .ok_or_else(|| DossierError::NotFound(id.to_string()))?;
        self.blob.delete(&removed.locator).await?;
        info!("deleted document {} ({})", removed.name, id);
        Ok(())
    }

    pub fn set_context(&self, update: &ContextUpdate) {
        let mut context = self.context.write().expect("context lock");
        context.apply(update);
    }

    pub fn get_context(&self) -> OrganizationalContext {
        self.context.read().expect("context lock").clone()
    }

    pub fn set_company_category(&self, category: Option<CompanyCategory>) {
        let mut context = self.context.write().expect("context lock");
        context.set_company_category(category);
    }

    /// Reset documents and context, for tests and fresh sessions.
    pub fn clear(&self) {
        self.store.clear();
        let mut context = self.context.write().expect("context lock");
        *context = OrganizationalContext::default();
    }

    fn key_lock(&self, key: IdentityKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.key_locks.lock().expect("key lock table");
        locks.entry(key).or_default().clone()
    }

    fn gate_binary_integrity(
        &self,
        content: &ExtractedContent,
        document_type: DocumentType,
        verdict: Verdict,
    ) -> Verdict {
        if verdict.is_valid
            && content.kind == FileKind::BinaryProxy
            && integrity::is_page_description(&content.extension)
            && !self.integrity.passes(&content.extension)
        {
            warn!(
                "integrity gate rejected a {} upload",
                document_type.label()
            );
            return Verdict::invalid(integrity::corruption_message(document_type.label()));
        }
        verdict
    }

    fn build_document(
        &self,
        locator: &str,
        filename: &str,
        document_type: DocumentType,
        document_year: Option<i32>,
        context: &OrganizationalContext,
        verdict: Verdict,
    ) -> Document {
        Document {
            id: Uuid::new_v4(),
            name: filename.to_string(),
            locator: locator.to_string(),
            uploaded_at: Utc::now(),
            is_valid: verdict.is_valid,
            validation_message: verdict.message,
            document_type,
            company_category: context.company_category,
            document_year,
        }
    }

    async fn fetch_with_retry(&self, locator: &str) -> Result<Vec<u8>> {
        let mut last_failure = String::new();

        for attempt in 1..=FETCH_RETRY_ATTEMPTS {
            match self.fetcher.fetch(locator).await {
                Ok(bytes) => return Ok(bytes),
                Err(failure) => {
                    warn!("fetch attempt {attempt}/{FETCH_RETRY_ATTEMPTS} for {locator} failed: {failure}");
                    last_failure = failure.to_string();
                    if attempt < FETCH_RETRY_ATTEMPTS {
                        sleep(FETCH_RETRY_BACKOFF).await;
                    }
                }
            }
        }

        Err(DossierError::TransientFetchFailure {
            attempts: FETCH_RETRY_ATTEMPTS,
            details: last_failure,
        })
    }
}
