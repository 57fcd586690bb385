use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;
use uuid::Uuid;

use crate::consistency::{plan_upsert, UpsertDecision};
use crate::schema::{Document, DocumentType, IdentityKey};

/// How an upsert attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted,
    Replaced,
    /// The new document was invalid while a valid one already held the key;
    /// the store was left untouched.
    KeptExistingValid,
    /// Recorded as the latest rejection for the key (or in the unkeyed log
    /// for unrecognized submissions).
    RejectionRecorded,
    /// A valid Balance beyond the new-company quota; nothing was stored.
    QuotaRejected,
}

#[derive(Default)]
struct StoreInner {
    /// At most one valid document per identity key.
    primary: HashMap<IdentityKey, Document>,
    /// Latest invalid verdict per identity key, cleared when a valid
    /// document lands at the key.
    rejections: HashMap<IdentityKey, Document>,
    /// Unrecognized and unsupported submissions: recorded, never keyed.
    unkeyed: Vec<Document>,
}

/// In-memory document repository with an explicit lifecycle: starts empty,
/// `clear()` resets it for tests. Interior mutability keeps each mutation
/// atomic under concurrent validations.
#[derive(Default)]
pub struct DocumentStore {
    inner: Mutex<StoreInner>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("store lock");
        inner.primary.clear();
        inner.rejections.clear();
        inner.unkeyed.clear();
    }

    /// Currently-valid documents, for cross-document consistency checks.
    pub fn valid_documents(&self) -> Vec<Document> {
        let inner = self.inner.lock().expect("store lock");
        inner.primary.values().cloned().collect()
    }

    /// Everything a caller can see: valid documents, the latest rejection
    /// for keys without a valid entry, and unkeyed rejections. Sorted by
    /// upload time, newest first.
    pub fn list(&self) -> Vec<Document> {
        let inner = self.inner.lock().expect("store lock");
        let mut documents: Vec<Document> = inner
            .primary
            .values()
            .chain(inner.rejections.values())
            .chain(inner.unkeyed.iter())
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        documents
    }

    /// Apply the keyed upsert/replace policy to a freshly validated
    /// document.
    ///
    /// Unrecognized submissions bypass the identity-keyed collections
    /// entirely: they are appended to the unkeyed rejection log.
    pub fn upsert(&self, document: Document) -> StoreOutcome {
        let mut inner = self.inner.lock().expect("store lock");

        if document.document_type == DocumentType::Unrecognized {
            inner.unkeyed.push(document);
            return StoreOutcome::RejectionRecorded;
        }

        let key = document.identity_key();
        let valid_balances = inner
            .primary
            .values()
            .filter(|doc| doc.document_type == DocumentType::Balance)
            .count();
        let existing = inner
            .primary
            .get(&key)
            .or_else(|| inner.rejections.get(&key));

        let decision = plan_upsert(&document, existing, valid_balances);
        debug!(
            "upsert {:?} for {:?}: {:?}",
            decision, key, document.is_valid
        );

        match decision {
            UpsertDecision::Insert => {
                inner.primary.insert(key, document);
                StoreOutcome::Inserted
            }
            UpsertDecision::Replace => {
                if document.is_valid {
                    inner.rejections.remove(&key);
                    inner.primary.insert(key, document);
                } else {
                    inner.rejections.insert(key, document);
                }
                StoreOutcome::Replaced
            }
            UpsertDecision::KeepExisting => StoreOutcome::KeptExistingValid,
            UpsertDecision::RecordRejection => {
                inner.rejections.insert(key, document);
                StoreOutcome::RejectionRecorded
            }
            UpsertDecision::QuotaExceeded => StoreOutcome::QuotaRejected,
        }
    }

    /// Remove a document by id from whichever collection holds it.
    pub fn remove_by_id(&self, id: Uuid) -> Option<Document> {
        let mut inner = self.inner.lock().expect("store lock");

        if let Some(key) = inner
            .primary
            .iter()
            .find(|(_, doc)| doc.id == id)
            .map(|(key, _)| *key)
        {
            return inner.primary.remove(&key);
        }

        if let Some(key) = inner
            .rejections
            .iter()
            .find(|(_, doc)| doc.id == id)
            .map(|(key, _)| *key)
        {
            return inner.rejections.remove(&key);
        }

        if let Some(index) = inner.unkeyed.iter().position(|doc| doc.id == id) {
            return Some(inner.unkeyed.remove(index));
        }

        None
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Document> {
        self.list().into_iter().find(|doc| doc.id == id)
    }
}
