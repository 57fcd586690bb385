//! # Credit Dossier
//!
//! A library for classifying and validating credit application documents:
//! financial statements, projected cashflows, accountant reports and
//! agricultural declarations, with cross-document consistency checks over the
//! whole submission set.
//!
//! ## Core Concepts
//!
//! - **Classification**: an ordered keyword table assigns each upload one of
//!   a closed set of document types; fuzzy sub-decisions (assurance tiers,
//!   opinion presence, figures) are delegated to a pluggable classification
//!   oracle, typically LLM-backed.
//! - **Validation**: one decision tree per document type, pure over the
//!   normalized content, the extracted facts, the organizational context and
//!   the current document set. Failures are business outcomes returned as
//!   invalid documents with explainable messages, not errors.
//! - **Consistency**: year agreement across balance and registry documents,
//!   debt-tier to report-tier mapping, projection-horizon coverage, and a
//!   per-company balance quota.
//! - **Identity-keyed store**: at most one valid document per
//!   `(type, category[, year])` key; a newer valid submission supersedes the
//!   previous one, and the latest rejection stays queryable until a valid
//!   document lands.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use credit_dossier::*;
//!
//! let blobs = Arc::new(InMemoryBlobStore::new());
//! let pipeline = DossierPipeline::new(blobs.clone(), blobs, Arc::new(NullOracle));
//!
//! pipeline.set_context(&ContextUpdate {
//!     company_category: Some(CompanyCategory::Agricultural),
//!     max_debt_amount: Some(1_200_000.0),
//!     max_debt_term_years: Some(5),
//! });
//!
//! let outcome = pipeline
//!     .upload_and_validate(b"registro dicose 2024 ...", "dicose-2024.txt")
//!     .await?;
//! println!("{}: accepted={}", outcome.document.name, outcome.accepted);
//! ```

pub mod blob;
pub mod classifier;
pub mod consistency;
pub mod content;
pub mod error;
pub mod facts;
pub mod integrity;
pub mod oracle;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod validators;

#[cfg(feature = "gemini")]
pub mod llm;

pub use blob::{BlobStorage, ContentFetcher, InMemoryBlobStore};
pub use classifier::classify;
pub use consistency::{plan_upsert, year_consistency, UpsertDecision, YearConsistency};
pub use content::{ExtractedContent, FileKind, SUPPORTED_EXTENSIONS};
pub use error::{DossierError, Result};
pub use facts::{extract_year, YearMode};
pub use integrity::{AlwaysPass, IntegrityPolicy, RandomRejection};
pub use oracle::{
    ClassificationOracle, Confidence, DebtContext, DualOpinions, EquationFindings, NullOracle,
    OpinionPresence, ProjectionCoverage, ReportTier,
};
pub use pipeline::{DossierPipeline, ValidationOutcome};
pub use schema::{
    CompanyCategory, ContextUpdate, Document, DocumentType, IdentityKey, OrganizationalContext,
};
pub use store::{DocumentStore, StoreOutcome};
pub use validators::Verdict;
