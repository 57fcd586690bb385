use thiserror::Error;

/// Infrastructure failures surfaced to the caller.
///
/// Business outcomes (unsupported formats, structural gaps, cross-document
/// conflicts, oracle indeterminacy, quota rejections) are not errors: they are
/// returned as invalid [`Document`](crate::schema::Document) records carrying
/// an explanatory message.
#[derive(Error, Debug)]
pub enum DossierError {
    #[error("Failed to fetch document content after {attempts} attempts: {details}")]
    TransientFetchFailure { attempts: u32, details: String },

    #[error("Blob storage error: {0}")]
    StorageFailure(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Classification service unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DossierError>;
