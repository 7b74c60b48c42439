//! Error types shared across bulkdl crates

use thiserror::Error;

/// Result type alias for shared bulkdl operations
pub type Result<T> = std::result::Result<T, BulkdlError>;

#[derive(Error, Debug)]
pub enum BulkdlError {
    #[error("Unknown workflow: '{0}'. Expected one of short-read-mngs, long-read-mngs, consensus-genome, amr, amr-deprecated, benchmark")]
    UnknownWorkflow(String),

    #[error("Unknown workflow entity: '{0}'. Expected 'samples' or 'workflow-runs'")]
    UnknownWorkflowEntity(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
