use thiserror::Error;

use crate::answers::ResponseDocument;
use crate::spec::Assessment;

/// Transient collaborator failure. The caller's in-memory state is never
/// discarded on such a failure, so the operation can be retried without
/// re-entering data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("document encoding failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Persistence and submission collaborators the engine depends on. The
/// engine performs no other I/O.
pub trait AssessmentStore {
    /// Fetches the persisted document for a job. Absence is a valid,
    /// expected outcome for a never-authored assessment, not an error.
    fn load_assessment(&self, job_id: &str) -> Result<Option<Assessment>, StoreError>;

    /// Persists a full document, replacing any previous version.
    fn save_assessment(&self, job_id: &str, assessment: &Assessment) -> Result<(), StoreError>;

    /// Accepts a filled-out response for a job.
    fn submit_response(&self, job_id: &str, response: &ResponseDocument) -> Result<(), StoreError>;
}
