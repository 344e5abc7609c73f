//! Error taxonomy for the workflow engine and the backend capability layer.

use thiserror::Error;

/// Failures of the browser capability layer.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend not ready")]
    NotReady,

    #[error("Not supported by this backend: {0}")]
    NotSupported(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Script evaluation error: {0}")]
    Evaluation(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Session closed")]
    Closed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Workflow-level failures. The step executor converts every one of these
/// into a `StepResult`; none of them crosses its boundary as an `Err`.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Element not found: {description} (strategies tried: {})", strategies_tried.join(", "))]
    ElementNotFound {
        description: String,
        strategies_tried: Vec<String>,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Navigation did not settle: {0}")]
    NavigationTimeout(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Artifact write error: {0}")]
    ArtifactWrite(String),

    #[error("Step timed out after {0:?}")]
    StepTimeout(std::time::Duration),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
