pub mod artifacts;
pub mod backend;
pub mod executor;
pub mod options;
pub mod plan;
pub mod resolver;
pub mod workflow;

pub use boletin_core::artifact;
pub use boletin_core::credentials::Credentials;
pub use boletin_core::error::{BackendError, WorkflowError};
pub use boletin_core::table;
pub use options::{Pacing, RunOptions};
pub use workflow::{run_workflow, Phase, RunReport, WorkflowEngine};
