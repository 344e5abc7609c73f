pub mod artifact;
pub mod credentials;
pub mod error;
pub mod step;
pub mod strategy;
pub mod table;

pub use artifact::{ArtifactKind, ArtifactRecord};
pub use credentials::Credentials;
pub use error::{BackendError, WorkflowError};
pub use step::{StepDescriptor, StepOutcome, StepResult};
pub use strategy::{FieldValue, Locator, ResolutionStrategy, StepAction};
pub use table::{TableAnalysis, TableRow};
