//! Step descriptors and recorded outcomes.

use crate::strategy::ResolutionStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static configuration for one workflow step. Authored once in the plan,
/// read-only at run time.
#[derive(Debug, Clone)]
pub struct StepDescriptor {
    pub name: String,
    pub ordinal: usize,
    pub strategies: Vec<ResolutionStrategy>,
    pub timeout: Duration,
    /// A required step's failure halts the engine; an optional step's failure
    /// only logs and continues.
    pub required: bool,
}

impl StepDescriptor {
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
            strategies: Vec::new(),
            timeout: Duration::from_secs(30),
            required: true,
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<ResolutionStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Success,
    Failure,
    /// The step's precondition did not hold (e.g. no all-zero table), so it
    /// was not attempted. Not a failure.
    Skipped,
}

/// Immutable record of one executed step, appended to the run context in
/// strictly increasing ordinal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: String,
    pub ordinal: usize,
    pub outcome: StepOutcome,
    /// Index of the strategy that succeeded, when the step resolved an
    /// element.
    pub strategy_index: Option<usize>,
    pub duration: Duration,
    pub error: Option<String>,
}

impl StepResult {
    pub fn success(step: &StepDescriptor, strategy_index: Option<usize>, duration: Duration) -> Self {
        Self {
            step: step.name.clone(),
            ordinal: step.ordinal,
            outcome: StepOutcome::Success,
            strategy_index,
            duration,
            error: None,
        }
    }

    pub fn failure(step: &StepDescriptor, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            step: step.name.clone(),
            ordinal: step.ordinal,
            outcome: StepOutcome::Failure,
            strategy_index: None,
            duration,
            error: Some(error.into()),
        }
    }

    pub fn skipped(step: &StepDescriptor, duration: Duration, reason: impl Into<String>) -> Self {
        Self {
            step: step.name.clone(),
            ordinal: step.ordinal,
            outcome: StepOutcome::Skipped,
            strategy_index: None,
            duration,
            error: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == StepOutcome::Success
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == StepOutcome::Failure
    }
}
