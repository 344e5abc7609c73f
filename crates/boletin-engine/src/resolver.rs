//! Cascading element resolution.
//!
//! Strategies are tried strictly in order. Each gets a bounded visibility
//! poll; a backend error during a probe counts as "not found with this
//! strategy" and resolution moves on. A later strategy is never retried once
//! an earlier one has been abandoned.

use crate::backend::Backend;
use boletin_core::credentials::Credentials;
use boletin_core::error::WorkflowError;
use boletin_core::strategy::{FieldValue, Locator, ResolutionStrategy, StepAction};
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of a successful resolution: which strategy matched.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub strategy_index: usize,
    pub strategy: ResolutionStrategy,
}

pub struct ElementResolver;

impl ElementResolver {
    /// Find the first strategy whose locator is currently visible. Pure
    /// query, no side effects.
    pub async fn resolve<B: Backend + ?Sized>(
        backend: &mut B,
        description: &str,
        strategies: &[ResolutionStrategy],
        per_strategy_timeout: Duration,
    ) -> Result<Resolved, WorkflowError> {
        for (strategy_index, strategy) in strategies.iter().enumerate() {
            if Self::poll_visible(backend, &strategy.locator, per_strategy_timeout).await {
                debug!(
                    target = description,
                    strategy = strategy_index,
                    locator = %strategy.locator,
                    "resolved"
                );
                return Ok(Resolved {
                    strategy_index,
                    strategy: strategy.clone(),
                });
            }
        }
        Err(WorkflowError::ElementNotFound {
            description: description.to_string(),
            strategies_tried: strategies.iter().map(|s| s.locator.to_string()).collect(),
        })
    }

    /// Resolve, then immediately perform the matched strategy's declared
    /// action.
    pub async fn resolve_and_act<B: Backend + ?Sized>(
        backend: &mut B,
        description: &str,
        strategies: &[ResolutionStrategy],
        per_strategy_timeout: Duration,
        credentials: &Credentials,
        char_delay: Duration,
    ) -> Result<Resolved, WorkflowError> {
        let resolved =
            Self::resolve(backend, description, strategies, per_strategy_timeout).await?;
        let locator = &resolved.strategy.locator;
        match &resolved.strategy.action {
            StepAction::Click => backend.click(locator).await?,
            StepAction::Hover => backend.hover(locator).await?,
            StepAction::HoverThenClick => {
                backend.hover(locator).await?;
                backend.click(locator).await?;
            }
            StepAction::Fill(value) => {
                let text = match value {
                    FieldValue::Identity => credentials.rut(),
                    FieldValue::Secret => credentials.clave(),
                    FieldValue::Literal(text) => text.as_str(),
                };
                backend.fill(locator, text, char_delay).await?;
            }
            StepAction::WaitVisible => {}
        }
        Ok(resolved)
    }

    async fn poll_visible<B: Backend + ?Sized>(
        backend: &mut B,
        locator: &Locator,
        timeout: Duration,
    ) -> bool {
        let interval =
            (timeout / 4).clamp(Duration::from_millis(10), Duration::from_millis(250));
        let start = Instant::now();
        loop {
            match backend.is_visible(locator).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    // Probe errors count as a miss for this strategy only.
                    debug!(locator = %locator, error = %e, "visibility probe failed");
                    return false;
                }
            }
            if start.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(interval).await;
        }
    }
}
