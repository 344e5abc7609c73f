//! Single-step execution.
//!
//! The executor wraps every step body with pacing delays, timeout
//! enforcement, a best-effort diagnostic capture on failure, and conversion
//! of every error into a `StepResult`. No failure crosses its boundary as an
//! `Err`, which lets the engine apply the required/optional policy without
//! exception-style control flow.

use crate::artifacts::ArtifactWriter;
use crate::backend::Backend;
use crate::options::Pacing;
use crate::plan::{Branch, StepBody, WorkflowStep};
use crate::resolver::ElementResolver;
use crate::workflow::RunContext;
use boletin_core::artifact;
use boletin_core::credentials::Credentials;
use boletin_core::error::WorkflowError;
use boletin_core::step::StepResult;
use boletin_core::strategy::ResolutionStrategy;
use boletin_core::table;
use chrono::Local;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::info;

enum BodyOutcome {
    Done { strategy_index: Option<usize> },
    Skipped(String),
}

pub struct StepExecutor {
    pacing: Pacing,
    strategy_timeout: Duration,
}

impl StepExecutor {
    pub fn new(pacing: Pacing, strategy_timeout: Duration) -> Self {
        Self {
            pacing,
            strategy_timeout,
        }
    }

    /// Run one step to a `StepResult`. Mutates `ctx`: appends the result and
    /// refreshes the last-known URL.
    pub async fn execute<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        step: &WorkflowStep,
        ctx: &mut RunContext,
        credentials: &Credentials,
    ) -> StepResult {
        let started = Instant::now();
        self.settle_before().await;
        ctx.log(&format!(
            "[step {}] {}",
            step.descriptor.ordinal, step.descriptor.name
        ));

        let body = tokio::time::timeout(
            step.descriptor.timeout,
            self.run_body(backend, step, ctx, credentials),
        )
        .await;

        let result = match body {
            Ok(Ok(BodyOutcome::Done { strategy_index })) => {
                info!(step = %step.descriptor.name, "step succeeded");
                StepResult::success(&step.descriptor, strategy_index, started.elapsed())
            }
            Ok(Ok(BodyOutcome::Skipped(reason))) => {
                ctx.log(&format!("Skipped: {}", reason));
                StepResult::skipped(&step.descriptor, started.elapsed(), reason)
            }
            Ok(Err(e)) => {
                ctx.log_error(&format!("Step '{}' failed: {}", step.descriptor.name, e));
                ArtifactWriter::write_debug(backend, ctx, &step.descriptor.name).await;
                StepResult::failure(&step.descriptor, started.elapsed(), e.to_string())
            }
            Err(_) => {
                let e = WorkflowError::StepTimeout(step.descriptor.timeout);
                ctx.log_error(&format!("Step '{}' failed: {}", step.descriptor.name, e));
                ArtifactWriter::write_debug(backend, ctx, &step.descriptor.name).await;
                StepResult::failure(&step.descriptor, started.elapsed(), e.to_string())
            }
        };

        if result.is_success() && !self.pacing.post_settle.is_zero() {
            tokio::time::sleep(self.pacing.post_settle).await;
        }
        if let Ok(url) = backend.current_url().await {
            ctx.current_url = Some(url);
        }
        ctx.record(result.clone());
        result
    }

    async fn run_body<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        step: &WorkflowStep,
        ctx: &mut RunContext,
        credentials: &Credentials,
    ) -> Result<BodyOutcome, WorkflowError> {
        match &step.body {
            StepBody::Navigate { url } => {
                let nav = backend.navigate(url).await?;
                ctx.log(&format!("Page loaded: {}", nav.url));
                Ok(BodyOutcome::Done {
                    strategy_index: None,
                })
            }

            StepBody::Act => {
                let resolved = ElementResolver::resolve_and_act(
                    backend,
                    &step.descriptor.name,
                    &step.descriptor.strategies,
                    self.strategy_timeout,
                    credentials,
                    self.pacing.char_delay,
                )
                .await?;
                Ok(BodyOutcome::Done {
                    strategy_index: Some(resolved.strategy_index),
                })
            }

            StepBody::ActThenNavigation { nav_timeout } => {
                let resolved = ElementResolver::resolve_and_act(
                    backend,
                    &step.descriptor.name,
                    &step.descriptor.strategies,
                    self.strategy_timeout,
                    credentials,
                    self.pacing.char_delay,
                )
                .await?;
                backend
                    .wait_for_navigation(*nav_timeout)
                    .await
                    .map_err(|e| WorkflowError::NavigationTimeout(e.to_string()))?;
                Ok(BodyOutcome::Done {
                    strategy_index: Some(resolved.strategy_index),
                })
            }

            StepBody::ConfirmLogin {
                landmark,
                nav_timeout,
                landmark_timeout,
            } => {
                if backend.wait_for_navigation(*nav_timeout).await.is_ok() {
                    ctx.log("Login confirmed: navigation detected");
                    return Ok(BodyOutcome::Done {
                        strategy_index: None,
                    });
                }
                // The portal sometimes swaps the DOM in place after submit.
                let strategies = [ResolutionStrategy::wait(landmark.clone())];
                match ElementResolver::resolve(
                    backend,
                    "post-login landmark",
                    &strategies,
                    *landmark_timeout,
                )
                .await
                {
                    Ok(_) => {
                        ctx.log("Login confirmed: post-login landmark present");
                        Ok(BodyOutcome::Done {
                            strategy_index: None,
                        })
                    }
                    Err(_) => Err(WorkflowError::AuthenticationFailed(
                        "neither navigation nor post-login landmark observed after submit".into(),
                    )),
                }
            }

            StepBody::ExtractTable { table, branch } => {
                let cells = backend
                    .table_text(table)
                    .await
                    .map_err(|e| WorkflowError::Extraction(e.to_string()))?;
                let analysis = table::analyze(&cells);
                ctx.log(&format!(
                    "Table analyzed: {} month rows",
                    analysis.analyzed_count
                ));
                for row in &analysis.rows {
                    let status = if row.is_zero { "[CERO]" } else { "[TIENE VALOR]" };
                    ctx.log(&format!(
                        "  {}: {} raw \"{}\" -> \"{}\"",
                        row.month, status, row.raw, row.normalized
                    ));
                }
                *ctx.analysis_mut(*branch) = Some(analysis);
                Ok(BodyOutcome::Done {
                    strategy_index: None,
                })
            }

            StepBody::CaptureZeroEvidence { branch } => {
                let analysis = ctx
                    .analysis_mut(*branch)
                    .clone()
                    .ok_or_else(|| WorkflowError::Extraction("no table analysis available".into()))?;
                if !analysis.all_zero {
                    let with_value = analysis.rows.iter().filter(|r| !r.is_zero).count();
                    return Ok(BodyOutcome::Skipped(format!(
                        "{} of {} months carry non-zero totals",
                        with_value, analysis.analyzed_count
                    )));
                }
                let now = Local::now().naive_local();
                let filename = match branch {
                    Branch::Emitted => artifact::zero_capture_filename(&ctx.identity, now),
                    Branch::Received => artifact::received_capture_filename(now),
                };
                let record =
                    ArtifactWriter::write_screenshot(backend, ctx, &filename, "all totals zero")
                        .await;
                match record.error {
                    None => Ok(BodyOutcome::Done {
                        strategy_index: None,
                    }),
                    Some(e) => Err(WorkflowError::ArtifactWrite(e)),
                }
            }

            StepBody::SaveReportPdf => {
                // A print control opening the printable view is preferred,
                // but the page render fallback always runs.
                let control = ElementResolver::resolve_and_act(
                    backend,
                    &step.descriptor.name,
                    &step.descriptor.strategies,
                    self.strategy_timeout,
                    credentials,
                    self.pacing.char_delay,
                )
                .await
                .ok();
                if control.is_some() && !self.pacing.post_settle.is_zero() {
                    tokio::time::sleep(self.pacing.post_settle).await;
                }
                let filename = artifact::report_pdf_filename(Local::now().naive_local());
                let record =
                    ArtifactWriter::write_pdf(backend, ctx, &filename, "annual report").await;
                match record.error {
                    None => Ok(BodyOutcome::Done {
                        strategy_index: control.map(|r| r.strategy_index),
                    }),
                    Some(e) => Err(WorkflowError::ArtifactWrite(e)),
                }
            }
        }
    }

    async fn settle_before(&self) {
        let min = self.pacing.pre_step_min.as_millis() as u64;
        let max = self.pacing.pre_step_max.as_millis() as u64;
        if max == 0 {
            return;
        }
        let ms = if min >= max {
            max
        } else {
            rand::rng().random_range(min..=max)
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
