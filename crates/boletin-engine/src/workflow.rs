//! Workflow orchestration.
//!
//! The engine executes the ordered SII plan through the step executor. A
//! required step's failure moves the run to `Failed` and stops it; an
//! optional step's failure logs a warning and the run degrades. The
//! received-receipts branch runs only after the emitted branch succeeds and
//! can never revert that success.

use crate::artifacts::{ArtifactWriter, RunLog};
use crate::backend::Backend;
use crate::executor::StepExecutor;
use crate::options::RunOptions;
use crate::plan::{self, Branch, WorkflowStep};
use boletin_core::artifact::{self, ArtifactRecord};
use boletin_core::credentials::Credentials;
use boletin_core::step::StepResult;
use boletin_core::table::TableAnalysis;
use chrono::Local;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Engine states, in the order the primary branch traverses them. `Failed`
/// is terminal and reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Authenticating,
    NavigatingMenu,
    Querying,
    ExtractingTable,
    CapturingArtifact,
    NavigatingAux,
    QueryingAux,
    ExtractingAux,
    CapturingAux,
    Done,
    Failed,
}

/// Progress sink for front ends. Called synchronously on the engine's path
/// after every step result, so implementations must return promptly: hand the
/// update off (channel, atomic, terminal write) rather than doing slow work
/// inline.
pub type ProgressFn<'a> = dyn Fn(usize, usize, &str, bool) + Send + Sync + 'a;

/// Mutable per-run state, owned by exactly one engine invocation.
pub struct RunContext {
    pub output_dir: PathBuf,
    /// Sanitized identity token used in artifact filenames.
    pub identity: String,
    pub exec_log: RunLog,
    pub error_log: RunLog,
    pub current_url: Option<String>,
    pub results: Vec<StepResult>,
    pub artifacts: Vec<ArtifactRecord>,
    emitted_analysis: Option<TableAnalysis>,
    received_analysis: Option<TableAnalysis>,
    started: Instant,
    soft_budget: Duration,
}

impl RunContext {
    pub fn new(options: &RunOptions, credentials: &Credentials) -> std::io::Result<Self> {
        // Idempotent: an existing directory is fine.
        std::fs::create_dir_all(&options.output_dir)?;
        let exec_log = RunLog::create(options.output_dir.join("sii_exec_log.txt"))?;
        let error_log = RunLog::create(options.output_dir.join("sii_error_log.txt"))?;
        Ok(Self {
            output_dir: options.output_dir.clone(),
            identity: credentials.sanitized_identity(),
            exec_log,
            error_log,
            current_url: None,
            results: Vec::new(),
            artifacts: Vec::new(),
            emitted_analysis: None,
            received_analysis: None,
            started: Instant::now(),
            soft_budget: options.soft_budget,
        })
    }

    pub fn log(&self, msg: &str) {
        debug!("{}", msg);
        self.exec_log.append(msg);
    }

    pub fn log_error(&self, msg: &str) {
        warn!("{}", msg);
        self.exec_log.append(msg);
        self.error_log.append(msg);
    }

    pub fn record(&mut self, result: StepResult) {
        debug_assert!(
            self.results
                .last()
                .map(|prev| prev.ordinal < result.ordinal)
                .unwrap_or(true),
            "step results must arrive in increasing ordinal order"
        );
        self.log(&format!(
            "  -> {:?} in {:.1}s",
            result.outcome,
            result.duration.as_secs_f64()
        ));
        self.results.push(result);
    }

    pub fn analysis_mut(&mut self, branch: Branch) -> &mut Option<TableAnalysis> {
        match branch {
            Branch::Emitted => &mut self.emitted_analysis,
            Branch::Received => &mut self.received_analysis,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn over_soft_budget(&self) -> bool {
        self.elapsed() > self.soft_budget
    }
}

/// Outcome surfaced to front ends: a summary flag, the artifact trail, and
/// every step's recorded result.
#[derive(Debug)]
pub struct RunReport {
    pub success: bool,
    pub artifacts: Vec<ArtifactRecord>,
    pub error: Option<String>,
    pub results: Vec<StepResult>,
    pub terminal_phase: Phase,
    pub output_dir: PathBuf,
}

pub struct WorkflowEngine {
    options: RunOptions,
}

impl WorkflowEngine {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub async fn run<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        credentials: &Credentials,
        progress: Option<&ProgressFn<'_>>,
    ) -> RunReport {
        if !backend.is_ready().await {
            return RunReport {
                success: false,
                artifacts: Vec::new(),
                error: Some("backend is not ready; launch it before running".to_string()),
                results: Vec::new(),
                terminal_phase: Phase::Failed,
                output_dir: self.options.output_dir.clone(),
            };
        }

        let mut ctx = match RunContext::new(&self.options, credentials) {
            Ok(ctx) => ctx,
            Err(e) => {
                return RunReport {
                    success: false,
                    artifacts: Vec::new(),
                    error: Some(format!("could not prepare output directory: {}", e)),
                    results: Vec::new(),
                    terminal_phase: Phase::Failed,
                    output_dir: self.options.output_dir.clone(),
                };
            }
        };

        let emitted = plan::emitted_plan();
        let received = if self.options.include_received {
            plan::received_plan(emitted.len())
        } else {
            Vec::new()
        };
        let total = emitted.len() + received.len();
        let executor = StepExecutor::new(self.options.pacing.clone(), self.options.strategy_timeout);

        ctx.log(&format!(
            "Run started for {} ({} steps)",
            ctx.identity, total
        ));

        let mut phase = Phase::Idle;
        let mut error = None;

        for step in &emitted {
            Self::enter(&mut phase, step, &ctx);
            let result = executor.execute(backend, step, &mut ctx, credentials).await;
            Self::notify(progress, &result, total, step);
            if result.is_failure() {
                if step.descriptor.required {
                    error = result.error.clone();
                    phase = Phase::Failed;
                    break;
                }
                warn!(step = %step.descriptor.name, "optional step failed, continuing");
                ctx.log(&format!(
                    "Warning: optional step '{}' failed, continuing",
                    step.descriptor.name
                ));
            }
            self.check_soft_budget(&ctx);
        }

        if phase != Phase::Failed {
            for step in &received {
                Self::enter(&mut phase, step, &ctx);
                let result = executor.execute(backend, step, &mut ctx, credentials).await;
                Self::notify(progress, &result, total, step);
                // Failures here abort the branch but never the run.
                if result.is_failure() && step.descriptor.required {
                    ctx.log("Received-receipts branch aborted; emitted results stand");
                    break;
                }
                self.check_soft_budget(&ctx);
            }
        }

        if phase != Phase::Failed {
            phase = Phase::Done;
            // Durable end-of-run record, independent of per-step captures.
            let filename = artifact::final_capture_filename(Local::now().naive_local());
            ArtifactWriter::write_screenshot(backend, &mut ctx, &filename, "end of run record")
                .await;
        }

        ctx.log(&format!(
            "Run finished: {:?} after {:.1}s",
            phase,
            ctx.elapsed().as_secs_f64()
        ));

        RunReport {
            success: phase == Phase::Done,
            artifacts: ctx.artifacts,
            error,
            results: ctx.results,
            terminal_phase: phase,
            output_dir: self.options.output_dir.clone(),
        }
    }

    fn enter(phase: &mut Phase, step: &WorkflowStep, ctx: &RunContext) {
        if *phase != step.phase {
            debug!(from = ?*phase, to = ?step.phase, "phase transition");
            ctx.log(&format!("Phase: {:?}", step.phase));
            *phase = step.phase;
        }
    }

    fn notify(
        progress: Option<&ProgressFn<'_>>,
        result: &StepResult,
        total: usize,
        step: &WorkflowStep,
    ) {
        if let Some(progress) = progress {
            progress(
                result.ordinal,
                total,
                &step.descriptor.name,
                result.is_success(),
            );
        }
    }

    fn check_soft_budget(&self, ctx: &RunContext) {
        if ctx.over_soft_budget() {
            ctx.log(&format!(
                "Soft time budget exceeded ({:.0}s elapsed); continuing",
                ctx.elapsed().as_secs_f64()
            ));
        }
    }
}

/// Run the whole workflow against an already-launched backend.
pub async fn run_workflow<B: Backend + ?Sized>(
    backend: &mut B,
    credentials: &Credentials,
    options: RunOptions,
    progress: Option<&ProgressFn<'_>>,
) -> RunReport {
    WorkflowEngine::new(options).run(backend, credentials, progress).await
}
