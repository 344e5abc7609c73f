//! Run options and pacing profiles.

use std::path::PathBuf;
use std::time::Duration;

/// Delay bounds applied around steps and while typing. Pacing exists to look
/// human to the portal's anti-automation heuristics; it has no effect on
/// correctness.
#[derive(Debug, Clone)]
pub struct Pacing {
    pub pre_step_min: Duration,
    pub pre_step_max: Duration,
    /// Pause between typed characters when filling a field.
    pub char_delay: Duration,
    /// Settle wait after a successful step.
    pub post_settle: Duration,
}

impl Pacing {
    /// The deliberate profile: slow typing, generous settles.
    pub fn careful() -> Self {
        Self {
            pre_step_min: Duration::from_millis(500),
            pre_step_max: Duration::from_millis(1500),
            char_delay: Duration::from_millis(50),
            post_settle: Duration::from_millis(2000),
        }
    }

    /// The fast profile, for sites that tolerate it.
    pub fn quick() -> Self {
        Self {
            pre_step_min: Duration::from_millis(100),
            pre_step_max: Duration::from_millis(300),
            char_delay: Duration::ZERO,
            post_settle: Duration::from_millis(500),
        }
    }

    /// No delays at all. Only sensible against a scripted backend.
    pub fn none() -> Self {
        Self {
            pre_step_min: Duration::ZERO,
            pre_step_max: Duration::ZERO,
            char_delay: Duration::ZERO,
            post_settle: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::careful()
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Where logs and captures land. Created if absent.
    pub output_dir: PathBuf,
    pub pacing: Pacing,
    /// Bounded visibility wait applied to each strategy in turn.
    pub strategy_timeout: Duration,
    /// Run the second pass over received receipts after the primary branch.
    pub include_received: bool,
    /// Informational budget for the whole run; overrunning it is logged, not
    /// enforced.
    pub soft_budget: Duration,
}

impl RunOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            pacing: Pacing::default(),
            strategy_timeout: Duration::from_secs(3),
            include_received: true,
            soft_budget: Duration::from_secs(300),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_strategy_timeout(mut self, timeout: Duration) -> Self {
        self.strategy_timeout = timeout;
        self
    }

    pub fn without_received(mut self) -> Self {
        self.include_received = false;
        self
    }
}
