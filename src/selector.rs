//! Mode selection
//!
//! One pass, no loop: sample the switch, resolve the mode's profile, mark
//! the indicator if the profile asks for it, then hand over to the program
//! and wait for it.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::{
    ChildOutcome, FailurePolicy, IndicatorFile, Launcher, Level, Mode, ModeInput, ModeProfile,
    SelectorConfig,
};

/// Everything a selection will do, resolved without side effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    /// Switch level the plan was resolved from
    pub level: Level,
    pub mode: Mode,
    /// Indicator file to write, when the profile sets a flag
    pub indicator_path: Option<PathBuf>,
    #[serde(flatten)]
    pub profile: ModeProfile,
}

/// Result of a completed selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub mode: Mode,
    pub outcome: ChildOutcome,
}

/// Boot-time mode selector
pub struct ModeSelector<I, L> {
    config: SelectorConfig,
    input: I,
    launcher: L,
}

impl<I: ModeInput, L: Launcher> ModeSelector<I, L> {
    pub fn new(config: SelectorConfig, input: I, launcher: L) -> Self {
        Self {
            config,
            input,
            launcher,
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Resolve the plan for a given level
    pub fn plan(&self, level: Level) -> LaunchPlan {
        let mode = Mode::from_level(level);
        let profile = self.config.profile(mode).clone();
        let indicator_path = profile
            .indicator
            .as_ref()
            .map(|_| self.config.indicator_path.clone());

        LaunchPlan {
            level,
            mode,
            indicator_path,
            profile,
        }
    }

    /// Sample the switch and resolve the plan for the current level
    pub fn read_plan(&mut self) -> Result<LaunchPlan> {
        let level = self
            .input
            .read_level()
            .with_context(|| format!("Failed to read mode switch on GPIO {}", self.config.pin))?;

        let plan = self.plan(level);
        info!("Mode switch is {}: selecting {} mode", level, plan.mode);
        Ok(plan)
    }

    /// Carry out a plan: indicator write, then launch and wait
    pub async fn execute(&self, plan: &LaunchPlan) -> Result<Selection> {
        if let (Some(path), Some(flag)) = (&plan.indicator_path, &plan.profile.indicator) {
            IndicatorFile::new(path).write(flag)?;
            info!("Indicator set to {:?}", flag);
        }

        let outcome = self.launcher.launch(&plan.profile).await;
        let program = plan.profile.program.display();

        if outcome.is_success() {
            info!("{} {}", program, outcome);
        } else {
            match self.config.failure_policy {
                FailurePolicy::Ignore => warn!("{} {} (ignored)", program, outcome),
                FailurePolicy::Propagate => bail!("{} {}", program, outcome),
            }
        }

        Ok(Selection {
            mode: plan.mode,
            outcome,
        })
    }

    /// Read the switch once and run the selected mode
    pub async fn run(mut self) -> Result<Selection> {
        let plan = self.read_plan()?;
        self.execute(&plan).await
    }
}
