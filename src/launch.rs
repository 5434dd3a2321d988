//! Launching the mode's program
//!
//! The child gets an explicit environment: a snapshot of the parent's
//! variables with the profile's overrides applied on top. The selector's own
//! environment is never modified.
//!
//! Launch problems are reported as a [`ChildOutcome`] rather than an error,
//! so the caller's failure policy decides whether they matter.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::{debug, info};

use crate::ModeProfile;

/// Environment handed to a child process
pub type ChildEnv = BTreeMap<OsString, OsString>;

/// Build a child environment: inherited variables plus overrides
pub fn child_environment<I>(parent: I, overrides: &BTreeMap<String, String>) -> ChildEnv
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: ChildEnv = parent.into_iter().collect();
    for (key, value) in overrides {
        env.insert(OsString::from(key), OsString::from(value));
    }
    env
}

/// How the launched program ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChildOutcome {
    /// Ran and exited with a status code
    Exited { code: i32 },
    /// Terminated by a signal
    Signaled { signal: Option<i32> },
    /// Could not be started at all (missing binary, not executable, ...)
    LaunchFailed { reason: String },
}

impl ChildOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ChildOutcome::Exited { code },
            None => ChildOutcome::Signaled {
                signal: signal_of(&status),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChildOutcome::Exited { code: 0 })
    }
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}

impl fmt::Display for ChildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildOutcome::Exited { code } => write!(f, "exited with code {}", code),
            ChildOutcome::Signaled { signal: Some(sig) } => write!(f, "killed by signal {}", sig),
            ChildOutcome::Signaled { signal: None } => write!(f, "killed by signal"),
            ChildOutcome::LaunchFailed { reason } => write!(f, "failed to launch: {}", reason),
        }
    }
}

/// Runs a mode profile to completion
pub trait Launcher {
    /// Run the profile's program and wait for it to finish
    fn launch(&self, profile: &ModeProfile) -> impl Future<Output = ChildOutcome>;
}

/// Launcher backed by real OS processes
///
/// stdio is inherited, so raspistill's preview and raspindi's console output
/// go wherever the selector's own output goes.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    parent_env: ChildEnv,
}

impl ProcessLauncher {
    /// Launcher whose children inherit this process's environment
    pub fn inheriting() -> Self {
        Self::with_parent_env(std::env::vars_os())
    }

    /// Launcher whose children inherit `parent_env` instead
    pub fn with_parent_env<I>(parent_env: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self {
            parent_env: parent_env.into_iter().collect(),
        }
    }

    /// Environment a child of `profile` would receive
    pub fn environment_for(&self, profile: &ModeProfile) -> ChildEnv {
        child_environment(self.parent_env.clone(), &profile.env)
    }

    fn command(&self, profile: &ModeProfile) -> Command {
        let mut cmd = Command::new(&profile.program);
        cmd.args(&profile.args)
            .env_clear()
            .envs(self.environment_for(profile));
        cmd
    }
}

impl Launcher for ProcessLauncher {
    async fn launch(&self, profile: &ModeProfile) -> ChildOutcome {
        info!(
            "Launching {} {}",
            profile.program.display(),
            profile.args.join(" ")
        );
        if !profile.env.is_empty() {
            debug!("Environment overrides: {:?}", profile.env);
        }

        match self.command(profile).status().await {
            Ok(status) => ChildOutcome::from_status(status),
            Err(e) => ChildOutcome::LaunchFailed {
                reason: format!("{}: {}", profile.program.display(), e),
            },
        }
    }
}
