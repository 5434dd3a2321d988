//! Selector configuration
//!
//! Every path, argument and environment override the selector uses lives
//! here as data. Defaults match the appliance image: raspindi installed
//! under `/opt/raspindi`, raspistill from the stock Raspberry Pi OS
//! userland, and the NeoPixel daemon watching `/tmp/neopixel.state`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::Mode;

/// BCM number of the mode switch line
pub const DEFAULT_PIN: u8 = 17;

/// State file read by the NeoPixel indicator daemon
pub const DEFAULT_INDICATOR_PATH: &str = "/tmp/neopixel.state";

/// Flag written to the indicator file when still capture starts
pub const STILL_INDICATOR_FLAG: &str = "F";

pub const DEFAULT_STREAM_BIN: &str = "/opt/raspindi/bin/raspindi";
pub const DEFAULT_STREAM_LIB_DIR: &str = "/opt/raspindi/usr/lib";
pub const DEFAULT_STILL_BIN: &str = "/usr/bin/raspistill";

/// What to do when the launched program fails or cannot be started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the outcome and finish normally
    #[default]
    Ignore,
    /// Report a non-success outcome as an error
    Propagate,
}

/// How to run one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeProfile {
    /// Absolute path of the program to run
    pub program: PathBuf,
    /// Argument vector, excluding the program name
    pub args: Vec<String>,
    /// Variables set (or replaced) on top of the inherited environment
    pub env: BTreeMap<String, String>,
    /// Flag written to the indicator file before launch, if any
    pub indicator: Option<String>,
}

impl ModeProfile {
    /// raspindi NDI server, linked against its bundled libraries
    pub fn raspindi(program: impl Into<PathBuf>, lib_dir: impl Into<String>) -> Self {
        let mut env = BTreeMap::new();
        env.insert("LD_LIBRARY_PATH".to_string(), lib_dir.into());

        Self {
            program: program.into(),
            args: Vec::new(),
            env,
            indicator: None,
        }
    }

    /// raspistill full preview at 1080p, running until killed
    pub fn raspistill(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![
                "-fp".to_string(),
                "-t".to_string(),
                "0".to_string(), // No timeout
                "-w".to_string(),
                "1920".to_string(),
                "-h".to_string(),
                "1080".to_string(),
            ],
            env: BTreeMap::new(),
            indicator: Some(STILL_INDICATOR_FLAG.to_string()),
        }
    }
}

/// Complete selector configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    /// BCM pin number of the mode switch
    pub pin: u8,
    /// Indicator state file path
    pub indicator_path: PathBuf,
    /// Handling of child failures
    pub failure_policy: FailurePolicy,
    /// Profile used when the switch pulls the line low
    pub stream: ModeProfile,
    /// Profile used when the line is high (idle)
    pub still: ModeProfile,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            pin: DEFAULT_PIN,
            indicator_path: PathBuf::from(DEFAULT_INDICATOR_PATH),
            failure_policy: FailurePolicy::Ignore,
            stream: ModeProfile::raspindi(DEFAULT_STREAM_BIN, DEFAULT_STREAM_LIB_DIR),
            still: ModeProfile::raspistill(DEFAULT_STILL_BIN),
        }
    }
}

impl SelectorConfig {
    /// Defaults with `PICAM_MODE_*` overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pin = match lookup("PICAM_MODE_PIN") {
            Some(s) => s
                .trim()
                .parse::<u8>()
                .with_context(|| format!("Invalid PICAM_MODE_PIN '{}'", s))?,
            None => DEFAULT_PIN,
        };

        let indicator_path = lookup("PICAM_MODE_INDICATOR_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INDICATOR_PATH));

        let strict = lookup("PICAM_MODE_STRICT")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let stream_bin =
            lookup("PICAM_MODE_STREAM_BIN").unwrap_or_else(|| DEFAULT_STREAM_BIN.to_string());
        let stream_lib_dir = lookup("PICAM_MODE_STREAM_LIB_DIR")
            .unwrap_or_else(|| DEFAULT_STREAM_LIB_DIR.to_string());
        let still_bin =
            lookup("PICAM_MODE_STILL_BIN").unwrap_or_else(|| DEFAULT_STILL_BIN.to_string());

        Ok(Self {
            pin,
            indicator_path,
            failure_policy: if strict {
                FailurePolicy::Propagate
            } else {
                FailurePolicy::Ignore
            },
            stream: ModeProfile::raspindi(stream_bin, stream_lib_dir),
            still: ModeProfile::raspistill(still_bin),
        })
    }

    /// Profile for a mode
    pub fn profile(&self, mode: Mode) -> &ModeProfile {
        match mode {
            Mode::Stream => &self.stream,
            Mode::Still => &self.still,
        }
    }
}
