//! Operating modes and the pin level that selects them
//!
//! The mode switch is wired active-low against an internal pull-up:
//! an open switch (or no switch at all) reads high and keeps the camera
//! in still-capture mode, closing it to ground selects streaming.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical level of a digital input line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

/// Camera operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Network camera server (NDI streaming daemon)
    Stream,
    /// Local still capture with on-screen preview
    Still,
}

impl Mode {
    /// Map a pin reading to a mode. Low selects streaming.
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Low => Mode::Stream,
            Level::High => Mode::Still,
        }
    }

    /// The pin level that selects this mode
    pub fn level(self) -> Level {
        match self {
            Mode::Stream => Level::Low,
            Mode::Still => Level::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Stream => "stream",
            Mode::Still => "still",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stream" | "ndi" => Ok(Mode::Stream),
            "still" | "capture" => Ok(Mode::Still),
            other => anyhow::bail!("Unknown mode '{}' (expected 'stream' or 'still')", other),
        }
    }
}
