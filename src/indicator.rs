//! Indicator state file
//!
//! The NeoPixel daemon polls a small state file to decide what the status
//! LED shows. The selector only ever writes to it; the flag replaces the
//! whole file each time, so repeated boots never accumulate content.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer for the indicator state file
#[derive(Debug, Clone)]
pub struct IndicatorFile {
    path: PathBuf,
}

impl IndicatorFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents with `flag`, byte for byte (no newline)
    pub fn write(&self, flag: &str) -> Result<()> {
        fs::write(&self.path, flag.as_bytes()).with_context(|| {
            format!(
                "Failed to write indicator state to {}",
                self.path.display()
            )
        })?;

        debug!("Indicator state {:?} written to {:?}", flag, self.path);
        Ok(())
    }
}
