//! picam-mode - boot-time mode selector for a Raspberry Pi camera
//!
//! A switch on one GPIO line decides what the camera does after boot:
//!
//! - **Switch open (line high, pull-up)**: local still capture. The NeoPixel
//!   indicator state file is set to `F` and raspistill runs a full preview.
//! - **Switch closed (line low)**: network camera. raspindi runs as an NDI
//!   server with its bundled libraries on `LD_LIBRARY_PATH`.
//!
//! The line is sampled once; the selected program is then run to completion.
//! Paths, arguments and environment overrides are data in
//! [`SelectorConfig`], and the hardware sits behind [`ModeInput`], so the
//! whole flow runs in tests without a Pi.
//!
//! Feature flags:
//!
//! - **`gpio`** (default): [`GpioInput`], real GPIO access through rppal

// Configuration and mode table
pub mod config;

// Process launching and outcomes
pub mod launch;

mod gpio;
mod indicator;
mod mode;
mod selector;

pub use config::{FailurePolicy, ModeProfile, SelectorConfig};
pub use gpio::{FixedLevel, ModeInput};
pub use indicator::IndicatorFile;
pub use launch::{ChildOutcome, Launcher, ProcessLauncher};
pub use mode::{Level, Mode};
pub use selector::{LaunchPlan, ModeSelector, Selection};

#[cfg(feature = "gpio")]
pub use gpio::GpioInput;
