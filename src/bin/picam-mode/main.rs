//! picam-mode binary
//!
//! Runs once at boot: reads the mode switch and hands the camera over to
//! raspindi (switch closed) or raspistill (switch open).
//!
//! ## Usage
//!
//! ```bash
//! # Normal boot (reads GPIO 17)
//! picam-mode
//!
//! # Force a mode without the switch fitted
//! picam-mode --mode stream
//!
//! # Show what would run for the current switch position
//! picam-mode --dry-run
//!
//! # Exit non-zero when the camera program fails
//! PICAM_MODE_STRICT=1 picam-mode
//! ```

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use picam_mode::{
    FixedLevel, Mode, ModeInput, ModeSelector, ProcessLauncher, SelectorConfig,
};

/// Command line flags
struct Args {
    /// Forced mode, bypassing the GPIO read
    mode: Option<Mode>,
    /// Print the plan instead of running it
    dry_run: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        Self::parse_from(std::env::args().skip(1))
    }

    fn parse_from<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut mode = None;
        let mut dry_run = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--dry-run" {
                dry_run = true;
            } else if arg == "--mode" {
                let value = args.next().context("--mode requires a value (stream|still)")?;
                mode = Some(value.parse()?);
            } else if let Some(value) = arg.strip_prefix("--mode=") {
                mode = Some(value.parse()?);
            }
        }

        Ok(Self { mode, dry_run })
    }
}

fn open_input(config: &SelectorConfig, forced: Option<Mode>) -> Result<Box<dyn ModeInput>> {
    if let Some(mode) = forced {
        info!("Mode forced to {} (GPIO {} not read)", mode, config.pin);
        return Ok(Box::new(FixedLevel(mode.level())));
    }

    #[cfg(feature = "gpio")]
    {
        Ok(Box::new(picam_mode::GpioInput::open(config.pin)?))
    }
    #[cfg(not(feature = "gpio"))]
    {
        anyhow::bail!("GPIO support not enabled. Rebuild with --features gpio or pass --mode")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to --dry-run and the child
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("picam_mode=info".parse()?))
        .init();

    let args = Args::parse()?;
    let config = SelectorConfig::from_env()?;

    info!("picam-mode starting");
    info!("  GPIO: {} (pull-up)", config.pin);
    info!("  Indicator: {}", config.indicator_path.display());
    info!("  Failure policy: {:?}", config.failure_policy);

    let input = open_input(&config, args.mode)?;
    let mut selector = ModeSelector::new(config, input, ProcessLauncher::inheriting());
    let plan = selector.read_plan()?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let selection = selector.execute(&plan).await?;
    debug!("Selection finished: {:?}", selection);

    Ok(())
}
