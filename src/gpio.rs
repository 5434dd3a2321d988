//! Mode switch input
//!
//! The selector only ever needs one thing from the hardware: the level of
//! the mode switch line, sampled once. [`ModeInput`] captures that, so the
//! selection logic runs the same against a real Pi header, a fixed level
//! forced from the command line, or a fake in tests.

use anyhow::Result;

use crate::Level;

/// Source of the mode switch level
pub trait ModeInput {
    /// Read the instantaneous logical level of the configured input line
    fn read_level(&mut self) -> Result<Level>;
}

impl<T: ModeInput + ?Sized> ModeInput for &mut T {
    fn read_level(&mut self) -> Result<Level> {
        (**self).read_level()
    }
}

impl<T: ModeInput + ?Sized> ModeInput for Box<T> {
    fn read_level(&mut self) -> Result<Level> {
        (**self).read_level()
    }
}

/// Input that always reports the same level
///
/// Used for `--mode` overrides on a bench without the switch fitted.
#[derive(Debug, Clone, Copy)]
pub struct FixedLevel(pub Level);

impl ModeInput for FixedLevel {
    fn read_level(&mut self) -> Result<Level> {
        Ok(self.0)
    }
}

#[cfg(feature = "gpio")]
pub use pi::GpioInput;

#[cfg(feature = "gpio")]
mod pi {
    use anyhow::{Context, Result};
    use rppal::gpio::{Gpio, InputPin};
    use tracing::debug;

    use super::ModeInput;
    use crate::Level;

    /// GPIO input line with the internal pull-up enabled (BCM numbering)
    pub struct GpioInput {
        pin: InputPin,
    }

    impl GpioInput {
        /// Claim `bcm_pin` as an input with pull-up.
        ///
        /// A floating or disconnected line reads high.
        pub fn open(bcm_pin: u8) -> Result<Self> {
            let gpio = Gpio::new().context("Failed to access GPIO. Is this a Raspberry Pi?")?;
            let pin = gpio
                .get(bcm_pin)
                .with_context(|| format!("Failed to open GPIO line {}", bcm_pin))?
                .into_input_pullup();

            debug!("GPIO {} configured as input with pull-up", bcm_pin);
            Ok(Self { pin })
        }
    }

    impl ModeInput for GpioInput {
        fn read_level(&mut self) -> Result<Level> {
            Ok(match self.pin.read() {
                rppal::gpio::Level::Low => Level::Low,
                rppal::gpio::Level::High => Level::High,
            })
        }
    }
}
