//! # GPIO trigger
//!
//! The external time-correlation event: a double pulse on a GPIO line,
//! emitted synchronously so the timestamp taken immediately after the call
//! returns is a faithful upper bound on pulse-completion time.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::thread;
use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};

use crate::error::{Error, Result};

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// The single capability the capture loop needs from the trigger hardware.
pub trait PulseTrigger {
    /// Emit the pulse pair, blocking until both pulses have been physically
    /// driven onto the line.
    fn toggle_twice(&mut self) -> Result<()>;
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// Trigger driving a real GPIO output line.
pub struct GpioTrigger {
    pin: OutputPin,

    pulse_width: Duration,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl GpioTrigger {
    /// Acquire the given GPIO line as an output, initially low.
    pub fn open(line: u8, pulse_width: Duration) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| Error::Gpio(format!("{}", e)))?;

        let pin = gpio
            .get(line)
            .map_err(|e| Error::Gpio(format!("Cannot acquire line {}: {}", line, e)))?
            .into_output_low();

        Ok(Self { pin, pulse_width })
    }
}

impl PulseTrigger for GpioTrigger {
    fn toggle_twice(&mut self) -> Result<()> {
        for _ in 0..2 {
            self.pin.set_high();
            thread::sleep(self.pulse_width);
            self.pin.set_low();
            thread::sleep(self.pulse_width);
        }

        log::debug!("trigger pulse pair emitted");

        Ok(())
    }
}
