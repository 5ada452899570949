//! # Camera data acquisition with GPIO time correlation
//!
//! This crate captures a fixed-length sequence of camera frames and
//! establishes a precise time correlation between an external hardware event
//! (a GPIO pulse pair) and the arrival of the first captured frame, so that
//! downstream analysis can relate hardware-clock events to image-stream
//! events with known latency. It is built for single-run, unattended
//! acquisition sessions on an embedded single-board computer.
//!
//! ## Pipeline
//!
//! One invocation performs one bounded session:
//!
//! 1. open the camera backend and validate it with a single discarded trial
//!    frame
//! 2. create the session directory `frames/<start second>/`
//! 3. emit a double pulse on the trigger GPIO line and record `t1`
//! 4. capture the configured number of frames, persisting each as a PNG named
//!    by its own capture timestamp (`t2` is the first frame's timestamp)
//! 5. write `stats.txt` with `t1`, `t2`, `t_diff = t2 - t1` and
//!    `t_total = t3 - t1`
//!
//! ## Usage
//!
//! ```no_run
//! use cam_daq::prelude::*;
//! use std::time::Duration;
//!
//! let config = CaptureConfig::default();
//!
//! // Open and validate the camera before anything touches the disk
//! let mut source = SourceBuilder::from_config(&config)
//!     .build()
//!     .expect("Failed to initialise camera stream");
//!
//! let mut trigger = GpioTrigger::open(config.gpio_line, Duration::from_millis(1))
//!     .expect("Cannot acquire trigger line");
//!
//! let summary = run_session(&config, source.as_mut(), &mut trigger, &SystemClock)
//!     .expect("Acquisition failed");
//!
//! println!("session written to {:?}", summary.directory);
//! ```
//!
//! The camera, trigger and clock are all consumed through single-operation
//! traits ([`FrameSource`], [`PulseTrigger`], [`Clock`]), so tests substitute
//! the deterministic stand-ins from [`mock`] without touching hardware.
//!
//! ## Backends
//!
//! The hardware CSI pipeline backend (GStreamer `nvarguscamerasrc`) is behind
//! the `csi` cargo feature so the crate builds on hosts without the GStreamer
//! development libraries. The generic V4L2 device backend is always
//! available.

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use builder::{csi_pipeline, SourceBuilder};
pub use camstream::{FrameSource, V4l2Source};
pub use capture::{run_session, SessionSummary};
pub use clock::{Clock, SystemClock, TimeDelta, Timestamp};
pub use config::{Backend, CaptureConfig, ColorMode, FlipMethod};
pub use error::{Error, Result};
pub use latency::LatencyRecord;
pub use session::SessionStore;
pub use trigger::{GpioTrigger, PulseTrigger};

#[cfg(feature = "csi")]
pub use camstream::CsiSource;

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod builder;
mod camstream;
mod capture;
mod clock;
mod config;
mod error;
mod latency;
mod session;
mod trigger;

pub mod mock;

/// Everything a binary or test needs to run a session.
pub mod prelude {
    pub use crate::{run_session, SessionSummary};
    pub use crate::{Backend, CaptureConfig, ColorMode, FlipMethod};
    pub use crate::{Clock, SystemClock};
    pub use crate::{FrameSource, GpioTrigger, PulseTrigger, SourceBuilder};
}
