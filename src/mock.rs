//! # Deterministic hardware stand-ins
//!
//! The camera, the trigger line and the clock are all consumed through
//! single-operation traits, so the capture loop can run against the
//! deterministic implementations in this module without touching real
//! hardware. They are used by this crate's own tests and are exported for
//! integration tests.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::cell::Cell;
use std::collections::VecDeque;

use image::{DynamicImage, Rgb, RgbImage};

use crate::camstream::FrameSource;
use crate::clock::{Clock, Timestamp};
use crate::error::{Error, Result};
use crate::trigger::PulseTrigger;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// Frame source yielding a pre-built queue of frames, then failing as a
/// disconnected camera would.
pub struct MockSource {
    frames: VecDeque<DynamicImage>,

    /// Set once `close` has been called.
    pub closed: bool,
}

/// Clock replaying a fixed sequence of readings. Once the sequence is
/// exhausted the last reading repeats, as a stopped clock would.
pub struct MockClock {
    readings: Vec<Timestamp>,
    cursor: Cell<usize>,
}

/// Trigger that records invocations instead of driving a line.
pub struct MockTrigger {
    /// Number of completed `toggle_twice` calls.
    pub pulse_pairs: u32,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl MockSource {
    /// A source yielding `count` solid-colour RGB frames of the given size.
    pub fn solid(count: usize, width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let frames = (0..count)
            .map(|_| DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb))))
            .collect();

        Self {
            frames,
            closed: false,
        }
    }

    /// A source yielding an explicit sequence of frames.
    pub fn from_frames(frames: Vec<DynamicImage>) -> Self {
        Self {
            frames: frames.into(),
            closed: false,
        }
    }

    /// Frames not yet captured.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MockSource {
    fn capture(&mut self) -> Result<DynamicImage> {
        self.frames
            .pop_front()
            .ok_or_else(|| Error::Capture(String::from("Mock stream exhausted")))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

impl MockClock {
    pub fn new(readings: Vec<Timestamp>) -> Self {
        assert!(
            !readings.is_empty(),
            "MockClock needs at least one reading"
        );

        Self {
            readings,
            cursor: Cell::new(0),
        }
    }

    /// How many readings have been taken so far.
    pub fn reads(&self) -> usize {
        self.cursor.get()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        let i = self.cursor.get();
        self.cursor.set(i + 1);

        match self.readings.get(i) {
            Some(ts) => *ts,
            None => *self.readings.last().expect("readings cannot be empty"),
        }
    }
}

impl MockTrigger {
    pub fn new() -> Self {
        Self { pulse_pairs: 0 }
    }
}

impl Default for MockTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseTrigger for MockTrigger {
    fn toggle_twice(&mut self) -> Result<()> {
        self.pulse_pairs += 1;

        Ok(())
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
