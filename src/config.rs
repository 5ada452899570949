//! # Capture configuration
//!
//! Explicit configuration for one acquisition run. The defaults replicate the
//! fixed values the tool was originally deployed with (1300 grayscale frames
//! at 1280x720/60fps from the CSI pipeline, trigger on GPIO line 10); a config
//! file can override any subset of them for testing with small frame counts or
//! alternate resolutions.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_any;

use crate::error::{Error, Result};

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Whether frames are persisted as grayscale or full colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Grayscale,
    Color,
}

/// Which camera backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hardware CSI camera through a GStreamer pipeline description.
    Csi,

    /// Generic V4L2 device at the given path, e.g. `/dev/video0`.
    Device(PathBuf),
}

/// Frame flip orientation, in 90 degree intervals, applied by the capture
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipMethod {
    None,
    Clockwise90,
    Rotate180,
    Counterclockwise90,
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// Configuration for one bounded acquisition session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Number of frames to capture and persist. Must be positive.
    pub frame_count: u32,

    /// Colour handling for persisted frames.
    pub color_mode: ColorMode,

    /// Sensor capture resolution.
    pub capture_width: u32,
    pub capture_height: u32,

    /// Resolution of the frames delivered by the pipeline. Usually matches the
    /// capture resolution, but the pipeline can downscale.
    pub display_width: u32,
    pub display_height: u32,

    /// Requested stream frame rate in frames per second.
    pub framerate: f64,

    /// Flip orientation applied by the pipeline.
    pub flip_method: FlipMethod,

    /// Camera backend selector.
    pub backend: Backend,

    /// Directory under which `frames/<start>/` session directories are
    /// created.
    pub base_dir: PathBuf,

    /// GPIO line carrying the trigger pulse pair.
    pub gpio_line: u8,

    /// Width of each trigger pulse, in milliseconds.
    pub pulse_width_ms: u64,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl FlipMethod {
    /// The pipeline `flip-method` argument for this orientation.
    pub fn method_number(&self) -> u32 {
        match self {
            FlipMethod::None => 0,
            FlipMethod::Clockwise90 => 1,
            FlipMethod::Rotate180 => 2,
            FlipMethod::Counterclockwise90 => 3,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_count: 1300,
            color_mode: ColorMode::Grayscale,
            capture_width: 1280,
            capture_height: 720,
            display_width: 1280,
            display_height: 720,
            framerate: 60.0,
            flip_method: FlipMethod::None,
            backend: Backend::Csi,
            base_dir: PathBuf::from("."),
            gpio_line: 10,
            pulse_width_ms: 1,
        }
    }
}

impl CaptureConfig {
    /// Load a configuration from a file.
    ///
    /// The file type will be guessed at runtime, any file type supported by
    /// [`serde_any`](https://docs.rs/serde_any/0.5.0/serde_any/) is supported.
    /// Fields not present in the file keep their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Check the file exists
        if !path.as_ref().exists() {
            return Err(Error::FileNotFound(path.as_ref().to_path_buf()));
        }

        // Load the configuration, guessing which format it's in using serde_any
        let config: Self = serde_any::from_file(path).map_err(Error::Deserialisation)?;

        config.validate()?;

        Ok(config)
    }

    /// Confirm the configuration describes a runnable session.
    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(Error::InvalidFrameCount);
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
