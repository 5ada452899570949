//! # `SourceBuilder` implementation
//!
//! This module implements the builder which turns a [`CaptureConfig`] into an
//! opened, validated frame source, along with the construction of the CSI
//! GStreamer pipeline description.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::camstream::{FrameSource, V4l2Source};
use crate::config::{Backend, CaptureConfig};
use crate::error::{Error, Result};

#[cfg(feature = "csi")]
use crate::camstream::CsiSource;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Builder for an opened and validated [`FrameSource`].
pub struct SourceBuilder {
    config: CaptureConfig,
}

// -----------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Build the GStreamer pipeline description for a hardware CSI camera.
///
/// This is needed to load a CSI camera via GStreamer: the sensor is read
/// through `nvarguscamerasrc` into NVMM memory, flipped by `nvvidconv`, and
/// converted down to packed BGR for the appsink the capture loop pulls from.
///
/// No range validation is performed on the parameters; invalid values surface
/// as an open failure when the pipeline is launched.
pub fn csi_pipeline(
    capture_width: u32,
    capture_height: u32,
    display_width: u32,
    display_height: u32,
    framerate: u32,
    flip_method: u32,
) -> String {
    format!(
        "nvarguscamerasrc ! video/x-raw(memory:NVMM), width=(int){}, height=(int){}, \
         framerate=(fraction){}/1 ! nvvidconv flip-method={} ! video/x-raw, width=(int){}, \
         height=(int){}, format=(string)BGRx ! videoconvert ! video/x-raw, format=(string)BGR ! \
         appsink name=sink",
        capture_width, capture_height, framerate, flip_method, display_width, display_height
    )
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl SourceBuilder {
    /// Create a builder from an explicit capture configuration.
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the sensor capture resolution.
    pub fn resolution(mut self, resolution: (u32, u32)) -> Self {
        self.config.capture_width = resolution.0;
        self.config.capture_height = resolution.1;

        self
    }

    /// Set the resolution of frames delivered by the pipeline.
    pub fn display_resolution(mut self, resolution: (u32, u32)) -> Self {
        self.config.display_width = resolution.0;
        self.config.display_height = resolution.1;

        self
    }

    /// Set the requested stream frame rate.
    pub fn framerate(mut self, framerate: f64) -> Self {
        self.config.framerate = framerate;

        self
    }

    /// Select the camera backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;

        self
    }

    /// Open the configured backend and validate it with one trial capture.
    ///
    /// Exactly one test frame is consumed and discarded here; callers must not
    /// count it toward the target frame count. Any open failure or an empty
    /// trial frame maps to [`Error::CameraInit`].
    pub fn build(self) -> Result<Box<dyn FrameSource>> {
        let mut source: Box<dyn FrameSource> = match &self.config.backend {
            Backend::Csi => self.open_csi()?,
            Backend::Device(path) => Box::new(V4l2Source::open(
                path,
                (self.config.capture_width, self.config.capture_height),
                self.config.framerate as u32,
            )?),
        };

        // One trial capture confirms the stream yields non-empty frames before
        // the timed session begins
        let trial = source
            .capture()
            .map_err(|e| Error::CameraInit(format!("Trial capture failed: {}", e)))?;

        if trial.as_bytes().is_empty() {
            source.close();
            return Err(Error::CameraInit(String::from("Trial frame is empty")));
        }

        log::info!(
            "camera stream validated ({}x{} trial frame)",
            trial.width(),
            trial.height()
        );

        Ok(source)
    }

    #[cfg(feature = "csi")]
    fn open_csi(&self) -> Result<Box<dyn FrameSource>> {
        let description = csi_pipeline(
            self.config.capture_width,
            self.config.capture_height,
            self.config.display_width,
            self.config.display_height,
            self.config.framerate as u32,
            self.config.flip_method.method_number(),
        );

        Ok(Box::new(CsiSource::open(&description)?))
    }

    #[cfg(not(feature = "csi"))]
    fn open_csi(&self) -> Result<Box<dyn FrameSource>> {
        Err(Error::CsiUnsupported)
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
