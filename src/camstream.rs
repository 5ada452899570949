//! # Camera Stream Module
//!
//! This module provides the frame source abstraction that the capture loop
//! pulls decoded frames from, plus the two hardware implementations: a V4L2
//! device accessed through `rscam`, and (behind the `csi` feature) a hardware
//! CSI camera driven by a GStreamer pipeline description.
//!
//! Both implementations block in [`FrameSource::capture`] until the next frame
//! is available; there is no internal buffering beyond what the drivers keep.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{DynamicImage, ImageFormat};
use rscam::Camera;

use crate::error::{Error, Result};

#[cfg(feature = "csi")]
use gstreamer as gst;
#[cfg(feature = "csi")]
use gstreamer::prelude::*;
#[cfg(feature = "csi")]
use gstreamer_app as gst_app;

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// A validated source of decoded camera frames.
///
/// Implementations are blocking and strictly sequential: the next frame is
/// requested only after the caller has finished with the previous one.
pub trait FrameSource {
    /// Capture the next frame from the stream, blocking until it arrives.
    fn capture(&mut self) -> Result<DynamicImage>;

    /// Release the underlying device. Idempotent.
    fn close(&mut self);
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// Frame source backed by a generic V4L2 device.
pub struct V4l2Source {
    camera: Camera,

    img_format: ImageFormat,

    open: bool,
}

/// Frame source backed by a hardware CSI camera through a GStreamer pipeline.
#[cfg(feature = "csi")]
pub struct CsiSource {
    pipeline: gst::Pipeline,

    appsink: gst_app::AppSink,

    open: bool,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl V4l2Source {
    /// Open and start a V4L2 camera at the given device path.
    ///
    /// The stream is configured for MJPG so frames arrive as JPEG and are
    /// decoded through the `image` crate.
    pub(crate) fn open(
        path: &std::path::Path,
        resolution: (u32, u32),
        framerate: u32,
    ) -> Result<Self> {
        let device = path
            .to_str()
            .ok_or_else(|| Error::CameraInit(format!("Device path {:?} is not UTF-8", path)))?;

        let mut camera = Camera::new(device).map_err(|e| Error::CameraInit(format!("{}", e)))?;

        let config = rscam::Config {
            interval: (1, framerate.max(1)),
            resolution,
            format: b"MJPG",
            ..rscam::Config::default()
        };

        camera
            .start(&config)
            .map_err(|e| Error::CameraInit(format!("{:?}", e)))?;

        log::debug!("started V4L2 stream on {}", device);

        Ok(Self {
            camera,
            img_format: ImageFormat::Jpeg,
            open: true,
        })
    }
}

impl FrameSource for V4l2Source {
    fn capture(&mut self) -> Result<DynamicImage> {
        // Get the frame from the camera
        let frame = self
            .camera
            .capture()
            .map_err(|e| Error::Capture(format!("{}", e)))?;

        // Decode it into an image
        image::load_from_memory_with_format(&frame, self.img_format)
            .map_err(|e| Error::Capture(format!("{}", e)))
    }

    fn close(&mut self) {
        if self.open {
            let _ = self.camera.stop();
            self.open = false;
        }
    }
}

#[cfg(feature = "csi")]
impl CsiSource {
    /// Launch the given pipeline description and attach to its appsink.
    ///
    /// The description must terminate in an appsink named `sink` delivering
    /// raw BGR frames, as produced by
    /// [`csi_pipeline`](crate::csi_pipeline).
    pub(crate) fn open(description: &str) -> Result<Self> {
        gst::init().map_err(|e| Error::CameraInit(format!("{}", e)))?;

        let element =
            gst::parse::launch(description).map_err(|e| Error::CameraInit(format!("{}", e)))?;

        let pipeline = element.downcast::<gst::Pipeline>().map_err(|_| {
            Error::CameraInit(String::from("Description did not produce a pipeline"))
        })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| Error::CameraInit(String::from("Pipeline has no element named `sink`")))?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| Error::CameraInit(String::from("Element `sink` is not an appsink")))?;

        pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| Error::CameraInit(format!("{}", e)))?;

        log::debug!("CSI pipeline playing: {}", description);

        Ok(Self {
            pipeline,
            appsink,
            open: true,
        })
    }
}

#[cfg(feature = "csi")]
impl FrameSource for CsiSource {
    fn capture(&mut self) -> Result<DynamicImage> {
        let sample = self
            .appsink
            .pull_sample()
            .map_err(|e| Error::Capture(format!("{}", e)))?;

        let caps = sample
            .caps()
            .ok_or_else(|| Error::Capture(String::from("Sample carries no caps")))?;
        let structure = caps
            .structure(0)
            .ok_or_else(|| Error::Capture(String::from("Sample caps carry no structure")))?;

        let width = structure
            .get::<i32>("width")
            .map_err(|e| Error::Capture(format!("{}", e)))? as u32;
        let height = structure
            .get::<i32>("height")
            .map_err(|e| Error::Capture(format!("{}", e)))? as u32;

        let buffer = sample
            .buffer()
            .ok_or_else(|| Error::Capture(String::from("Sample carries no buffer")))?;
        let map = buffer
            .map_readable()
            .map_err(|e| Error::Capture(format!("{}", e)))?;

        bgr_to_image(map.as_slice(), width, height)
    }

    fn close(&mut self) {
        if self.open {
            let _ = self.pipeline.set_state(gst::State::Null);
            self.open = false;
        }
    }
}

#[cfg(feature = "csi")]
impl Drop for CsiSource {
    fn drop(&mut self) {
        // Pipelines must reach NULL before dropping to release the device
        self.close();
    }
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Convert a packed BGR frame buffer into an RGB image.
#[cfg(feature = "csi")]
fn bgr_to_image(bgr: &[u8], width: u32, height: u32) -> Result<DynamicImage> {
    let expected = (width as usize) * (height as usize) * 3;

    if bgr.len() < expected {
        return Err(Error::Capture(format!(
            "Short frame: {} bytes for {}x{}",
            bgr.len(),
            width,
            height
        )));
    }

    let mut rgb = Vec::with_capacity(expected);
    for px in bgr[..expected].chunks_exact(3) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }

    let img = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| Error::Capture(String::from("Frame buffer does not match caps")))?;

    Ok(DynamicImage::ImageRgb8(img))
}
