//! # Session store
//!
//! One acquisition run produces one session directory. This module creates it
//! (keyed by the run's start second) and persists the frame images and the
//! latency statistics file into it. The process is the directory's only
//! writer, so no locking discipline is needed.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::clock::Timestamp;
use crate::config::ColorMode;
use crate::error::{Error, Result};
use crate::latency::LatencyRecord;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// Handle on one run's output directory.
pub struct SessionStore {
    directory: PathBuf,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl SessionStore {
    /// Create `<base_dir>/frames/<start second>/` for a new session.
    ///
    /// The `frames/` parent is created if missing; the session directory
    /// itself must not already exist, so two runs started within the same
    /// second cannot silently share artifacts.
    pub fn create<P: AsRef<Path>>(base_dir: P, start: Timestamp) -> Result<Self> {
        let parent = base_dir.as_ref().join("frames");

        fs::create_dir_all(&parent).map_err(|source| Error::DirectoryCreate {
            path: parent.clone(),
            source,
        })?;

        let directory = parent.join(start.format_coarse());

        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            // Wide open so offload tooling under another user can read and
            // delete sessions; effective bits are still umask-filtered
            builder.mode(0o777);
        }

        builder.create(&directory).map_err(|source| Error::DirectoryCreate {
            path: directory.clone(),
            source,
        })?;

        log::info!("created session directory {:?}", directory);

        Ok(Self { directory })
    }

    /// The session's output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Persist one frame as `<t_ns>.png`, converting to grayscale unless the
    /// session runs in colour mode.
    ///
    /// # Returns
    /// - The path of the written image
    pub fn write_frame(
        &self,
        frame: &DynamicImage,
        t_ns: &str,
        color_mode: ColorMode,
    ) -> Result<PathBuf> {
        let path = self.directory.join(format!("{}.png", t_ns));

        let result = match color_mode {
            ColorMode::Grayscale => frame.to_luma8().save_with_format(&path, ImageFormat::Png),
            ColorMode::Color => frame.save_with_format(&path, ImageFormat::Png),
        };

        result.map_err(|source| Error::FrameWrite {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }

    /// Serialise the latency record into `stats.txt`, overwriting any
    /// existing file.
    ///
    /// A session directory without this file is incomplete by definition.
    pub fn write_stats(&self, record: &LatencyRecord) -> Result<PathBuf> {
        let path = self.directory.join("stats.txt");

        fs::write(&path, record.to_stats_string()).map_err(|source| Error::StatsWrite {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
