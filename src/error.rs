//! # `cam_daq` Error module
//!
//! Provides abstractions over errors which can occur during an acquisition run.
//! Every error is terminal for the run: a corrupted session is discarded and
//! repeated wholesale rather than resumed, so there are no retry paths here.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::PathBuf;

use thiserror;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Result type used by faillible functions inside the `cam_daq` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors which can occur during use of the `cam_daq` crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The camera device could not be opened, or the trial frame pulled during
    /// validation came back empty.
    #[error("Failed to initialise camera stream: {0}")]
    CameraInit(String),

    /// The per-run session directory could not be created.
    #[error("Cannot create session directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A frame could not be pulled from a validated stream. Mid-session this
    /// aborts the run, leaving a partial session directory without a stats
    /// file.
    #[error("Error capturing camera frame: {0}")]
    Capture(String),

    /// A captured frame could not be encoded or written to disk.
    #[error("Cannot write frame to {path:?}: {source}")]
    FrameWrite {
        path: PathBuf,
        source: image::ImageError,
    },

    /// The latency statistics file could not be written.
    #[error("Cannot write stats file {path:?}: {source}")]
    StatsWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The GPIO line could not be acquired or driven.
    #[error("GPIO trigger failure: {0}")]
    Gpio(String),

    #[error("Cannot find file at {0:?}")]
    FileNotFound(PathBuf),

    #[error("Error deserialising configuration: {0}")]
    Deserialisation(serde_any::Error),

    #[error("Configured frame count must be at least 1")]
    InvalidFrameCount,

    /// The CSI backend was requested from a build without the `csi` feature.
    #[error("This build does not include the CSI pipeline backend (enable the `csi` feature)")]
    CsiUnsupported,
}

impl Error {
    /// Process exit code for this failure class. Each class maps to its own
    /// non-zero code so an unattended run can be triaged from the exit status
    /// alone.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CameraInit(_) => 2,
            Error::DirectoryCreate { .. } => 3,
            Error::Capture(_) => 4,
            Error::FrameWrite { .. } => 5,
            Error::StatsWrite { .. } => 6,
            Error::Gpio(_) => 7,
            Error::FileNotFound(_) | Error::Deserialisation(_) | Error::InvalidFrameCount => 8,
            Error::CsiUnsupported => 9,
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    /// Every failure class must keep a distinct non-zero exit code.
    #[test]
    fn test_exit_codes_distinct() {
        let errors = vec![
            Error::CameraInit(String::from("x")),
            Error::DirectoryCreate {
                path: PathBuf::from("/tmp/x"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "x"),
            },
            Error::Capture(String::from("x")),
            Error::FrameWrite {
                path: PathBuf::from("/tmp/x"),
                source: image::ImageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "x",
                )),
            },
            Error::StatsWrite {
                path: PathBuf::from("/tmp/x"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "x"),
            },
            Error::Gpio(String::from("x")),
            Error::InvalidFrameCount,
            Error::CsiUnsupported,
        ];

        let mut codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        codes.sort_unstable();

        assert!(codes.iter().all(|c| *c != 0));

        let mut deduped = codes.clone();
        deduped.dedup();
        assert_eq!(codes, deduped);
    }
}
