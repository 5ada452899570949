//! # Capture loop
//!
//! The control centre of the pipeline. Given an already validated frame
//! source, a pulse trigger and a clock, one call to [`run_session`] performs
//! the whole bounded acquisition: create the session directory, emit the
//! trigger pulse pair, capture and persist the configured number of frames
//! with per-frame timestamps, then derive and persist the latency statistics.
//!
//! Execution is single threaded and fully sequential; frame `N + 1` is
//! requested only after frame `N` is on disk. The capture-to-trigger latency
//! being measured depends on a single uncontended hardware path, so no
//! buffering or parallel capture is introduced here.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::PathBuf;

use crate::camstream::FrameSource;
use crate::clock::Clock;
use crate::config::CaptureConfig;
use crate::error::Result;
use crate::latency::LatencyRecord;
use crate::session::SessionStore;
use crate::trigger::PulseTrigger;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// What a completed session produced, for console reporting.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// The session's output directory.
    pub directory: PathBuf,

    /// Number of frames persisted.
    pub frames_written: u32,

    /// The timing summary written to `stats.txt`.
    pub record: LatencyRecord,
}

// -----------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Run one bounded acquisition session.
///
/// The source must already be open and validated (see
/// [`SourceBuilder::build`](crate::SourceBuilder::build)), so by the
/// time this function can fail a camera problem is a mid-session abort, not an
/// initialisation failure.
///
/// Sequence:
/// 1. create the session directory (before triggering, so frame writes never
///    stall on filesystem setup)
/// 2. emit the trigger pulse pair, then record `t1`
/// 3. capture exactly `frame_count` frames; each iteration takes one clock
///    reading which names the frame's image file, and the first iteration's
///    reading is `t2`
/// 4. record `t3`, compute the latency record and write `stats.txt`
/// 5. release the camera stream
///
/// `t2` is taken inside the loop rather than before it because pipeline
/// start-up latency is exactly the quantity being measured relative to the
/// trigger. On any error the run aborts; a partial session directory without
/// `stats.txt` marks an incomplete run.
pub fn run_session<S, T, C>(
    config: &CaptureConfig,
    source: &mut S,
    trigger: &mut T,
    clock: &C,
) -> Result<SessionSummary>
where
    S: FrameSource + ?Sized,
    T: PulseTrigger + ?Sized,
    C: Clock + ?Sized,
{
    config.validate()?;

    let start = clock.now();
    let store = SessionStore::create(&config.base_dir, start)?;

    trigger.toggle_twice()?;
    let t1 = clock.now();

    log::info!(
        "trigger complete at {}, capturing {} frames",
        t1,
        config.frame_count
    );

    let mut t2 = t1;
    for i in 0..config.frame_count {
        let frame = source.capture()?;

        let t_ns = clock.now();
        if i == 0 {
            t2 = t_ns;
        }

        store.write_frame(&frame, &t_ns.format_fine('.'), config.color_mode)?;
    }

    let t3 = clock.now();

    let record = LatencyRecord::compute(t1, t2, t3);
    store.write_stats(&record)?;

    source.close();

    log::info!(
        "session complete: {} frames, t_diff = {} s, t_total = {} s",
        config.frame_count,
        record.t_diff,
        record.t_total
    );

    Ok(SessionSummary {
        directory: store.directory().to_path_buf(),
        frames_written: config.frame_count,
        record,
    })
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;
    use crate::clock::Timestamp;
    use crate::config::ColorMode;
    use crate::error::Error;
    use crate::mock::{MockClock, MockSource, MockTrigger};

    fn small_config(base_dir: &std::path::Path, frame_count: u32) -> CaptureConfig {
        CaptureConfig {
            frame_count,
            base_dir: base_dir.to_path_buf(),
            ..CaptureConfig::default()
        }
    }

    fn readings() -> Vec<Timestamp> {
        vec![
            Timestamp::new(999, 500_000_000),   // session start
            Timestamp::new(999, 900_000_000),   // t1
            Timestamp::new(1000, 50_000_000),   // frame 1 (t2)
            Timestamp::new(1000, 80_000_000),   // frame 2
            Timestamp::new(1000, 120_000_000),  // frame 3
            Timestamp::new(1000, 200_000_000),  // t3
        ]
    }

    #[test]
    fn test_session_counts_and_record() {
        let base = tempfile::tempdir().expect("Cannot create temp dir");
        let config = small_config(base.path(), 3);

        let mut source = MockSource::solid(3, 8, 8, [120, 80, 40]);
        let mut trigger = MockTrigger::new();
        let clock = MockClock::new(readings());

        let summary = run_session(&config, &mut source, &mut trigger, &clock)
            .expect("Session should succeed");

        assert_eq!(summary.frames_written, 3);
        assert_eq!(summary.directory, base.path().join("frames/999"));
        assert_eq!(trigger.pulse_pairs, 1);
        assert!(source.closed);

        assert_eq!(summary.record.t1, Timestamp::new(999, 900_000_000));
        assert_eq!(summary.record.t2, Timestamp::new(1000, 50_000_000));
        assert_eq!(summary.record.t3, Timestamp::new(1000, 200_000_000));
    }

    #[test]
    fn test_frame_files_unique_and_ordered() {
        let base = tempfile::tempdir().expect("Cannot create temp dir");
        let config = small_config(base.path(), 3);

        let mut source = MockSource::solid(3, 8, 8, [120, 80, 40]);
        let mut trigger = MockTrigger::new();
        let clock = MockClock::new(readings());

        let summary = run_session(&config, &mut source, &mut trigger, &clock)
            .expect("Session should succeed");

        let mut stems: Vec<String> = std::fs::read_dir(&summary.directory)
            .expect("Cannot list session")
            .map(|e| e.expect("Cannot read entry").file_name().into_string().unwrap())
            .filter(|n| n.ends_with(".png"))
            .map(|n| n.trim_end_matches(".png").to_string())
            .collect();
        stems.sort();

        assert_eq!(stems.len(), 3);

        let parsed: Vec<Timestamp> = stems
            .iter()
            .map(|s| Timestamp::parse_fine(s).expect("Filename should parse"))
            .collect();

        assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
    }

    /// A camera failure mid-loop aborts the run, leaving the partial session
    /// without a stats file.
    #[test]
    fn test_mid_session_capture_failure_aborts() {
        let base = tempfile::tempdir().expect("Cannot create temp dir");
        let config = small_config(base.path(), 5);

        // Only 2 frames available for a 5 frame target
        let mut source = MockSource::solid(2, 8, 8, [120, 80, 40]);
        let mut trigger = MockTrigger::new();
        let clock = MockClock::new(readings());

        let result = run_session(&config, &mut source, &mut trigger, &clock);
        assert!(matches!(result, Err(Error::Capture(_))));

        let session_dir = base.path().join("frames/999");
        assert!(session_dir.is_dir());
        assert!(!session_dir.join("stats.txt").exists());

        let pngs = std::fs::read_dir(&session_dir)
            .expect("Cannot list session")
            .filter(|e| {
                e.as_ref()
                    .expect("Cannot read entry")
                    .path()
                    .extension()
                    .map_or(false, |x| x == "png")
            })
            .count();
        assert_eq!(pngs, 2);
    }

    #[test]
    fn test_zero_frame_count_refused_before_any_artifact() {
        let base = tempfile::tempdir().expect("Cannot create temp dir");
        let config = small_config(base.path(), 0);

        let mut source = MockSource::solid(1, 8, 8, [0, 0, 0]);
        let mut trigger = MockTrigger::new();
        let clock = MockClock::new(readings());

        let result = run_session(&config, &mut source, &mut trigger, &clock);

        assert!(matches!(result, Err(Error::InvalidFrameCount)));
        assert!(!base.path().join("frames").exists());
        assert_eq!(trigger.pulse_pairs, 0);
    }

    #[test]
    fn test_color_mode_respected() {
        let base = tempfile::tempdir().expect("Cannot create temp dir");
        let config = CaptureConfig {
            color_mode: ColorMode::Color,
            ..small_config(base.path(), 1)
        };

        let mut source = MockSource::solid(1, 8, 8, [120, 80, 40]);
        let mut trigger = MockTrigger::new();
        let clock = MockClock::new(readings());

        let summary = run_session(&config, &mut source, &mut trigger, &clock)
            .expect("Session should succeed");

        let path = summary.directory.join("1000.05.png");
        let written = image::open(path).expect("Cannot reopen frame");
        assert!(matches!(written, image::DynamicImage::ImageRgb8(_)));
    }
}
