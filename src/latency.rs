//! # Latency record
//!
//! The derived timing summary relating trigger completion (`t1`) to the first
//! (`t2`) and last (`t3`) captured frames. Computation is pure and exact:
//! timestamps subtract in integer nanoseconds, so repeated computation over
//! the same readings always produces identical output.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::clock::{TimeDelta, Timestamp};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// Timing summary of one acquisition session. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyRecord {
    /// Trigger-complete time.
    pub t1: Timestamp,

    /// First-frame time.
    pub t2: Timestamp,

    /// Last-frame time.
    pub t3: Timestamp,

    /// Trigger-to-first-frame latency, `t2 - t1`.
    pub t_diff: TimeDelta,

    /// Trigger-to-last-frame span, `t3 - t1`.
    pub t_total: TimeDelta,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl LatencyRecord {
    /// Derive the latency summary from the three recorded clock readings.
    pub fn compute(t1: Timestamp, t2: Timestamp, t3: Timestamp) -> Self {
        Self {
            t1,
            t2,
            t3,
            t_diff: t2.delta_since(t1),
            t_total: t3.delta_since(t1),
        }
    }

    /// The four human-readable lines written to the session's `stats.txt`.
    pub fn to_stats_string(&self) -> String {
        format!(
            "t1 = {}\nt2 = {}\nt_diff = {} s\nt_total = {} s\n",
            self.t1, self.t2, self.t_diff, self.t_total
        )
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_compute_is_pure() {
        let t1 = Timestamp::new(999, 900_000_000);
        let t2 = Timestamp::new(1000, 50_000_000);
        let t3 = Timestamp::new(1000, 200_000_000);

        let a = LatencyRecord::compute(t1, t2, t3);
        let b = LatencyRecord::compute(t1, t2, t3);

        assert_eq!(a, b);
        assert_eq!(a.to_stats_string(), b.to_stats_string());
    }

    #[test]
    fn test_stats_lines() {
        let record = LatencyRecord::compute(
            Timestamp::new(999, 900_000_000),
            Timestamp::new(1000, 50_000_000),
            Timestamp::new(1000, 200_000_000),
        );

        let stats = record.to_stats_string();
        let lines: Vec<&str> = stats.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "t1 = 999.9");
        assert_eq!(lines[1], "t2 = 1000.05");
        assert_eq!(lines[2], "t_diff = 0.15 s");
        assert_eq!(lines[3], "t_total = 0.3 s");
    }

    /// For any run where the readings were taken in order, the first frame
    /// cannot precede the trigger and the last cannot precede the first.
    #[test]
    fn test_latency_bounds_for_ordered_readings() {
        let record = LatencyRecord::compute(
            Timestamp::new(1000, 0),
            Timestamp::new(1000, 10_000_000),
            Timestamp::new(1001, 0),
        );

        assert!(!record.t_diff.is_negative());
        assert!(record.t_total >= record.t_diff);
    }

    /// Stats values can be recovered by parsing the rendered lines.
    #[test]
    fn test_stats_roundtrip() {
        let record = LatencyRecord::compute(
            Timestamp::new(999, 900_000_000),
            Timestamp::new(1000, 50_000_000),
            Timestamp::new(1000, 200_000_000),
        );

        let stats = record.to_stats_string();
        let t1_str = stats.lines().next().unwrap().trim_start_matches("t1 = ");

        assert_eq!(Timestamp::parse_fine(t1_str), Some(record.t1));
    }
}
