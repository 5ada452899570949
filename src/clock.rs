//! # Clock module
//!
//! Realtime-clock readings and the two timestamp renderings used throughout an
//! acquisition run: whole seconds (session directory keys) and
//! seconds-plus-fraction (GPIO event and per-frame timestamps).
//!
//! The clock is injected through the [`Clock`] trait so the capture loop can
//! run against a deterministic reading sequence in tests.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// A source of realtime-clock readings with nanosecond resolution.
pub trait Clock {
    /// Read the current time. The platform clock is assumed always available,
    /// so this call cannot fail.
    fn now(&self) -> Timestamp;
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTS
// -----------------------------------------------------------------------------------------------

/// A single realtime-clock reading: whole seconds since the epoch plus the
/// nanosecond remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    /// Whole seconds since the unix epoch.
    pub secs: i64,

    /// Nanoseconds within the current second, always `< 1_000_000_000`.
    pub nanos: u32,
}

/// A signed interval between two [`Timestamp`]s, kept in integer nanoseconds
/// so stats arithmetic and rendering are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeDelta {
    nanos: i128,
}

/// The production clock, backed by the platform realtime clock.
pub struct SystemClock;

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Timestamp {
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Self { secs, nanos }
    }

    /// Render whole-second epoch time. Low resolution is intentional: one
    /// session per distinct second is assumed, and this string keys the
    /// session directory.
    pub fn format_coarse(&self) -> String {
        self.secs.to_string()
    }

    /// Render `seconds<sep>fraction`, where the fraction is the nanosecond
    /// field zero-padded to nine digits with trailing zeros trimmed (at least
    /// one digit is kept). With `'.'` the result reads as a plain decimal
    /// number of seconds; `'_'` gives a filesystem-friendly variant.
    pub fn format_fine(&self, sep: char) -> String {
        let mut frac = format!("{:09}", self.nanos);
        while frac.len() > 1 && frac.ends_with('0') {
            frac.pop();
        }

        format!("{}{}{}", self.secs, sep, frac)
    }

    /// Parse a `'.'`-separated fine timestamp back into seconds and
    /// nanoseconds. Exact inverse of [`Timestamp::format_fine`] with `'.'`.
    ///
    /// # Returns
    /// - `None` if the string is not `<secs>.<up to 9 fraction digits>`
    pub fn parse_fine(s: &str) -> Option<Self> {
        let mut parts = s.splitn(2, '.');
        let secs: i64 = parts.next()?.parse().ok()?;
        let frac = parts.next()?;

        if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let digits: u32 = frac.parse().ok()?;
        let nanos = digits * 10u32.pow(9 - frac.len() as u32);

        Some(Self { secs, nanos })
    }

    /// Signed interval from `earlier` to `self`.
    pub fn delta_since(&self, earlier: Timestamp) -> TimeDelta {
        let nanos = i128::from(self.secs - earlier.secs) * 1_000_000_000
            + (i128::from(self.nanos) - i128::from(earlier.nanos));

        TimeDelta { nanos }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format_fine('.'))
    }
}

impl TimeDelta {
    pub const fn from_nanos(nanos: i128) -> Self {
        Self { nanos }
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    /// Interval as lossy floating-point seconds, for consumers that want a
    /// number rather than the exact decimal rendering.
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1e9
    }
}

impl fmt::Display for TimeDelta {
    /// Renders as decimal seconds with trailing zeros trimmed, e.g. `0.15`
    /// or `-0.02`. A whole-second interval renders without a fraction.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.nanos < 0 { "-" } else { "" };
        let abs = self.nanos.unsigned_abs();
        let secs = abs / 1_000_000_000;
        let rem = abs % 1_000_000_000;

        if rem == 0 {
            return write!(f, "{}{}", sign, secs);
        }

        let mut frac = format!("{:09}", rem);
        while frac.ends_with('0') {
            frac.pop();
        }

        write!(f, "{}{}.{}", sign, secs, frac)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System clock is before the unix epoch");

        Timestamp {
            secs: since_epoch.as_secs() as i64,
            nanos: since_epoch.subsec_nanos(),
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_format_coarse() {
        assert_eq!(Timestamp::new(1664500000, 999_999_999).format_coarse(), "1664500000");
    }

    #[test]
    fn test_format_fine_trims_trailing_zeros() {
        assert_eq!(Timestamp::new(999, 900_000_000).format_fine('.'), "999.9");
        assert_eq!(Timestamp::new(1000, 50_000_000).format_fine('.'), "1000.05");
        assert_eq!(Timestamp::new(1000, 0).format_fine('.'), "1000.0");
        assert_eq!(Timestamp::new(1000, 123_456_789).format_fine('_'), "1000_123456789");
    }

    #[test]
    fn test_parse_fine_roundtrip() {
        for ts in [
            Timestamp::new(999, 900_000_000),
            Timestamp::new(1000, 50_000_000),
            Timestamp::new(1000, 0),
            Timestamp::new(1664500000, 1),
        ]
        .iter()
        {
            assert_eq!(Timestamp::parse_fine(&ts.format_fine('.')), Some(*ts));
        }
    }

    #[test]
    fn test_parse_fine_rejects_garbage() {
        assert_eq!(Timestamp::parse_fine("1000"), None);
        assert_eq!(Timestamp::parse_fine("1000."), None);
        assert_eq!(Timestamp::parse_fine("1000.0123456789"), None);
        assert_eq!(Timestamp::parse_fine("1000.1a"), None);
    }

    #[test]
    fn test_delta_is_exact() {
        let t1 = Timestamp::new(999, 900_000_000);
        let t2 = Timestamp::new(1000, 50_000_000);

        let delta = t2.delta_since(t1);
        assert_eq!(delta, TimeDelta::from_nanos(150_000_000));
        assert_eq!(delta.to_string(), "0.15");
        assert!(!delta.is_negative());

        let back = t1.delta_since(t2);
        assert_eq!(back.to_string(), "-0.15");
        assert!(back.is_negative());
    }

    #[test]
    fn test_delta_whole_seconds() {
        let delta = Timestamp::new(12, 0).delta_since(Timestamp::new(10, 0));
        assert_eq!(delta.to_string(), "2");
        assert!((delta.as_secs_f64() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_timestamp_ordering_matches_parse_order() {
        let mut stamps = vec![
            Timestamp::new(1000, 200_000_000),
            Timestamp::new(999, 900_000_000),
            Timestamp::new(1000, 50_000_000),
        ];
        stamps.sort();

        assert_eq!(stamps[0], Timestamp::new(999, 900_000_000));
        assert_eq!(stamps[2], Timestamp::new(1000, 200_000_000));
    }

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a.secs > 1_600_000_000);
    }
}
