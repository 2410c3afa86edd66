//! Musical durations measured in integer ticks.
//!
//! Uses 960 PPQN (pulses per quarter note) so that notated durations such as
//! `0.5`, `0.25` or `0.75` are exact and summing many of them never drifts.
//! Conversion to seconds only happens at the scheduling boundary.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ticks per quarter note (beat). 960 divides cleanly by 2, 3, 4, 5, 6, 8,
/// 10, 12, 15, 16, 20, 24, 32 and so on.
pub const TICKS_PER_BEAT: u64 = 960;

/// Longest fractional part accepted when parsing a decimal duration.
const MAX_FRACTION_DIGITS: usize = 24;

/// A length of musical time in integer ticks at [`TICKS_PER_BEAT`] resolution.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Beat {
    ticks: u64,
}

impl Beat {
    /// No time at all.
    pub const ZERO: Beat = Beat { ticks: 0 };

    /// Create a `Beat` from a raw tick count.
    pub const fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Create a `Beat` from whole beats (quarter notes).
    pub const fn from_beats(beats: u32) -> Self {
        Self {
            ticks: beats as u64 * TICKS_PER_BEAT,
        }
    }

    /// Create a `Beat` from a fractional beat value, rounding to the nearest tick.
    /// Negative and non-finite inputs become zero.
    pub fn from_beats_f64(beats: f64) -> Self {
        if !beats.is_finite() || beats <= 0.0 {
            return Self::ZERO;
        }
        Self {
            ticks: (beats * TICKS_PER_BEAT as f64).round() as u64,
        }
    }

    /// Parse a notated decimal duration: `digits` or `digits "." digits`.
    ///
    /// Signs, exponents and surrounding whitespace are rejected. The result
    /// may be zero; callers decide whether zero is acceptable.
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (text, None),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let whole: u64 = whole.parse().ok()?;
        let mut ticks = whole.checked_mul(TICKS_PER_BEAT)?;

        if let Some(fraction) = fraction {
            if fraction.is_empty()
                || fraction.len() > MAX_FRACTION_DIGITS
                || !fraction.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }
            let numerator: u128 = fraction.parse().ok()?;
            let denominator = 10u128.pow(fraction.len() as u32);
            let scaled = numerator * TICKS_PER_BEAT as u128;
            let rounded = (scaled + denominator / 2) / denominator;
            ticks = ticks.checked_add(rounded as u64)?;
        }

        Some(Self { ticks })
    }

    /// Return the raw tick count.
    pub fn ticks(self) -> u64 {
        self.ticks
    }

    /// Whether this is a zero-length duration.
    pub fn is_zero(self) -> bool {
        self.ticks == 0
    }

    /// Convert to a floating-point beat value.
    pub fn as_beats_f64(self) -> f64 {
        self.ticks as f64 / TICKS_PER_BEAT as f64
    }

    /// Wall-clock length of this duration at `bpm` beats per minute.
    pub fn to_seconds(self, bpm: u32) -> f64 {
        if bpm == 0 {
            return 0.0;
        }
        self.as_beats_f64() * 60.0 / bpm as f64
    }
}

impl Ord for Beat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ticks.cmp(&other.ticks)
    }
}

impl PartialOrd for Beat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Beat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks.saturating_add(rhs.ticks),
        }
    }
}

impl Sum for Beat {
    fn sum<I: Iterator<Item = Beat>>(iter: I) -> Self {
        iter.fold(Beat::ZERO, |acc, b| acc + b)
    }
}

/// Shortest decimal form: `1`, `0.5`, `0.25`.
impl fmt::Display for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ticks % TICKS_PER_BEAT == 0 {
            write!(f, "{}", self.ticks / TICKS_PER_BEAT)
        } else {
            write!(f, "{}", self.as_beats_f64())
        }
    }
}

impl Serialize for Beat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_beats_f64())
    }
}

impl<'de> Deserialize<'de> for Beat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let beats = f64::deserialize(deserializer)?;
        Ok(Beat::from_beats_f64(beats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_zero_ticks() {
        assert_eq!(Beat::ZERO.ticks(), 0);
        assert!(Beat::ZERO.is_zero());
    }

    #[test]
    fn from_beats_converts_correctly() {
        assert_eq!(Beat::from_beats(1).ticks(), TICKS_PER_BEAT);
        assert_eq!(Beat::from_beats(4).ticks(), 4 * TICKS_PER_BEAT);
    }

    #[test]
    fn from_beats_f64_fractional() {
        assert_eq!(Beat::from_beats_f64(0.5).ticks(), TICKS_PER_BEAT / 2);
        assert_eq!(
            Beat::from_beats_f64(1.5).ticks(),
            TICKS_PER_BEAT + TICKS_PER_BEAT / 2
        );
    }

    #[test]
    fn from_beats_f64_rejects_negative() {
        assert!(Beat::from_beats_f64(-1.0).is_zero());
        assert!(Beat::from_beats_f64(f64::NAN).is_zero());
    }

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(Beat::parse_decimal("1"), Some(Beat::from_beats(1)));
        assert_eq!(Beat::parse_decimal("4"), Some(Beat::from_beats(4)));
        assert_eq!(Beat::parse_decimal("0.5"), Some(Beat::from_ticks(480)));
        assert_eq!(Beat::parse_decimal("0.25"), Some(Beat::from_ticks(240)));
        assert_eq!(Beat::parse_decimal("0.75"), Some(Beat::from_ticks(720)));
        assert_eq!(Beat::parse_decimal("1.5"), Some(Beat::from_ticks(1440)));
    }

    #[test]
    fn parse_zero_is_allowed_here() {
        assert_eq!(Beat::parse_decimal("0"), Some(Beat::ZERO));
        assert_eq!(Beat::parse_decimal("0.0"), Some(Beat::ZERO));
    }

    #[test]
    fn parse_rejects_malformed() {
        for text in ["", ".5", "5.", "-1", "+1", "1e3", "1.2.3", " 1", "abc", "1.x"] {
            assert_eq!(Beat::parse_decimal(text), None, "accepted {text:?}");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert_eq!(Beat::parse_decimal("99999999999999999999"), None);
    }

    #[test]
    fn seconds_at_tempo() {
        assert!((Beat::from_beats(1).to_seconds(120) - 0.5).abs() < f64::EPSILON);
        assert!((Beat::from_beats(2).to_seconds(60) - 2.0).abs() < f64::EPSILON);
        assert_eq!(Beat::from_beats(1).to_seconds(0), 0.0);
    }

    #[test]
    fn addition_and_sum() {
        let total: Beat = [1u32, 2, 3].iter().map(|&b| Beat::from_beats(b)).sum();
        assert_eq!(total, Beat::from_beats(6));
        assert_eq!(Beat::from_beats(1) + Beat::ZERO, Beat::from_beats(1));
    }

    #[test]
    fn ordering() {
        assert!(Beat::from_beats(1) < Beat::from_beats(2));
        assert_eq!(
            Beat::from_beats(1).max(Beat::from_ticks(480)),
            Beat::from_beats(1)
        );
    }

    #[test]
    fn display_shortest_form() {
        assert_eq!(Beat::from_beats(1).to_string(), "1");
        assert_eq!(Beat::from_ticks(480).to_string(), "0.5");
        assert_eq!(Beat::from_ticks(240).to_string(), "0.25");
        assert_eq!(Beat::from_ticks(1440).to_string(), "1.5");
    }

    #[test]
    fn display_reparses_to_same_ticks() {
        for ticks in [1u64, 60, 320, 480, 640, 1000, 2400] {
            let b = Beat::from_ticks(ticks);
            assert_eq!(Beat::parse_decimal(&b.to_string()), Some(b));
        }
    }
}
