//! Gain envelope programs.
//!
//! An envelope is an ordered list of breakpoints, each reached by a step, a
//! linear ramp or an exponential ramp from the previous breakpoint. Times are
//! relative to note onset and resolved against the note's length in seconds,
//! gains against the note's peak level.

use serde::{Deserialize, Serialize};

/// Lowest level an exponential ramp may start from or aim at.
pub const GAIN_FLOOR: f64 = 0.0001;

/// How a breakpoint is reached from the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ramp {
    /// Jump to the value at the breakpoint time.
    Step,
    Linear,
    Exponential,
}

/// When a breakpoint happens, relative to note onset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    /// Absolute seconds, capped at the note length.
    Seconds(f64),
    /// A fraction of the note length.
    Fraction(f64),
}

impl Offset {
    /// The end of the note.
    pub const END: Offset = Offset::Fraction(1.0);

    pub fn resolve(self, length: f64) -> f64 {
        match self {
            Offset::Seconds(s) => s.min(length),
            Offset::Fraction(f) => f * length,
        }
        .max(0.0)
    }
}

/// One point of an envelope program. `gain` is a multiple of the peak level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub at: Offset,
    pub gain: f64,
    pub ramp: Ramp,
}

impl Breakpoint {
    pub const fn step(at: Offset, gain: f64) -> Self {
        Self {
            at,
            gain,
            ramp: Ramp::Step,
        }
    }

    pub const fn linear(at: Offset, gain: f64) -> Self {
        Self {
            at,
            gain,
            ramp: Ramp::Linear,
        }
    }

    pub const fn exponential(at: Offset, gain: f64) -> Self {
        Self {
            at,
            gain,
            ramp: Ramp::Exponential,
        }
    }
}

/// A breakpoint resolved to seconds and an absolute gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainPoint {
    pub time: f64,
    pub value: f64,
    pub ramp: Ramp,
}

/// Resolved, time-ordered gain automation for one tone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainEnvelope {
    points: Vec<GainPoint>,
}

impl GainEnvelope {
    /// Resolve `program` for a note lasting `length` seconds at `peak` level.
    ///
    /// Breakpoint times never move backwards; a breakpoint earlier than its
    /// predecessor is pushed forward to it. Exponential targets are floored
    /// at [`GAIN_FLOOR`].
    pub fn resolve(program: &[Breakpoint], length: f64, peak: f64) -> Self {
        let mut points = Vec::with_capacity(program.len());
        let mut last = 0.0f64;
        for bp in program {
            let time = bp.at.resolve(length).max(last);
            last = time;
            let mut value = bp.gain * peak;
            if bp.ramp == Ramp::Exponential {
                value = value.max(GAIN_FLOOR);
            }
            points.push(GainPoint {
                time,
                value,
                ramp: bp.ramp,
            });
        }
        Self { points }
    }

    pub fn points(&self) -> &[GainPoint] {
        &self.points
    }

    /// Gain at `t` seconds after onset. Holds the last value after the final
    /// breakpoint and is silent before onset.
    pub fn value_at(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        let mut prev_time = 0.0;
        let mut prev_value = 0.0;
        for point in &self.points {
            if t < point.time {
                let span = point.time - prev_time;
                let progress = ((t - prev_time) / span).clamp(0.0, 1.0);
                return match point.ramp {
                    Ramp::Step => prev_value,
                    Ramp::Linear => prev_value + (point.value - prev_value) * progress,
                    Ramp::Exponential => {
                        let from = prev_value.max(GAIN_FLOOR);
                        let to = point.value.max(GAIN_FLOOR);
                        from * (to / from).powf(progress)
                    }
                };
            }
            prev_time = point.time;
            prev_value = point.value;
        }
        prev_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const PLUCK: &[Breakpoint] = &[
        Breakpoint::step(Offset::Seconds(0.0), 1.0),
        Breakpoint::exponential(Offset::END, 0.2),
    ];

    const SWELL: &[Breakpoint] = &[
        Breakpoint::step(Offset::Seconds(0.0), 0.0),
        Breakpoint::linear(Offset::Seconds(0.1), 0.8),
        Breakpoint::step(Offset::Fraction(0.9), 0.7),
        Breakpoint::linear(Offset::END, 0.0),
    ];

    #[test]
    fn offsets_resolve_against_length() {
        assert_eq!(Offset::Seconds(0.1).resolve(2.0), 0.1);
        assert_eq!(Offset::Seconds(3.0).resolve(2.0), 2.0);
        assert_eq!(Offset::Fraction(0.5).resolve(2.0), 1.0);
        assert_eq!(Offset::END.resolve(2.0), 2.0);
    }

    #[test]
    fn exponential_decay() {
        let env = GainEnvelope::resolve(PLUCK, 1.0, 0.3);
        assert_approx_eq!(env.value_at(0.0), 0.3, 1e-12);
        assert_approx_eq!(env.value_at(0.5), 0.3 * 0.2f64.sqrt(), 1e-9);
        assert_approx_eq!(env.value_at(1.0), 0.06, 1e-12);
        assert_approx_eq!(env.value_at(5.0), 0.06, 1e-12);
    }

    #[test]
    fn linear_attack_then_hold_then_release() {
        let env = GainEnvelope::resolve(SWELL, 1.0, 1.0);
        assert_approx_eq!(env.value_at(0.0), 0.0, 1e-12);
        assert_approx_eq!(env.value_at(0.05), 0.4, 1e-9);
        assert_approx_eq!(env.value_at(0.5), 0.8, 1e-12);
        // Step to 0.7 at 0.9 s, then linear down to zero at 1.0 s.
        assert_approx_eq!(env.value_at(0.95), 0.35, 1e-9);
        assert_approx_eq!(env.value_at(1.0), 0.0, 1e-12);
    }

    #[test]
    fn short_notes_keep_order() {
        // Attack at 0.1 s would land after a 0.05 s note ends.
        let env = GainEnvelope::resolve(SWELL, 0.05, 1.0);
        let times: Vec<f64> = env.points().iter().map(|p| p.time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "{times:?}");
        assert!(env.value_at(0.05).abs() < 1e-12);
    }

    #[test]
    fn exponential_never_reaches_zero() {
        let program = [
            Breakpoint::step(Offset::Seconds(0.0), 1.0),
            Breakpoint::exponential(Offset::END, 0.0),
        ];
        let env = GainEnvelope::resolve(&program, 1.0, 1.0);
        assert_eq!(env.points()[1].value, GAIN_FLOOR);
        assert!(env.value_at(0.999) > 0.0);
    }

    #[test]
    fn silent_before_onset_and_when_empty() {
        let env = GainEnvelope::resolve(PLUCK, 1.0, 1.0);
        assert_eq!(env.value_at(-0.1), 0.0);
        assert_eq!(GainEnvelope::default().value_at(0.3), 0.0);
    }

    #[test]
    fn never_negative() {
        let env = GainEnvelope::resolve(SWELL, 0.8, 0.3);
        for i in 0..2000 {
            let t = i as f64 / 1000.0;
            assert!(env.value_at(t) >= 0.0, "negative gain at {t}");
        }
    }
}
