//! Instruments: the voice profile table and the interpreter that renders it.
//!
//! Every instrument is a [`VoiceProfile`] record (oscillator, filter rule,
//! envelope program and optional unison or modulation). Drum sounds are
//! [`DrumVoice`] recipes of one or more layers. Both resolve into [`Tone`]s,
//! which a [`Voice`] renders sample by sample.

pub mod catalog;
pub mod drum_kit;
pub mod envelope;
pub mod filter;
pub mod oscillator;
pub mod voice;

pub use drum_kit::{drum_profile_for, DrumLayer, DrumSource, DrumVoice};
pub use envelope::{Breakpoint, GainEnvelope, Offset, Ramp};
pub use filter::{FilterKind, FilterSpec};
pub use oscillator::Waveform;
pub use voice::Voice;

use serde::{Deserialize, Serialize};

/// Melodic notes peak at `velocity * PEAK_SCALE`.
pub const PEAK_SCALE: f64 = 0.3;

/// How a profile derives its filter cutoff from the note frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutoffRule {
    /// A fixed cutoff in Hz.
    Fixed(f64),
    /// `min(ceiling, f * multiplier)`, or just `f * multiplier` without a ceiling.
    Tracking { multiplier: f64, ceiling: Option<f64> },
}

impl CutoffRule {
    pub fn resolve(self, freq_hz: f64) -> f64 {
        match self {
            CutoffRule::Fixed(hz) => hz,
            CutoffRule::Tracking {
                multiplier,
                ceiling: Some(ceiling),
            } => (freq_hz * multiplier).min(ceiling),
            CutoffRule::Tracking {
                multiplier,
                ceiling: None,
            } => freq_hz * multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterRule {
    pub kind: FilterKind,
    pub cutoff: CutoffRule,
    pub q: f64,
}

impl FilterRule {
    pub fn resolve(&self, freq_hz: f64) -> FilterSpec {
        FilterSpec {
            kind: self.kind,
            cutoff_hz: self.cutoff.resolve(freq_hz),
            q: self.q,
        }
    }
}

/// Pitch modulation applied to a tone's oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modulation {
    #[default]
    None,
    /// Sine LFO; `depth` is a fraction of the carrier frequency.
    Vibrato { rate_hz: f64, depth: f64 },
    /// Sine modulator at `ratio * f`; peak deviation is `index * f`.
    Fm { ratio: f64, index: f64 },
}

/// Several detuned copies of the same note, spread evenly around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unison {
    pub voices: u8,
    /// Detune between neighbouring voices.
    pub spread_cents: f64,
}

impl Unison {
    /// Detune of voice `i` in cents, centred on zero.
    pub fn detune_cents(&self, i: u8) -> f64 {
        let centre = (self.voices.max(1) - 1) as f64 / 2.0;
        (i as f64 - centre) * self.spread_cents
    }
}

/// A named instrument recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceProfile {
    pub name: &'static str,
    pub waveform: Waveform,
    pub filter: FilterRule,
    /// Gains are multiples of the peak level, offsets scale with note length.
    pub envelope: &'static [Breakpoint],
    pub unison: Option<Unison>,
    pub modulation: Modulation,
}

impl VoiceProfile {
    /// Resolve this profile for one note.
    ///
    /// `length_secs` is the notated length; the envelope is laid out over it.
    /// Returns one tone per unison voice.
    pub fn tones(&self, freq_hz: f64, length_secs: f64, velocity: f32) -> Vec<Tone> {
        let peak = velocity as f64 * PEAK_SCALE;
        let envelope = GainEnvelope::resolve(self.envelope, length_secs, peak);
        let filter = Some(self.filter.resolve(freq_hz));

        let detunes: Vec<f64> = match self.unison {
            Some(unison) if unison.voices > 1 => {
                (0..unison.voices).map(|i| unison.detune_cents(i)).collect()
            }
            _ => vec![0.0],
        };

        detunes
            .into_iter()
            .map(|cents| Tone {
                source: Source::Oscillator {
                    waveform: self.waveform,
                    freq_hz: freq_hz * oscillator::cents_to_ratio(cents),
                    sweep: None,
                },
                filter,
                envelope: envelope.clone(),
                modulation: self.modulation,
            })
            .collect()
    }
}

/// Exponential pitch glide from the start frequency to `to_hz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub to_hz: f64,
    pub secs: f64,
}

/// What generates the raw signal of a tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Oscillator {
        waveform: Waveform,
        freq_hz: f64,
        sweep: Option<Sweep>,
    },
    /// Uniform white noise in `-amplitude..amplitude`.
    Noise { amplitude: f64 },
}

/// A fully resolved sound: source, optional filter, gain automation and
/// modulation. Times inside are relative to the tone's own start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub source: Source,
    pub filter: Option<FilterSpec>,
    pub envelope: GainEnvelope,
    pub modulation: Modulation,
}

/// Look up the profile for an instrument name.
///
/// Matching ignores case and surrounding whitespace. Unknown names get
/// [`catalog::DEFAULT_PROFILE`].
pub fn profile_for(name: &str) -> &'static VoiceProfile {
    let key = name.trim().to_ascii_lowercase();
    catalog::CATALOG
        .iter()
        .find(|p| p.name == key)
        .unwrap_or(&catalog::DEFAULT_PROFILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn tracking_cutoff_with_ceiling() {
        let rule = CutoffRule::Tracking {
            multiplier: 4.0,
            ceiling: Some(2000.0),
        };
        assert_eq!(rule.resolve(261.63 * 1.0), 261.63 * 4.0);
        assert_eq!(rule.resolve(880.0), 2000.0);
        assert_eq!(CutoffRule::Fixed(300.0).resolve(50.0), 300.0);
    }

    #[test]
    fn profile_lookup_ignores_case() {
        assert_eq!(profile_for("Piano").name, "piano");
        assert_eq!(profile_for("  ORGAN ").name, "organ");
    }

    #[test]
    fn unknown_instrument_gets_default() {
        let p = profile_for("kazoo");
        assert_eq!(p.name, catalog::DEFAULT_PROFILE.name);
        assert_eq!(p.waveform, Waveform::Sine);
        assert_eq!(p.filter.kind, FilterKind::AllPass);
        assert_eq!(p.filter.resolve(440.0).cutoff_hz, 440.0);
    }

    #[test]
    fn piano_peak_is_scaled_velocity() {
        let tones = profile_for("piano").tones(440.0, 0.5, 1.0);
        assert_eq!(tones.len(), 1);
        assert_approx_eq!(tones[0].envelope.value_at(0.0), 0.3, 1e-12);
        let filter = tones[0].filter.unwrap();
        assert_eq!(filter.kind, FilterKind::LowPass);
        assert_eq!(filter.cutoff_hz, 1760.0);
    }

    #[test]
    fn choir_spreads_unison_voices() {
        let tones = profile_for("choir").tones(440.0, 1.0, 1.0);
        assert_eq!(tones.len(), 3);
        let freqs: Vec<f64> = tones
            .iter()
            .map(|t| match t.source {
                Source::Oscillator { freq_hz, .. } => freq_hz,
                Source::Noise { .. } => panic!("choir should be pitched"),
            })
            .collect();
        assert!(freqs[0] < 440.0 && freqs[2] > 440.0);
        assert_approx_eq!(freqs[1], 440.0, 1e-9);
    }

    #[test]
    fn unison_detune_is_centred() {
        let u = Unison {
            voices: 3,
            spread_cents: 5.0,
        };
        assert_eq!(u.detune_cents(0), -5.0);
        assert_eq!(u.detune_cents(1), 0.0);
        assert_eq!(u.detune_cents(2), 5.0);
    }
}
