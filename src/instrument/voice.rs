//! Generic tone interpreter.
//!
//! A [`Voice`] renders one resolved [`Tone`] sample by sample: source,
//! pitch modulation, filter and gain automation. Every instrument and drum
//! layer goes through this one code path.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::envelope::{GainEnvelope, GAIN_FLOOR};
use super::filter::Filter;
use super::oscillator::{Oscillator, Waveform};
use super::{Modulation, Source, Sweep, Tone};

enum Generator {
    Oscillator {
        osc: Oscillator,
        freq_hz: f64,
        sweep: Option<Sweep>,
    },
    Noise {
        rng: ChaCha8Rng,
        amplitude: f64,
    },
}

/// A playing tone. Time starts at zero on the first sample.
pub struct Voice {
    generator: Generator,
    modulation: Modulation,
    /// Sine used for vibrato and FM.
    modulator: Oscillator,
    filter: Filter,
    envelope: GainEnvelope,
    sample_period: f64,
    position: u64,
}

impl Voice {
    /// `seed` drives the noise generator so renders are reproducible.
    pub fn new(tone: &Tone, sample_rate: u32, seed: u64) -> Self {
        Self::from_tone(tone.clone(), sample_rate, seed)
    }

    /// Like [`Voice::new`], taking ownership so nothing is copied.
    pub fn from_tone(tone: Tone, sample_rate: u32, seed: u64) -> Self {
        let generator = match tone.source {
            Source::Oscillator {
                waveform,
                freq_hz,
                sweep,
            } => Generator::Oscillator {
                osc: Oscillator::new(waveform, sample_rate),
                freq_hz,
                sweep,
            },
            Source::Noise { amplitude } => Generator::Noise {
                rng: ChaCha8Rng::seed_from_u64(seed),
                amplitude,
            },
        };
        let filter = match &tone.filter {
            Some(spec) => Filter::new(spec, sample_rate),
            None => Filter::bypass(),
        };

        Self {
            generator,
            modulation: tone.modulation,
            modulator: Oscillator::new(Waveform::Sine, sample_rate),
            filter,
            envelope: tone.envelope,
            sample_period: 1.0 / sample_rate.max(1) as f64,
            position: 0,
        }
    }

    /// Seconds since the voice started.
    pub fn elapsed(&self) -> f64 {
        self.position as f64 * self.sample_period
    }

    pub fn next_sample(&mut self) -> f32 {
        let t = self.elapsed();
        self.position += 1;

        let raw = match &mut self.generator {
            Generator::Oscillator {
                osc,
                freq_hz,
                sweep,
            } => {
                let base = swept_frequency(*freq_hz, *sweep, t);
                let freq = match self.modulation {
                    Modulation::None => base,
                    Modulation::Vibrato { rate_hz, depth } => {
                        base * (1.0 + depth * self.modulator.next_sample(rate_hz))
                    }
                    Modulation::Fm { ratio, index } => {
                        base + index * base * self.modulator.next_sample(base * ratio)
                    }
                };
                osc.next_sample(freq)
            }
            Generator::Noise { rng, amplitude } => rng.gen_range(-1.0..1.0) * *amplitude,
        };

        let filtered = self.filter.run(raw as f32);
        filtered * self.envelope.value_at(t) as f32
    }
}

/// Frequency at `t` for an exponential glide, held at the target afterwards.
fn swept_frequency(from_hz: f64, sweep: Option<Sweep>, t: f64) -> f64 {
    match sweep {
        Some(Sweep { to_hz, secs }) if secs > 0.0 && from_hz > 0.0 => {
            let to = to_hz.max(GAIN_FLOOR);
            let progress = (t / secs).clamp(0.0, 1.0);
            from_hz * (to / from_hz).powf(progress)
        }
        _ => from_hz,
    }
}
