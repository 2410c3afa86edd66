//! Drum kit: synthetic percussion recipes addressed by short codes.
//!
//! A hit is one or more layers. Each layer is a pitched tone (optionally
//! sweeping down) or a noise burst, with its own filter, gain program and
//! fixed length. The notated duration of a drum hit only advances time; it
//! never stretches the sound.

use super::envelope::{Breakpoint, GainEnvelope, Offset};
use super::filter::FilterKind::{self, BandPass, LowPass};
use super::filter::FilterSpec;
use super::oscillator::Waveform::{self, Sine, Square, Triangle};
use super::{Modulation, Source, Sweep, Tone};

/// Level every decaying drum layer falls to.
const DECAY_TARGET: f64 = 0.01;

/// Signal generator for one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrumSource {
    Tone {
        waveform: Waveform,
        from_hz: f64,
        /// Exponential glide target and time; equal to `from_hz` for a steady pitch.
        to_hz: f64,
        sweep_secs: f64,
    },
    Noise { amplitude: f64 },
}

/// Gain over the life of a layer, in absolute seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrumEnvelope {
    /// Start at `level` and fall exponentially to 0.01 over `secs`.
    Decay { level: f64, secs: f64 },
    Program(&'static [Breakpoint]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrumLayer {
    pub source: DrumSource,
    pub filter: Option<FilterSpec>,
    pub envelope: DrumEnvelope,
    /// Start offset from the hit.
    pub delay: f64,
    /// How long the layer sounds.
    pub length: f64,
}

impl DrumLayer {
    /// Resolve the layer into a tone at `velocity`.
    pub fn tone(&self, velocity: f32) -> Tone {
        let velocity = velocity as f64;
        let envelope = match self.envelope {
            DrumEnvelope::Decay { level, secs } => GainEnvelope::resolve(
                &[
                    Breakpoint::step(Offset::Seconds(0.0), level),
                    Breakpoint::exponential(Offset::Seconds(secs), DECAY_TARGET),
                ],
                self.length,
                velocity,
            ),
            DrumEnvelope::Program(program) => {
                GainEnvelope::resolve(program, self.length, velocity)
            }
        };

        let source = match self.source {
            DrumSource::Tone {
                waveform,
                from_hz,
                to_hz,
                sweep_secs,
            } => Source::Oscillator {
                waveform,
                freq_hz: from_hz,
                sweep: (to_hz != from_hz && sweep_secs > 0.0).then_some(Sweep {
                    to_hz,
                    secs: sweep_secs,
                }),
            },
            DrumSource::Noise { amplitude } => Source::Noise { amplitude },
        };

        Tone {
            source,
            filter: self.filter,
            envelope,
            modulation: Modulation::None,
        }
    }
}

/// A named drum sound and the codes that select it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrumVoice {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub layers: &'static [DrumLayer],
}

impl DrumVoice {
    /// Time from the hit until the last layer stops.
    pub fn length(&self) -> f64 {
        self.layers
            .iter()
            .map(|l| l.delay + l.length)
            .fold(0.0, f64::max)
    }

    fn answers_to(&self, code: &str) -> bool {
        self.name == code || self.aliases.contains(&code)
    }
}

const fn steady(waveform: Waveform, hz: f64) -> DrumSource {
    DrumSource::Tone {
        waveform,
        from_hz: hz,
        to_hz: hz,
        sweep_secs: 0.0,
    }
}

const fn sweep(waveform: Waveform, from_hz: f64, to_hz: f64, sweep_secs: f64) -> DrumSource {
    DrumSource::Tone {
        waveform,
        from_hz,
        to_hz,
        sweep_secs,
    }
}

const NOISE: DrumSource = DrumSource::Noise { amplitude: 1.0 };

const fn filtered(kind: FilterKind, cutoff_hz: f64, q: f64) -> Option<FilterSpec> {
    Some(FilterSpec { kind, cutoff_hz, q })
}

const fn highpass(cutoff_hz: f64) -> Option<FilterSpec> {
    filtered(FilterKind::HighPass, cutoff_hz, 1.0)
}

/// A layer that decays from `level` over its whole `length`.
const fn hit(
    source: DrumSource,
    filter: Option<FilterSpec>,
    level: f64,
    length: f64,
) -> DrumLayer {
    DrumLayer {
        source,
        filter,
        envelope: DrumEnvelope::Decay {
            level,
            secs: length,
        },
        delay: 0.0,
        length,
    }
}

const fn after(mut layer: DrumLayer, delay: f64) -> DrumLayer {
    layer.delay = delay;
    layer
}

const RATCHET_CLICK: &[Breakpoint] = &[Breakpoint::step(Offset::Seconds(0.0), 0.6)];

const REVERSE_SWELL: &[Breakpoint] = &[
    Breakpoint::step(Offset::Seconds(0.0), 0.01),
    Breakpoint::exponential(Offset::Seconds(0.8), 0.8),
    Breakpoint::exponential(Offset::Seconds(1.0), 0.01),
];

const GATED: &[Breakpoint] = &[
    Breakpoint::step(Offset::Seconds(0.0), 0.8),
    Breakpoint::exponential(Offset::Seconds(0.05), 0.01),
    Breakpoint::step(Offset::Seconds(0.05), 0.01),
    Breakpoint::exponential(Offset::Seconds(0.1), 0.6),
    Breakpoint::exponential(Offset::Seconds(0.6), 0.01),
];

/// Played for any code not in [`DRUM_KIT`].
pub static GENERIC_DRUM: DrumVoice = DrumVoice {
    name: "generic",
    aliases: &[],
    layers: &[DrumLayer {
        source: sweep(Triangle, 100.0, 40.0, 0.15),
        filter: None,
        envelope: DrumEnvelope::Decay {
            level: 0.7,
            secs: 0.2,
        },
        delay: 0.0,
        length: 0.2,
    }],
};

pub static DRUM_KIT: &[DrumVoice] = &[
    // Basic kit
    DrumVoice {
        name: "kick",
        aliases: &["k"],
        layers: &[hit(sweep(Sine, 150.0, 0.01, 0.1), None, 1.0, 0.1)],
    },
    DrumVoice {
        name: "snare",
        aliases: &["s"],
        layers: &[hit(NOISE, None, 0.8, 0.1)],
    },
    DrumVoice {
        name: "hihat",
        aliases: &["h"],
        layers: &[DrumLayer {
            source: NOISE,
            filter: highpass(7000.0),
            envelope: DrumEnvelope::Decay {
                level: 0.4,
                secs: 0.02,
            },
            delay: 0.0,
            length: 0.05,
        }],
    },
    DrumVoice {
        name: "open_hihat",
        aliases: &["o"],
        layers: &[hit(NOISE, highpass(7000.0), 0.4, 0.15)],
    },
    DrumVoice {
        name: "crash",
        aliases: &["c"],
        layers: &[hit(NOISE, highpass(4000.0), 0.6, 0.8)],
    },
    DrumVoice {
        name: "ride",
        aliases: &["r"],
        layers: &[
            hit(steady(Triangle, 800.0), highpass(600.0), 0.3, 1.0),
            hit(steady(Sine, 1200.0), highpass(600.0), 0.3, 1.0),
        ],
    },
    DrumVoice {
        name: "tom",
        aliases: &["t"],
        layers: &[hit(sweep(Sine, 200.0, 50.0, 0.2), None, 0.8, 0.3)],
    },
    DrumVoice {
        name: "floor_tom",
        aliases: &["f"],
        layers: &[hit(sweep(Sine, 120.0, 30.0, 0.4), None, 0.9, 0.5)],
    },
    // Extended percussion
    DrumVoice {
        name: "splash",
        aliases: &["sp"],
        layers: &[hit(NOISE, highpass(5000.0), 0.5, 0.3)],
    },
    DrumVoice {
        name: "china",
        aliases: &["ch"],
        layers: &[hit(NOISE, filtered(BandPass, 3000.0, 0.5), 0.7, 1.0)],
    },
    DrumVoice {
        name: "ride_bell",
        aliases: &["rb"],
        layers: &[hit(
            steady(Triangle, 2000.0),
            filtered(FilterKind::HighPass, 1500.0, 8.0),
            0.6,
            0.3,
        )],
    },
    DrumVoice {
        name: "cowbell",
        aliases: &["cb"],
        layers: &[
            hit(steady(Square, 800.0), filtered(BandPass, 800.0, 4.0), 0.5, 0.2),
            hit(steady(Triangle, 540.0), filtered(BandPass, 800.0, 4.0), 0.5, 0.2),
        ],
    },
    DrumVoice {
        name: "wood_block",
        aliases: &["wb"],
        layers: &[hit(NOISE, filtered(BandPass, 2000.0, 8.0), 0.7, 0.08)],
    },
    DrumVoice {
        name: "clap",
        aliases: &["cl"],
        layers: &[
            hit(NOISE, highpass(2000.0), 0.4, 0.04),
            after(hit(NOISE, highpass(2000.0), 0.4, 0.04), 0.01),
            after(hit(NOISE, highpass(2000.0), 0.4, 0.04), 0.02),
        ],
    },
    DrumVoice {
        name: "tambourine",
        aliases: &["tam"],
        layers: &[hit(NOISE, highpass(4000.0), 0.5, 0.15)],
    },
    DrumVoice {
        name: "shaker",
        aliases: &["sha"],
        layers: &[hit(NOISE, highpass(6000.0), 0.3, 0.12)],
    },
    DrumVoice {
        name: "cabasa",
        aliases: &["ca"],
        layers: &[hit(NOISE, filtered(BandPass, 5000.0, 2.0), 0.4, 0.1)],
    },
    DrumVoice {
        name: "maracas",
        aliases: &["ma"],
        layers: &[hit(NOISE, highpass(8000.0), 0.4, 0.08)],
    },
    // Hand and ethnic drums
    DrumVoice {
        name: "frame_drum",
        aliases: &["d", "doli"],
        layers: &[hit(
            sweep(Sine, 200.0, 80.0, 0.1),
            filtered(BandPass, 300.0, 2.0),
            0.8,
            0.15,
        )],
    },
    DrumVoice {
        name: "tabla",
        aliases: &["ta"],
        layers: &[
            hit(sweep(Sine, 200.0, 80.0, 0.15), None, 0.7, 0.25),
            hit(sweep(Triangle, 400.0, 150.0, 0.1), None, 0.7, 0.25),
        ],
    },
    DrumVoice {
        name: "bongo",
        aliases: &[],
        layers: &[hit(
            sweep(Triangle, 300.0, 180.0, 0.12),
            filtered(BandPass, 400.0, 3.0),
            0.6,
            0.18,
        )],
    },
    DrumVoice {
        name: "conga",
        aliases: &[],
        layers: &[hit(
            sweep(Sine, 220.0, 120.0, 0.2),
            filtered(LowPass, 800.0, 2.0),
            0.8,
            0.3,
        )],
    },
    DrumVoice {
        name: "djembe",
        aliases: &[],
        layers: &[
            hit(
                sweep(Sine, 180.0, 60.0, 0.2),
                filtered(LowPass, 1200.0, 1.0),
                0.8,
                0.35,
            ),
            hit(
                sweep(Triangle, 400.0, 200.0, 0.15),
                filtered(LowPass, 1200.0, 1.0),
                0.8,
                0.35,
            ),
        ],
    },
    DrumVoice {
        name: "cajon",
        aliases: &["cai"],
        layers: &[
            hit(sweep(Triangle, 120.0, 40.0, 0.15), None, 0.7, 0.2),
            hit(NOISE, highpass(1000.0), 0.3, 0.1),
        ],
    },
    DrumVoice {
        name: "timbale",
        aliases: &["ti"],
        layers: &[hit(
            sweep(Triangle, 350.0, 200.0, 0.15),
            filtered(BandPass, 600.0, 4.0),
            0.7,
            0.25,
        )],
    },
    DrumVoice {
        name: "udu",
        aliases: &["uk"],
        layers: &[hit(
            sweep(Sine, 160.0, 80.0, 0.3),
            filtered(LowPass, 600.0, 3.0),
            0.8,
            0.4,
        )],
    },
    // Orchestral
    DrumVoice {
        name: "timpani",
        aliases: &["tim"],
        layers: &[hit(
            sweep(Sine, 200.0, 160.0, 0.5),
            filtered(LowPass, 400.0, 1.0),
            1.0,
            2.0,
        )],
    },
    DrumVoice {
        name: "gong",
        aliases: &[],
        layers: &[
            hit(steady(Triangle, 100.0), filtered(LowPass, 2000.0, 0.5), 0.8, 3.0),
            hit(steady(Sine, 200.0), filtered(LowPass, 2000.0, 0.5), 0.8, 3.0),
            hit(steady(Triangle, 300.0), filtered(LowPass, 2000.0, 0.5), 0.8, 3.0),
        ],
    },
    DrumVoice {
        name: "triangle",
        aliases: &["tri"],
        layers: &[
            hit(steady(Sine, 2000.0), None, 0.3, 2.0),
            hit(steady(Sine, 3000.0), None, 0.3, 2.0),
        ],
    },
    DrumVoice {
        name: "suspended_cymbal",
        aliases: &["sus"],
        layers: &[hit(NOISE, highpass(3000.0), 0.6, 2.5)],
    },
    DrumVoice {
        name: "vibraslap",
        aliases: &["vib"],
        layers: &[hit(NOISE, filtered(BandPass, 3000.0, 4.0), 0.5, 0.3)],
    },
    DrumVoice {
        name: "wind_chimes",
        aliases: &["ws"],
        layers: &[
            hit(steady(Sine, 800.0), None, 0.2, 1.5),
            after(hit(steady(Sine, 1000.0), None, 0.2, 1.5), 0.05),
            after(hit(steady(Sine, 1200.0), None, 0.2, 1.5), 0.10),
            after(hit(steady(Sine, 1500.0), None, 0.2, 1.5), 0.15),
            after(hit(steady(Sine, 1800.0), None, 0.2, 1.5), 0.20),
        ],
    },
    DrumVoice {
        name: "ratchet",
        aliases: &["ra"],
        layers: &[
            ratchet_click(0.00),
            ratchet_click(0.02),
            ratchet_click(0.04),
            ratchet_click(0.06),
            ratchet_click(0.08),
            ratchet_click(0.10),
            ratchet_click(0.12),
            ratchet_click(0.14),
        ],
    },
    DrumVoice {
        name: "whip",
        aliases: &["wh"],
        layers: &[hit(NOISE, filtered(BandPass, 2500.0, 10.0), 0.8, 0.08)],
    },
    // Electronic
    DrumVoice {
        name: "kick_808",
        aliases: &["808"],
        layers: &[hit(
            sweep(Sine, 80.0, 20.0, 0.2),
            filtered(LowPass, 200.0, 2.0),
            1.0,
            0.3,
        )],
    },
    DrumVoice {
        name: "electronic_snare",
        aliases: &["elec"],
        layers: &[
            hit(steady(Triangle, 200.0), None, 0.6, 0.1),
            hit(NOISE, filtered(FilterKind::HighPass, 2000.0, 4.0), 0.8, 0.12),
        ],
    },
    DrumVoice {
        name: "reverse_cymbal",
        aliases: &["rev"],
        layers: &[DrumLayer {
            source: NOISE,
            filter: highpass(4000.0),
            envelope: DrumEnvelope::Program(REVERSE_SWELL),
            delay: 0.0,
            length: 1.0,
        }],
    },
    DrumVoice {
        name: "gated_snare",
        aliases: &["gat"],
        layers: &[DrumLayer {
            source: NOISE,
            filter: filtered(BandPass, 1000.0, 4.0),
            envelope: DrumEnvelope::Program(GATED),
            delay: 0.0,
            length: 0.6,
        }],
    },
];

const fn ratchet_click(delay: f64) -> DrumLayer {
    DrumLayer {
        source: DrumSource::Noise { amplitude: 0.4 },
        filter: None,
        envelope: DrumEnvelope::Program(RATCHET_CLICK),
        delay,
        length: 0.02,
    }
}

/// Look up a drum sound by code or full name, ignoring case.
///
/// Unknown codes get [`GENERIC_DRUM`].
pub fn drum_profile_for(code: &str) -> &'static DrumVoice {
    let key = code.trim().to_ascii_lowercase();
    DRUM_KIT
        .iter()
        .find(|v| v.answers_to(&key))
        .unwrap_or(&GENERIC_DRUM)
}
