//! The melodic instrument catalogue.
//!
//! Adding or adjusting an instrument is an edit to this table.

use super::envelope::Breakpoint;
use super::envelope::Offset::{self, Fraction, Seconds};
use super::oscillator::Waveform::{self, Sawtooth, Sine, Square, Triangle};
use super::{CutoffRule, FilterKind, FilterRule, Modulation, Unison, VoiceProfile};

const ONSET: Offset = Seconds(0.0);
const END: Offset = Offset::END;

// Envelope programs. Gains are multiples of the note's peak level.

const DEFAULT: &[Breakpoint] = &[Breakpoint::step(ONSET, 1.0), Breakpoint::linear(END, 0.0)];

const STRUCK: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 1.0),
    Breakpoint::exponential(END, 0.2),
];

const HARPSICHORD: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.9),
    Breakpoint::exponential(Seconds(1.0), 0.05),
];

const BELLOWS: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.05), 0.8),
    Breakpoint::step(Fraction(0.8), 0.7),
    Breakpoint::linear(END, 0.0),
];

const BOWED: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.1), 0.8),
    Breakpoint::step(Fraction(0.9), 0.7),
    Breakpoint::linear(END, 0.0),
];

const PLUCKED: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 1.0),
    Breakpoint::exponential(Seconds(0.1), 0.3),
    Breakpoint::exponential(END, 0.05),
];

const HARP: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.9),
    Breakpoint::exponential(END, 0.1),
];

const RESONANT_PLUCK: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 1.1),
    Breakpoint::exponential(Seconds(0.2), 0.4),
    Breakpoint::exponential(END, 0.1),
];

const BASS: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.8),
    Breakpoint::step(Fraction(0.8), 0.7),
    Breakpoint::exponential(END, 0.0),
];

const BRIGHT_BRASS: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.05), 0.9),
    Breakpoint::step(Fraction(0.8), 0.8),
    Breakpoint::exponential(END, 0.0),
];

const SOFT_BRASS: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.08), 0.8),
    Breakpoint::step(Fraction(0.8), 0.7),
    Breakpoint::exponential(END, 0.0),
];

const TUBA: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.12), 0.7),
    Breakpoint::step(Fraction(0.8), 0.6),
    Breakpoint::exponential(END, 0.0),
];

const FLUTE: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.06), 0.7),
    Breakpoint::step(Fraction(0.9), 0.6),
    Breakpoint::linear(END, 0.0),
];

const RECORDER: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.04), 0.6),
    Breakpoint::step(Fraction(0.9), 0.5),
    Breakpoint::linear(END, 0.0),
];

const REED: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.03), 0.8),
    Breakpoint::step(Fraction(0.9), 0.7),
    Breakpoint::linear(END, 0.0),
];

const DOUBLE_REED: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.04), 0.9),
    Breakpoint::step(Fraction(0.9), 0.7),
    Breakpoint::linear(END, 0.0),
];

const DUDUK: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.08), 0.6),
    Breakpoint::step(Fraction(0.9), 0.5),
    Breakpoint::linear(END, 0.0),
];

const VOCAL: &[Breakpoint] = BOWED;

const MALLET: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 1.0),
    Breakpoint::exponential(Seconds(2.0), 0.1),
];

const VIBRAPHONE: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.8),
    Breakpoint::step(Fraction(0.8), 0.7),
    Breakpoint::exponential(END, 0.1),
];

const CELESTA: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.7),
    Breakpoint::exponential(END, 0.05),
];

const TIMPANI: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 1.0),
    Breakpoint::exponential(Seconds(3.0), 0.1),
];

const TRIANGLE: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.6),
    Breakpoint::exponential(Seconds(4.0), 0.1),
];

const CLICK: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.8),
    Breakpoint::exponential(Seconds(0.1), 0.0),
];

const METAL: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 1.0),
    Breakpoint::exponential(Seconds(5.0), 0.1),
];

const SYNTH: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.02), 1.0),
    Breakpoint::linear(Seconds(0.1), 0.7),
    Breakpoint::step(Fraction(0.7), 0.7),
    Breakpoint::exponential(END, 0.0),
];

const PAD: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.2), 0.6),
    Breakpoint::step(Fraction(0.8), 0.5),
    Breakpoint::linear(END, 0.0),
];

const ARP: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.9),
    Breakpoint::exponential(Seconds(0.5), 0.0),
];

const PLUCK: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 1.0),
    Breakpoint::exponential(Seconds(0.8), 0.1),
];

const POLYSYNTH: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.05), 0.8),
    Breakpoint::step(Fraction(0.7), 0.6),
    Breakpoint::exponential(END, 0.0),
];

const FM: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.01), 0.9),
    Breakpoint::linear(Seconds(0.08), 0.5),
    Breakpoint::step(Fraction(0.6), 0.4),
    Breakpoint::exponential(END, 0.0),
];

const THEREMIN: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.15), 0.6),
    Breakpoint::step(Fraction(0.8), 0.5),
    Breakpoint::linear(END, 0.0),
];

const GLASS: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.2), 0.5),
    Breakpoint::step(Fraction(0.9), 0.4),
    Breakpoint::linear(END, 0.0),
];

const SAW_BLADE: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.0),
    Breakpoint::linear(Seconds(0.12), 0.6),
    Breakpoint::step(Fraction(0.9), 0.5),
    Breakpoint::linear(END, 0.0),
];

const KALIMBA: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.8),
    Breakpoint::exponential(END, 0.15),
];

const STEEL: &[Breakpoint] = &[
    Breakpoint::step(ONSET, 0.9),
    Breakpoint::exponential(Seconds(0.2), 0.3),
    Breakpoint::exponential(END, 0.1),
];

// Filter rules.

const fn tracking(kind: FilterKind, multiplier: f64, ceiling: f64, q: f64) -> FilterRule {
    FilterRule {
        kind,
        cutoff: CutoffRule::Tracking {
            multiplier,
            ceiling: Some(ceiling),
        },
        q,
    }
}

const fn fixed(kind: FilterKind, hz: f64, q: f64) -> FilterRule {
    FilterRule {
        kind,
        cutoff: CutoffRule::Fixed(hz),
        q,
    }
}

const fn lowpass(multiplier: f64, ceiling: f64, q: f64) -> FilterRule {
    tracking(FilterKind::LowPass, multiplier, ceiling, q)
}

const fn bandpass(multiplier: f64, ceiling: f64, q: f64) -> FilterRule {
    tracking(FilterKind::BandPass, multiplier, ceiling, q)
}

const fn profile(
    name: &'static str,
    waveform: Waveform,
    filter: FilterRule,
    envelope: &'static [Breakpoint],
) -> VoiceProfile {
    VoiceProfile {
        name,
        waveform,
        filter,
        envelope,
        unison: None,
        modulation: Modulation::None,
    }
}

const fn with_modulation(mut p: VoiceProfile, modulation: Modulation) -> VoiceProfile {
    p.modulation = modulation;
    p
}

const fn choral(mut p: VoiceProfile) -> VoiceProfile {
    p.unison = Some(Unison {
        voices: 3,
        spread_cents: 5.0,
    });
    p
}

/// Used for any instrument name not in [`CATALOG`]: a plain sine through an
/// all-pass at the note frequency, decaying linearly to silence over the note.
pub static DEFAULT_PROFILE: VoiceProfile = profile(
    "default",
    Sine,
    FilterRule {
        kind: FilterKind::AllPass,
        cutoff: CutoffRule::Tracking {
            multiplier: 1.0,
            ceiling: None,
        },
        q: 1.0,
    },
    DEFAULT,
);

const VOICE_FILTER: FilterRule = bandpass(2.5, 2000.0, 4.0);
const BRASS_FILTER: FilterRule = lowpass(3.0, 2500.0, 3.0);
const SAX_FILTER: FilterRule = bandpass(3.0, 2500.0, 6.0);
const METAL_FILTER: FilterRule = lowpass(4.0, 3000.0, 0.3);

pub static CATALOG: &[VoiceProfile] = &[
    // Keyboards
    profile("piano", Triangle, lowpass(4.0, 2000.0, 0.5), STRUCK),
    profile("electric_piano", Sine, lowpass(6.0, 3000.0, 2.0), STRUCK),
    profile("harpsichord", Sawtooth, fixed(FilterKind::HighPass, 300.0, 3.0), HARPSICHORD),
    profile("organ", Square, lowpass(3.0, 2500.0, 1.0), BELLOWS),
    profile("accordion", Sawtooth, bandpass(2.0, 2000.0, 4.0), BELLOWS),
    // Strings
    profile("violin", Sawtooth, lowpass(8.0, 4000.0, 2.0), BOWED),
    profile("viola", Sawtooth, lowpass(8.0, 4000.0, 2.0), BOWED),
    profile("cello", Sawtooth, lowpass(4.0, 2500.0, 1.5), BOWED),
    profile("double_bass", Sine, lowpass(2.0, 500.0, 0.8), BOWED),
    profile("bass", Sine, lowpass(2.0, 500.0, 0.8), BASS),
    profile("guitar", Triangle, bandpass(3.0, 2000.0, 3.0), PLUCKED),
    profile("acoustic_guitar", Triangle, bandpass(3.0, 2000.0, 3.0), PLUCKED),
    profile("electric_guitar", Square, lowpass(4.0, 3000.0, 8.0), PLUCKED),
    profile("banjo", Triangle, fixed(FilterKind::HighPass, 400.0, 4.0), PLUCKED),
    profile("mandolin", Triangle, bandpass(4.0, 3000.0, 6.0), PLUCKED),
    profile("harp", Triangle, lowpass(8.0, 4000.0, 0.5), HARP),
    profile("sitar", Sawtooth, bandpass(2.0, 1500.0, 10.0), RESONANT_PLUCK),
    profile("oud", Triangle, bandpass(2.5, 1800.0, 4.0), RESONANT_PLUCK),
    profile("panduri", Triangle, bandpass(1.5, 800.0, 5.0), PLUCKED),
    // Brass
    profile("trumpet", Square, BRASS_FILTER, BRIGHT_BRASS),
    profile("cornet", Square, BRASS_FILTER, BRIGHT_BRASS),
    profile("trombone", Square, lowpass(2.5, 1800.0, 2.0), SOFT_BRASS),
    profile("french_horn", Triangle, lowpass(2.8, 2000.0, 2.0), SOFT_BRASS),
    profile("tuba", Square, lowpass(1.5, 800.0, 1.5), TUBA),
    profile("euphonium", Square, lowpass(1.5, 800.0, 1.5), SOFT_BRASS),
    profile("brass", Square, lowpass(2.0, 1500.0, 2.0), BRIGHT_BRASS),
    // Woodwinds
    profile("flute", Sine, fixed(FilterKind::HighPass, 200.0, 0.8), FLUTE),
    profile("piccolo", Sine, fixed(FilterKind::HighPass, 200.0, 0.8), FLUTE),
    profile("recorder", Triangle, lowpass(4.0, 3000.0, 1.0), RECORDER),
    profile("clarinet", Square, lowpass(3.0, 2000.0, 4.0), REED),
    profile("bass_clarinet", Square, lowpass(3.0, 2000.0, 4.0), REED),
    profile("saxophone", Square, SAX_FILTER, REED),
    profile("alto_sax", Square, SAX_FILTER, REED),
    profile("tenor_sax", Square, SAX_FILTER, REED),
    profile("baritone_sax", Square, SAX_FILTER, REED),
    profile("oboe", Square, bandpass(3.0, 2200.0, 8.0), DOUBLE_REED),
    profile("english_horn", Square, bandpass(3.0, 2200.0, 8.0), DOUBLE_REED),
    profile("bassoon", Square, lowpass(2.0, 1200.0, 3.0), DOUBLE_REED),
    profile("duduk", Triangle, lowpass(1.8, 1000.0, 6.0), DUDUK),
    // Voices
    choral(profile("choir", Sine, VOICE_FILTER, VOCAL)),
    choral(profile("soprano", Sine, VOICE_FILTER, VOCAL)),
    choral(profile("alto", Sine, VOICE_FILTER, VOCAL)),
    choral(profile("tenor", Sine, VOICE_FILTER, VOCAL)),
    choral(profile("bass_voice", Sine, VOICE_FILTER, VOCAL)),
    // Mallets
    profile("xylophone", Square, fixed(FilterKind::HighPass, 800.0, 2.0), MALLET),
    profile("marimba", Triangle, lowpass(3.0, 2000.0, 1.0), MALLET),
    with_modulation(
        profile("vibraphone", Sine, lowpass(4.0, 3000.0, 2.0), VIBRAPHONE),
        Modulation::Vibrato {
            rate_hz: 5.0,
            depth: 0.01,
        },
    ),
    profile("glockenspiel", Sine, fixed(FilterKind::HighPass, 1000.0, 4.0), MALLET),
    profile("bells", Sine, fixed(FilterKind::HighPass, 1000.0, 4.0), MALLET),
    profile("celesta", Triangle, lowpass(6.0, 4000.0, 2.0), CELESTA),
    // Orchestral percussion
    profile("timpani", Sine, lowpass(1.2, 400.0, 0.8), TIMPANI),
    profile("triangle", Sine, fixed(FilterKind::HighPass, 3000.0, 8.0), TRIANGLE),
    profile("tambourine", Square, fixed(FilterKind::HighPass, 2000.0, 4.0), CLICK),
    profile("castanets", Square, fixed(FilterKind::BandPass, 1500.0, 6.0), CLICK),
    profile("wood_block", Square, fixed(FilterKind::BandPass, 1500.0, 6.0), CLICK),
    profile("temple_block", Square, fixed(FilterKind::BandPass, 1500.0, 6.0), CLICK),
    profile("gong", Triangle, METAL_FILTER, METAL),
    profile("tam_tam", Triangle, METAL_FILTER, METAL),
    profile("cymbal", Triangle, METAL_FILTER, METAL),
    // Synthesizers
    profile("synth", Sawtooth, fixed(FilterKind::LowPass, 1200.0, 8.0), SYNTH),
    profile("lead", Sawtooth, fixed(FilterKind::LowPass, 1200.0, 8.0), SYNTH),
    profile("pad", Sawtooth, fixed(FilterKind::LowPass, 800.0, 2.0), PAD),
    profile("warm_pad", Sawtooth, fixed(FilterKind::LowPass, 800.0, 2.0), PAD),
    profile("bright_pad", Triangle, fixed(FilterKind::LowPass, 1800.0, 4.0), PAD),
    profile("arp", Square, bandpass(2.0, 2000.0, 10.0), ARP),
    profile("pluck", Triangle, lowpass(4.0, 2500.0, 6.0), PLUCK),
    profile("strings", Sawtooth, lowpass(3.0, 2500.0, 1.0), BOWED),
    profile("polysynth", Square, lowpass(2.5, 1800.0, 5.0), POLYSYNTH),
    with_modulation(
        profile("fm_synth", Sine, bandpass(2.8, 2200.0, 8.0), FM),
        Modulation::Fm {
            ratio: 2.0,
            index: 0.5,
        },
    ),
    // Unusual
    with_modulation(
        profile("theremin", Sine, lowpass(2.0, 1500.0, 2.0), THEREMIN),
        Modulation::Vibrato {
            rate_hz: 6.0,
            depth: 0.05,
        },
    ),
    profile("glass_harmonica", Sine, fixed(FilterKind::HighPass, 400.0, 6.0), GLASS),
    profile("musical_saw", Triangle, bandpass(2.2, 1800.0, 12.0), SAW_BLADE),
    profile("kalimba", Triangle, lowpass(3.0, 2000.0, 4.0), KALIMBA),
    profile("steel_drum", Triangle, bandpass(3.0, 2500.0, 8.0), STEEL),
    profile("hang_drum", Triangle, bandpass(3.0, 2500.0, 8.0), STEEL),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::envelope::{GainEnvelope, Ramp};
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_lowercase() {
        let mut seen = HashSet::new();
        for p in CATALOG {
            assert!(seen.insert(p.name), "duplicate profile {}", p.name);
            assert_eq!(p.name, p.name.to_ascii_lowercase());
        }
        assert!(CATALOG.len() >= 70);
    }

    #[test]
    fn every_envelope_starts_at_onset() {
        for p in CATALOG.iter().chain(std::iter::once(&DEFAULT_PROFILE)) {
            let first = p.envelope.first().expect("empty envelope");
            assert_eq!(first.at, ONSET, "{}", p.name);
        }
    }

    #[test]
    fn default_profile_decays_linearly() {
        let ramps: Vec<Ramp> = DEFAULT_PROFILE.envelope.iter().map(|bp| bp.ramp).collect();
        assert_eq!(ramps, vec![Ramp::Step, Ramp::Linear]);

        let env = GainEnvelope::resolve(DEFAULT_PROFILE.envelope, 1.0, 0.3);
        assert!((env.value_at(0.5) - 0.15).abs() < 1e-9);
        assert!(env.value_at(1.0).abs() < 1e-9);
    }

    #[test]
    fn every_profile_is_audible() {
        for p in CATALOG {
            let tones = p.tones(440.0, 1.0, 1.0);
            let peak = (0..100)
                .map(|i| tones[0].envelope.value_at(i as f64 / 100.0))
                .fold(0.0, f64::max);
            assert!(peak > 0.01, "{} never rises above silence", p.name);
        }
    }
}
