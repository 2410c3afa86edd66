//! Pitch classes and equal-temperament frequency resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Concert pitch for A4.
pub const A4_HZ: f64 = 440.0;

/// The twelve chromatic pitch classes, spelled with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
}

/// Chromatic table in ascending order from C.
pub const CHROMATIC: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::CSharp,
    PitchClass::D,
    PitchClass::DSharp,
    PitchClass::E,
    PitchClass::F,
    PitchClass::FSharp,
    PitchClass::G,
    PitchClass::GSharp,
    PitchClass::A,
    PitchClass::ASharp,
    PitchClass::B,
];

impl PitchClass {
    /// Position in the chromatic table (C = 0 … B = 11).
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Sharp-spelled name as written in notation.
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Look up one of the twelve sharp-spelled names, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        CHROMATIC
            .iter()
            .copied()
            .find(|pc| pc.name().eq_ignore_ascii_case(name))
    }

    /// Resolve a letter plus accidental into a pitch class and an octave shift.
    ///
    /// Flats and sharps that cross the B/C boundary move the octave:
    /// `Cb` is the B below (shift -1), `B#` is the C above (shift +1).
    pub fn spell(letter: char, accidental: i32) -> Option<(Self, i32)> {
        let natural = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let raw = natural + accidental;
        let shift = raw.div_euclid(12);
        let class = CHROMATIC[raw.rem_euclid(12) as usize];
        Some((class, shift))
    }

    /// Equal-temperament frequency of this pitch class in `octave`.
    pub fn frequency(self, octave: i32) -> f64 {
        // Float arithmetic so no octave can overflow.
        let semitones =
            (octave as f64 - 4.0) * 12.0 + (self.index() - PitchClass::A.index()) as f64;
        A4_HZ * 2.0f64.powf(semitones / 12.0)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fundamental frequency for a named pitch class in `octave`.
///
/// Unrecognised names resolve to A4 (440 Hz) instead of failing.
pub fn frequency_of(pitch_class: &str, octave: i32) -> f64 {
    match PitchClass::from_name(pitch_class) {
        Some(pc) => pc.frequency(octave),
        None => A4_HZ,
    }
}
