//! Composition IR, the immutable result of compiling notation text.

use serde::{Deserialize, Serialize};

use crate::event::Beat;
use crate::pitch::PitchClass;

/// Tempo used when the notation does not declare one.
pub const DEFAULT_TEMPO: u32 = 120;

/// Instrument name that switches a track to drum-code tokens.
pub const DRUM_TRACK: &str = "drums";

/// What a note sounds: a pitched tone or a drum hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pitch {
    /// A chromatic pitch class in a given octave.
    Melodic { class: PitchClass, octave: i32 },
    /// A drum code such as `k`, `s` or `ta`, stored lower-case.
    Drum(String),
}

impl Pitch {
    /// The pitch-class name or drum code as written in notation.
    pub fn class_name(&self) -> &str {
        match self {
            Pitch::Melodic { class, .. } => class.name(),
            Pitch::Drum(code) => code,
        }
    }

    /// Octave for melodic pitches, `None` for drum hits.
    pub fn octave(&self) -> Option<i32> {
        match self {
            Pitch::Melodic { octave, .. } => Some(*octave),
            Pitch::Drum(_) => None,
        }
    }
}

/// A single sounded note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    /// Always positive for notes produced by the compiler.
    pub duration: Beat,
    /// 0.0 to 1.0.
    pub velocity: f32,
}

impl Note {
    /// A melodic note at full velocity.
    pub fn melodic(class: PitchClass, octave: i32, duration: Beat) -> Self {
        Self {
            pitch: Pitch::Melodic { class, octave },
            duration,
            velocity: 1.0,
        }
    }

    /// A drum hit at full velocity. The code is lower-cased.
    pub fn drum(code: &str, duration: Beat) -> Self {
        Self {
            pitch: Pitch::Drum(code.to_ascii_lowercase()),
            duration,
            velocity: 1.0,
        }
    }

    /// Return a copy with `velocity` clamped into 0.0..=1.0.
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity.clamp(0.0, 1.0);
        self
    }
}

/// Simultaneous notes. The duration is always the longest note, or zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    notes: Vec<Note>,
    duration: Beat,
}

impl Chord {
    /// Build a chord; its duration is derived from the notes.
    pub fn new(notes: Vec<Note>) -> Self {
        let duration = notes.iter().map(|n| n.duration).max().unwrap_or(Beat::ZERO);
        Self { notes, duration }
    }

    /// A chord with no notes and zero duration.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn duration(&self) -> Beat {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// One measure: chords in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub chords: Vec<Chord>,
}

impl Pattern {
    pub fn new(chords: Vec<Chord>) -> Self {
        Self { chords }
    }

    /// Sum of chord durations.
    pub fn duration(&self) -> Beat {
        self.chords.iter().map(Chord::duration).sum()
    }
}

/// An instrument and its measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub instrument: String,
    pub patterns: Vec<Pattern>,
}

impl Track {
    pub fn new(instrument: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Self {
            instrument: instrument.into(),
            patterns,
        }
    }

    /// Whether this track uses drum-code tokens.
    pub fn is_drums(&self) -> bool {
        is_drum_instrument(&self.instrument)
    }

    /// Total length: every chord across every pattern, in order.
    /// Pattern boundaries add nothing.
    pub fn duration(&self) -> Beat {
        self.patterns.iter().map(Pattern::duration).sum()
    }

    /// All chords in playback order.
    pub fn chords(&self) -> impl Iterator<Item = &Chord> {
        self.patterns.iter().flat_map(|p| p.chords.iter())
    }
}

/// Root of the IR: a tempo plus independent tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Beats per minute, always positive.
    pub tempo: u32,
    pub tracks: Vec<Track>,
}

impl Composition {
    pub fn new(tempo: u32, tracks: Vec<Track>) -> Self {
        Self {
            tempo: tempo.max(1),
            tracks,
        }
    }

    /// Length of the longest track in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.duration().to_seconds(self.tempo))
            .fold(0.0, f64::max)
    }

    /// Total number of notes across all tracks.
    pub fn note_count(&self) -> usize {
        self.tracks
            .iter()
            .flat_map(Track::chords)
            .map(|c| c.notes().len())
            .sum()
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPO, Vec::new())
    }
}

/// `drums`, compared case-insensitively after trimming.
pub fn is_drum_instrument(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(DRUM_TRACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats(b: f64) -> Beat {
        Beat::from_beats_f64(b)
    }

    #[test]
    fn chord_duration_is_longest_note() {
        let chord = Chord::new(vec![
            Note::melodic(PitchClass::C, 4, beats(1.0)),
            Note::melodic(PitchClass::E, 4, beats(2.0)),
            Note::melodic(PitchClass::G, 4, beats(0.5)),
        ]);
        assert_eq!(chord.duration(), beats(2.0));
        assert_eq!(chord.notes().len(), 3);
    }

    #[test]
    fn empty_chord_has_zero_duration() {
        let chord = Chord::empty();
        assert!(chord.is_empty());
        assert!(chord.duration().is_zero());
    }

    #[test]
    fn track_duration_sums_all_patterns() {
        let track = Track::new(
            "piano",
            vec![
                Pattern::new(vec![Chord::new(vec![Note::melodic(
                    PitchClass::C,
                    4,
                    beats(1.0),
                )])]),
                Pattern::new(vec![
                    Chord::new(vec![Note::melodic(PitchClass::D, 4, beats(2.0))]),
                    Chord::empty(),
                ]),
            ],
        );
        assert_eq!(track.duration(), beats(3.0));
        assert_eq!(track.chords().count(), 3);
    }

    #[test]
    fn drum_instrument_is_case_insensitive() {
        assert!(is_drum_instrument("drums"));
        assert!(is_drum_instrument("DRUMS"));
        assert!(is_drum_instrument(" Drums "));
        assert!(!is_drum_instrument("drum"));
    }

    #[test]
    fn drum_codes_are_lowercased() {
        let note = Note::drum("K", beats(0.5));
        assert_eq!(note.pitch, Pitch::Drum("k".to_string()));
        assert_eq!(note.pitch.octave(), None);
        assert_eq!(note.pitch.class_name(), "k");
    }

    #[test]
    fn velocity_is_clamped() {
        let note = Note::melodic(PitchClass::A, 4, beats(1.0)).with_velocity(1.7);
        assert_eq!(note.velocity, 1.0);
        let note = note.with_velocity(-0.2);
        assert_eq!(note.velocity, 0.0);
    }

    #[test]
    fn composition_duration_uses_longest_track() {
        let comp = Composition::new(
            120,
            vec![
                Track::new(
                    "piano",
                    vec![Pattern::new(vec![Chord::new(vec![Note::melodic(
                        PitchClass::C,
                        4,
                        beats(4.0),
                    )])])],
                ),
                Track::new(
                    "bass",
                    vec![Pattern::new(vec![Chord::new(vec![Note::melodic(
                        PitchClass::C,
                        2,
                        beats(1.0),
                    )])])],
                ),
            ],
        );
        assert!((comp.duration_secs() - 2.0).abs() < 1e-12);
        assert_eq!(comp.note_count(), 2);
    }

    #[test]
    fn zero_tempo_is_lifted_to_one() {
        assert_eq!(Composition::new(0, Vec::new()).tempo, 1);
        assert_eq!(Composition::default().tempo, DEFAULT_TEMPO);
    }
}
