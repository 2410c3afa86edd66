//! Serialise a [`Composition`] back into notation text.

use std::fmt::Write;

use super::ast::{Chord, Composition, Note, Pattern, Pitch};

/// Write `composition` as notation that compiles back to the same non-empty
/// chords. Empty chords, and patterns made only of empty chords, are omitted.
pub fn to_notation(composition: &Composition) -> String {
    let mut out = String::new();
    let _ = write!(out, "tempo:{};", composition.tempo);

    for track in &composition.tracks {
        let patterns: Vec<String> = track
            .patterns
            .iter()
            .filter_map(write_pattern)
            .collect();
        if patterns.is_empty() {
            continue;
        }
        let _ = write!(out, "\n{}:{};", track.instrument, patterns.join("|"));
    }

    out
}

fn write_pattern(pattern: &Pattern) -> Option<String> {
    let chords: Vec<String> = pattern
        .chords
        .iter()
        .filter(|c| !c.is_empty())
        .map(write_chord)
        .collect();
    if chords.is_empty() {
        None
    } else {
        Some(chords.join(","))
    }
}

fn write_chord(chord: &Chord) -> String {
    chord
        .notes()
        .iter()
        .map(write_note)
        .collect::<Vec<_>>()
        .join("+")
}

fn write_note(note: &Note) -> String {
    match &note.pitch {
        Pitch::Melodic { class, octave } => format!("{class}{octave}.{}", note.duration),
        Pitch::Drum(code) => format!("{code}.{}", note.duration),
    }
}
