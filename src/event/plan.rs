//! Eager tone planning: every start and stop time of a composition,
//! computed up front.
//!
//! Each track keeps its own cursor in beats, starting at the shared base
//! time. A chord's notes all start at the cursor; the cursor then advances
//! by the chord's duration. Converting the accumulated beat count to seconds
//! once per chord keeps long tracks from drifting.

use crate::audio::ToneCommand;
use crate::dsl::{Chord, Composition, Pitch, Track};
use crate::instrument::{drum_profile_for, profile_for};

use super::Beat;

/// Plan every tone in `composition`, all tracks starting at `base_time`.
///
/// `release_tail` extends each melodic tone past its notated length so the
/// envelope's release can finish. Drum layers keep their own lengths.
pub fn plan(composition: &Composition, base_time: f64, release_tail: f64) -> Vec<ToneCommand> {
    composition
        .tracks
        .iter()
        .flat_map(|track| plan_track(track, composition.tempo, base_time, release_tail))
        .collect()
}

/// Plan a single track.
pub fn plan_track(
    track: &Track,
    tempo: u32,
    base_time: f64,
    release_tail: f64,
) -> Vec<ToneCommand> {
    let mut tones = Vec::new();
    let mut cursor = Beat::ZERO;
    for chord in track.chords() {
        let start = base_time + cursor.to_seconds(tempo);
        plan_chord(&mut tones, &track.instrument, chord, tempo, start, release_tail);
        cursor = cursor + chord.duration();
    }
    tones
}

fn plan_chord(
    out: &mut Vec<ToneCommand>,
    instrument: &str,
    chord: &Chord,
    tempo: u32,
    start: f64,
    release_tail: f64,
) {
    for note in chord.notes() {
        match &note.pitch {
            Pitch::Melodic { class, octave } => {
                let length = note.duration.to_seconds(tempo);
                let stop = start + length + release_tail;
                let profile = profile_for(instrument);
                out.extend(
                    profile
                        .tones(class.frequency(*octave), length, note.velocity)
                        .into_iter()
                        .map(|tone| ToneCommand::new(start, stop, tone)),
                );
            }
            Pitch::Drum(code) => {
                for layer in drum_profile_for(code).layers {
                    let at = start + layer.delay;
                    out.push(ToneCommand::new(at, at + layer.length, layer.tone(note.velocity)));
                }
            }
        }
    }
}
