//! Prose to notation.
//!
//! Two paths lead from English text to a [`Composition`]: notation produced
//! by an external language model, accepted only if it looks like notation,
//! and a deterministic character-by-character converter used as a fallback.

use crate::dsl::{to_notation, Chord, Compiler, Composition, Note, Pattern, Track, DEFAULT_TEMPO};
use crate::event::Beat;
use crate::pitch::PitchClass;

/// C major, one pitch class per scale degree.
const SCALE: [PitchClass; 7] = [
    PitchClass::C,
    PitchClass::D,
    PitchClass::E,
    PitchClass::F,
    PitchClass::G,
    PitchClass::A,
    PitchClass::B,
];

const BASE_OCTAVE: i32 = 4;
const MAX_CHORDS_PER_PATTERN: usize = 8;
const PUNCTUATION: &str = ".,!?;:()-\"'";

/// Map every character of `text` to a note of a single piano track.
///
/// Spaces become empty chords that take no time and close the current
/// pattern; a pattern
/// also closes once it holds eight chords. Empty text gives one empty pattern.
pub fn convert_text(text: &str) -> Composition {
    let mut patterns = Vec::new();
    let mut current = Vec::new();

    for c in text.chars() {
        current.push(character_chord(c));
        if c == ' ' || current.len() >= MAX_CHORDS_PER_PATTERN {
            patterns.push(Pattern::new(std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        patterns.push(Pattern::new(current));
    }
    if patterns.is_empty() {
        patterns.push(Pattern::default());
    }

    Composition::new(DEFAULT_TEMPO, vec![Track::new("piano", patterns)])
}

fn character_chord(c: char) -> Chord {
    if c == ' ' {
        return Chord::empty();
    }

    let lower = c.to_ascii_lowercase();
    let (degree, octave) = if c.is_ascii_lowercase() {
        let offset = (c as u32 - 'a' as u32) as usize;
        let octave = (BASE_OCTAVE + (offset / SCALE.len()) as i32).clamp(2, 6);
        (offset % SCALE.len(), octave)
    } else if let Some(digit) = c.to_digit(10) {
        (digit as usize % SCALE.len(), BASE_OCTAVE)
    } else {
        (lower as usize % SCALE.len(), BASE_OCTAVE)
    };

    let (beats, velocity) = if "aeiou".contains(lower) {
        (1.0, 0.8)
    } else if PUNCTUATION.contains(c) {
        (0.75, 0.6)
    } else {
        (0.5, 0.7)
    };

    Chord::new(vec![
        Note::melodic(SCALE[degree], octave, Beat::from_beats_f64(beats)).with_velocity(velocity)
    ])
}

/// Whether `text` has the shape of notation: a `name:` label, at least one
/// melodic token such as `C4.1` or `F#3.0.5`, and a `;`.
pub fn looks_like_notation(text: &str) -> bool {
    text.contains(';') && has_label(text) && has_melodic_token(text)
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn has_label(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b':' {
            return false;
        }
        let before = bytes[..i].iter().rev().find(|c| !c.is_ascii_whitespace());
        before.is_some_and(|&c| is_word(c))
    })
}

fn has_melodic_token(text: &str) -> bool {
    let bytes = text.as_bytes();
    (0..bytes.len()).any(|i| {
        if !(b'A'..=b'G').contains(&bytes[i]) {
            return false;
        }
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'#' | b'b')) {
            j += 1;
        }
        let digits = |from: usize| {
            bytes[from.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
        };
        let octave = digits(j);
        if octave == 0 || bytes.get(j + octave) != Some(&b'.') {
            return false;
        }
        digits(j + octave + 1) > 0
    })
}

/// Compile externally generated notation if it looks like notation.
///
/// Surrounding whitespace and a Markdown code fence are ignored.
pub fn accept_generated(generated: &str) -> Option<Composition> {
    let body = strip_fence(generated.trim());
    if !looks_like_notation(body) {
        tracing::debug!(len = generated.len(), "generated text rejected as notation");
        return None;
    }
    Some(Compiler::compile(body))
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an info string such as ```text on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Notation for `prose`: the generated notation when it is acceptable,
/// otherwise the converter's output written back as notation.
pub fn notation_or_fallback(generated: Option<&str>, prose: &str) -> String {
    if let Some(text) = generated {
        if accept_generated(text).is_some() {
            return strip_fence(text.trim()).to_string();
        }
        tracing::info!("generated notation unusable, falling back to text conversion");
    }
    to_notation(&convert_text(prose))
}
