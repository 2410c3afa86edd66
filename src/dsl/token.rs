//! Note tokens: `C4.1`, `F#3.0.5` or `Eb2.2` on melodic tracks, `k.0.5` on drums.

use std::ops::RangeInclusive;

use crate::event::Beat;
use crate::pitch::PitchClass;

use super::ast::Note;
use super::error::Diagnostic;

/// Duration given to a drum hit whose duration is missing or unreadable.
pub const DEFAULT_DRUM_DURATION: Beat = Beat::from_beats(1);

/// Octaves a melodic note may land in after respelling.
pub const OCTAVE_RANGE: RangeInclusive<i32> = 0..=10;

/// Parse a melodic token: `letter [#|b] octave "." duration`.
///
/// The first such run inside the trimmed token is used, so stray characters
/// around it (`(C4.1)`, `C4.1x`) are ignored. Flats are respelled as sharps.
/// Octaves outside [`OCTAVE_RANGE`] do not match.
pub fn parse_melodic(token: &str) -> Result<Note, Diagnostic> {
    let text = token.trim();
    let unmatched = || Diagnostic::unmatched_token(text);

    let found = find_melodic(text).ok_or_else(unmatched)?;
    let (class, shift) = PitchClass::spell(found.letter, found.accidental).ok_or_else(unmatched)?;
    let octave = found
        .octave
        .parse::<i32>()
        .ok()
        .and_then(|o| o.checked_add(shift))
        .filter(|o| OCTAVE_RANGE.contains(o))
        .ok_or_else(unmatched)?;
    let duration = Beat::parse_decimal(found.duration).ok_or_else(unmatched)?;
    if duration.is_zero() {
        return Err(Diagnostic::invalid_duration(text));
    }

    Ok(Note::melodic(class, octave, duration))
}

struct MelodicMatch<'a> {
    letter: char,
    accidental: i32,
    octave: &'a str,
    duration: &'a str,
}

fn find_melodic(text: &str) -> Option<MelodicMatch<'_>> {
    (0..text.len()).find_map(|start| melodic_at(text, start))
}

fn melodic_at(text: &str, start: usize) -> Option<MelodicMatch<'_>> {
    let bytes = text.as_bytes();
    let letter = bytes[start];
    if !matches!(letter.to_ascii_uppercase(), b'A'..=b'G') {
        return None;
    }

    let (accidental, octave_start) = match bytes.get(start + 1) {
        Some(b'#') => (1, start + 2),
        Some(b'b') => (-1, start + 2),
        _ => (0, start + 1),
    };
    let octave_end = digits_end(bytes, octave_start);
    if octave_end == octave_start || bytes.get(octave_end) != Some(&b'.') {
        return None;
    }

    let duration_start = octave_end + 1;
    let mut duration_end = digits_end(bytes, duration_start);
    if duration_end == duration_start {
        return None;
    }
    if bytes.get(duration_end) == Some(&b'.') {
        let fraction_end = digits_end(bytes, duration_end + 1);
        if fraction_end > duration_end + 1 {
            duration_end = fraction_end;
        }
    }

    Some(MelodicMatch {
        letter: char::from(letter),
        accidental,
        octave: &text[octave_start..octave_end],
        duration: &text[duration_start..duration_end],
    })
}

/// Index just past the run of ASCII digits starting at `from`.
fn digits_end(bytes: &[u8], from: usize) -> usize {
    from + bytes
        .get(from..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

/// Parse a drum token: `code "." duration`.
///
/// A missing or unreadable duration becomes one beat; an explicit zero
/// duration drops the token.
pub fn parse_drum(token: &str) -> Result<Note, Diagnostic> {
    let text = token.trim();
    let (code, duration) = match text.split_once('.') {
        Some((code, duration)) => (code, Some(duration)),
        None => (text, None),
    };

    if code.is_empty()
        || !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Diagnostic::unmatched_token(text));
    }

    let duration = match duration.and_then(Beat::parse_decimal) {
        Some(d) if d.is_zero() => return Err(Diagnostic::invalid_duration(text)),
        Some(d) => d,
        None => {
            tracing::debug!(token = text, "drum token without readable duration, using one beat");
            DEFAULT_DRUM_DURATION
        }
    };

    Ok(Note::drum(code, duration))
}
