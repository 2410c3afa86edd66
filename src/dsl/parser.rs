//! Parser for notation text.
//!
//! Works top-down by splitting on separators: `;` for tracks, `:` between
//! instrument and body, `|` for patterns, `,` for chords and `+` for notes.
//! Nothing here fails. Fragments that cannot be understood are dropped and
//! recorded as [`Diagnostic`]s.

use super::ast::{is_drum_instrument, Chord, Composition, Note, Pattern, Track, DEFAULT_TEMPO};
use super::error::Diagnostic;
use super::token::{parse_drum, parse_melodic};

/// Segment name that sets the tempo instead of declaring a track.
const TEMPO_KEYWORD: &str = "tempo";

pub struct Parser {
    tempo: u32,
    tracks: Vec<Track>,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            tracks: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Parse `source` into a composition plus everything that was dropped.
    pub fn parse(mut self, source: &str) -> (Composition, Vec<Diagnostic>) {
        let cleaned = strip_comments(source);

        for segment in cleaned.split(';') {
            if segment.trim().is_empty() {
                continue;
            }
            self.parse_segment(segment);
        }

        (Composition::new(self.tempo, self.tracks), self.diagnostics)
    }

    fn parse_segment(&mut self, segment: &str) {
        let Some((name, body)) = segment.split_once(':') else {
            self.reject(Diagnostic::missing_colon(segment));
            return;
        };
        let name = name.trim();
        let body = body.trim();

        if name.is_empty() {
            self.reject(Diagnostic::empty_instrument(segment));
            return;
        }

        if name.eq_ignore_ascii_case(TEMPO_KEYWORD) {
            match body.parse::<u32>() {
                Ok(bpm) if bpm > 0 => self.tempo = bpm,
                _ => self.reject(Diagnostic::invalid_tempo(segment)),
            }
            return;
        }

        if body.is_empty() {
            self.reject(Diagnostic::empty_body(segment));
            return;
        }

        let drums = is_drum_instrument(name);
        let patterns = body
            .split('|')
            .filter(|p| !p.trim().is_empty())
            .map(|p| self.parse_pattern(p, drums))
            .collect();

        self.tracks.push(Track::new(name, patterns));
    }

    fn parse_pattern(&mut self, text: &str, drums: bool) -> Pattern {
        let chords = text
            .split(',')
            .filter(|c| {
                let keep = !c.trim().is_empty();
                if !keep {
                    tracing::debug!(pattern = text.trim(), "skipping empty chord segment");
                }
                keep
            })
            .map(|c| self.parse_chord(c, drums))
            .collect();
        Pattern::new(chords)
    }

    fn parse_chord(&mut self, text: &str, drums: bool) -> Chord {
        let mut notes: Vec<Note> = Vec::new();
        for token in text.split('+') {
            let parsed = if drums {
                parse_drum(token)
            } else {
                parse_melodic(token)
            };
            match parsed {
                Ok(note) => notes.push(note),
                Err(diagnostic) => self.reject(diagnostic),
            }
        }
        Chord::new(notes)
    }

    fn reject(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            kind = ?diagnostic.kind,
            fragment = %diagnostic.fragment,
            "dropping notation fragment"
        );
        self.diagnostics.push(diagnostic);
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove `//` comments through end of line.
fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::ast::Pitch;
    use crate::dsl::error::DefectKind;
    use crate::event::Beat;

    fn parse(source: &str) -> (Composition, Vec<Diagnostic>) {
        Parser::new().parse(source)
    }

    #[test]
    fn strips_comments_line_by_line() {
        assert_eq!(strip_comments("a // x\nb"), "a \nb");
        assert_eq!(strip_comments("// only"), "");
    }

    #[test]
    fn empty_source() {
        let (comp, diags) = parse("");
        assert!(comp.tracks.is_empty());
        assert_eq!(comp.tempo, DEFAULT_TEMPO);
        assert!(diags.is_empty());
    }

    #[test]
    fn multiline_tracks() {
        let (comp, diags) = parse("piano: C4.1, D4.1\n  | E4.2;\nbass: C2.4;");
        assert!(diags.is_empty());
        assert_eq!(comp.tracks.len(), 2);
        assert_eq!(comp.tracks[0].patterns.len(), 2);
        assert_eq!(comp.tracks[0].patterns[0].chords.len(), 2);
        assert_eq!(comp.tracks[1].instrument, "bass");
    }

    #[test]
    fn missing_colon_dropped() {
        let (comp, diags) = parse("bogus;piano:C4.1;");
        assert_eq!(comp.tracks.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DefectKind::MissingColon);
        assert_eq!(diags[0].fragment, "bogus");
    }

    #[test]
    fn empty_halves_dropped() {
        let (comp, diags) = parse(":C4.1;piano:  ;");
        assert!(comp.tracks.is_empty());
        let kinds: Vec<_> = diags.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DefectKind::EmptyInstrument, DefectKind::EmptyBody]);
    }

    #[test]
    fn tempo_anywhere_later_wins() {
        let (comp, _) = parse("tempo:90;piano:C4.1;TEMPO:140;");
        assert_eq!(comp.tempo, 140);
        assert_eq!(comp.tracks.len(), 1);
    }

    #[test]
    fn invalid_tempo_keeps_previous() {
        let (comp, diags) = parse("tempo:100;tempo:fast;tempo:0;piano:C4.1;");
        assert_eq!(comp.tempo, 100);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.kind == DefectKind::InvalidTempo));
    }

    #[test]
    fn bad_token_drops_only_that_note() {
        let (comp, diags) = parse("piano:C4.1+X9.1+E4.2;");
        let chord = &comp.tracks[0].patterns[0].chords[0];
        assert_eq!(chord.notes().len(), 2);
        assert_eq!(chord.duration(), Beat::from_beats(2));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].fragment, "X9.1");
    }

    #[test]
    fn all_dropped_chord_is_empty_with_zero_duration() {
        let (comp, _) = parse("piano:X.1,C4.1;");
        let chords = &comp.tracks[0].patterns[0].chords;
        assert_eq!(chords.len(), 2);
        assert!(chords[0].is_empty());
        assert!(chords[0].duration().is_zero());
    }

    #[test]
    fn consecutive_commas_produce_no_chord() {
        let (comp, diags) = parse("piano:C4.1,,D4.1;");
        assert_eq!(comp.tracks[0].patterns[0].chords.len(), 2);
        assert_eq!(comp.tracks[0].duration(), Beat::from_beats(2));
        assert!(diags.is_empty());
    }

    #[test]
    fn empty_pattern_segments_skipped() {
        let (comp, _) = parse("piano:C4.1||D4.1|;");
        assert_eq!(comp.tracks[0].patterns.len(), 2);
    }

    #[test]
    fn drum_track_uses_drum_grammar() {
        let (comp, diags) = parse("Drums:k.0.5+h.0.25,s;");
        assert!(diags.is_empty());
        let chords = &comp.tracks[0].patterns[0].chords;
        assert_eq!(chords[0].notes()[1].pitch, Pitch::Drum("h".to_string()));
        assert_eq!(chords[0].duration(), Beat::from_ticks(480));
        assert_eq!(chords[1].duration(), Beat::from_beats(1));
    }

    #[test]
    fn melodic_grammar_rejects_drum_codes() {
        let (comp, diags) = parse("piano:k.0.5;");
        assert!(comp.tracks[0].patterns[0].chords[0].is_empty());
        assert_eq!(diags[0].kind, DefectKind::UnmatchedToken);
    }

    #[test]
    fn unknown_instrument_kept() {
        let (comp, _) = parse("kazoo:C4.1;");
        assert_eq!(comp.tracks[0].instrument, "kazoo");
    }

    #[test]
    fn body_after_first_colon_only() {
        let (comp, diags) = parse("piano:C4.1:D4.1;");
        assert_eq!(comp.tracks.len(), 1);
        assert_eq!(comp.tracks[0].instrument, "piano");
        // The body is the single token `C4.1:D4.1`; its first note plays.
        let chord = &comp.tracks[0].patterns[0].chords[0];
        assert_eq!(chord.notes().len(), 1);
        assert_eq!(chord.notes()[0].pitch.class_name(), "C");
        assert!(diags.is_empty());
    }
}
