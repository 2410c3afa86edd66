//! Diagnostics for notation fragments the compiler dropped.
//!
//! Compilation never fails. Every fragment that could not be understood is
//! skipped and, when the caller asks for it, reported here.

use std::fmt;

/// A fragment of notation that was dropped during compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DefectKind,
    /// The offending text, trimmed.
    pub fragment: String,
    pub message: String,
}

/// Why a fragment was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectKind {
    /// A track segment without `:`.
    MissingColon,
    /// Nothing before the `:`.
    EmptyInstrument,
    /// Nothing after the `:`.
    EmptyBody,
    /// A note token that did not match the note grammar.
    UnmatchedToken,
    /// A duration that parsed but was zero.
    InvalidDuration,
    /// A `tempo:` segment whose value is not a positive integer.
    InvalidTempo,
}

impl Diagnostic {
    pub fn new(kind: DefectKind, fragment: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            fragment: fragment.trim().to_string(),
            message: message.into(),
        }
    }

    pub fn missing_colon(fragment: &str) -> Self {
        Self::new(
            DefectKind::MissingColon,
            fragment,
            "track has no ':' between instrument and notes",
        )
    }

    pub fn empty_instrument(fragment: &str) -> Self {
        Self::new(DefectKind::EmptyInstrument, fragment, "track has no instrument name")
    }

    pub fn empty_body(fragment: &str) -> Self {
        Self::new(DefectKind::EmptyBody, fragment, "track has no notes")
    }

    pub fn unmatched_token(fragment: &str) -> Self {
        Self::new(
            DefectKind::UnmatchedToken,
            fragment,
            "token does not match the note grammar",
        )
    }

    pub fn invalid_duration(fragment: &str) -> Self {
        Self::new(
            DefectKind::InvalidDuration,
            fragment,
            "duration must be greater than zero",
        )
    }

    pub fn invalid_tempo(fragment: &str) -> Self {
        Self::new(
            DefectKind::InvalidTempo,
            fragment,
            "tempo must be a positive whole number of BPM",
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} ({:?})", self.kind, self.message, self.fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_is_trimmed() {
        let d = Diagnostic::unmatched_token("  X9.q  ");
        assert_eq!(d.fragment, "X9.q");
        assert_eq!(d.kind, DefectKind::UnmatchedToken);
    }

    #[test]
    fn display_includes_kind_and_fragment() {
        let d = Diagnostic::missing_colon("bogus");
        let text = d.to_string();
        assert!(text.contains("MissingColon"));
        assert!(text.contains("\"bogus\""));
    }
}
