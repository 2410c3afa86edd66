//! Notation compiler: text → [`Composition`].

pub mod ast;
pub mod error;
pub mod parser;
pub mod token;
pub mod writer;

pub use ast::*;
pub use error::{DefectKind, Diagnostic};
pub use writer::to_notation;

use parser::Parser;

/// The notation compiler.
///
/// Compilation is total: malformed fragments are dropped and the rest of
/// the input still compiles.
pub struct Compiler;

impl Compiler {
    /// Compile notation text into a composition.
    pub fn compile(source: &str) -> Composition {
        Self::compile_with_diagnostics(source).0
    }

    /// Compile and also return every fragment that was dropped.
    pub fn compile_with_diagnostics(source: &str) -> (Composition, Vec<Diagnostic>) {
        let (composition, diagnostics) = Parser::new().parse(source);
        tracing::debug!(
            tracks = composition.tracks.len(),
            notes = composition.note_count(),
            dropped = diagnostics.len(),
            "compiled notation"
        );
        (composition, diagnostics)
    }
}
