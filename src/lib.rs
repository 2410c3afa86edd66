//! Notaphone compiles compact music notation and plays it through a
//! data-driven multi-voice synthesizer.
//!
//! The two entry points are [`dsl::Compiler::compile`], which turns notation
//! text into a [`dsl::Composition`], and [`event::RenderScheduler::render`],
//! which schedules that composition on an audio output.

pub mod audio;
pub mod config;
pub mod dsl;
pub mod event;
pub mod instrument;
pub mod pitch;
pub mod text;
