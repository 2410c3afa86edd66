//! Render scheduler: turns a composition into timed tones on an audio output.
//!
//! The [`RenderScheduler`] owns at most one [`AudioOutput`] at a time. The
//! output is created lazily on the first render, and torn down by
//! [`RenderScheduler::stop`]; the next render creates a fresh one. Planning
//! is eager: every tone of every track is computed and handed to the output
//! in one batch, so `render` returns immediately regardless of length.

pub mod beat;
pub mod plan;

pub use beat::{Beat, TICKS_PER_BEAT};
pub use plan::{plan, plan_track};

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::{AudioEngine, AudioError, AudioOutput};
use crate::config::Settings;
use crate::dsl::Composition;

/// Creates an output when the scheduler needs one.
pub type OutputFactory = Box<dyn FnMut() -> Result<Box<dyn AudioOutput>, AudioError>>;

/// Outcome of a render request.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackStatus {
    /// Tones were handed to the output.
    Scheduled {
        tones: usize,
        starts_at: f64,
        ends_at: f64,
    },
    /// No output could be used; nothing will sound.
    Unavailable(String),
}

/// Returned by [`RenderScheduler::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackHandle {
    session: u64,
    status: PlaybackStatus,
}

impl PlaybackHandle {
    pub fn status(&self) -> &PlaybackStatus {
        &self.status
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self.status, PlaybackStatus::Scheduled { .. })
    }

    /// Output-clock time at which the last tone stops.
    pub fn ends_at(&self) -> Option<f64> {
        match self.status {
            PlaybackStatus::Scheduled { ends_at, .. } => Some(ends_at),
            PlaybackStatus::Unavailable(_) => None,
        }
    }

    /// Identifies the output instance the tones went to.
    pub fn session(&self) -> u64 {
        self.session
    }
}

pub struct RenderScheduler {
    settings: Settings,
    factory: OutputFactory,
    output: Option<Box<dyn AudioOutput>>,
    session: u64,
}

impl RenderScheduler {
    /// A scheduler that builds its output with `factory`.
    pub fn new(settings: Settings, factory: OutputFactory) -> Self {
        Self {
            settings,
            factory,
            output: None,
            session: 0,
        }
    }

    /// A scheduler playing through the default sound device.
    pub fn with_device(settings: Settings) -> Self {
        let sample_rate = settings.sample_rate;
        let seed = settings.seed;
        Self::new(
            settings,
            Box::new(move || {
                AudioEngine::new(sample_rate, seed).map(|e| Box::new(e) as Box<dyn AudioOutput>)
            }),
        )
    }

    /// A scheduler that drives an output the caller also holds.
    ///
    /// Once stopped, the shared output stays closed and later renders report
    /// [`PlaybackStatus::Unavailable`].
    pub fn with_shared<T: AudioOutput + 'static>(settings: Settings, output: Rc<RefCell<T>>) -> Self {
        Self::new(
            settings,
            Box::new(move || Ok(Box::new(Rc::clone(&output)) as Box<dyn AudioOutput>)),
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether an output instance currently exists.
    pub fn is_active(&self) -> bool {
        self.output.is_some()
    }

    /// The current output's clock, if there is one.
    pub fn current_time(&self) -> Option<f64> {
        self.output.as_ref().map(|o| o.current_time())
    }

    /// Schedule every tone of `composition` on the output.
    ///
    /// Never fails: if no output can be created or it refuses the tones,
    /// the handle reports [`PlaybackStatus::Unavailable`].
    pub fn render(&mut self, composition: &Composition) -> PlaybackHandle {
        let lookahead = self.settings.lookahead_secs;
        let release_tail = self.settings.release_tail_secs;
        let output = match self.acquire() {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(%err, "audio unavailable, render is a no-op");
                return self.unavailable(err);
            }
        };

        let starts_at = output.current_time() + lookahead;
        let tones = plan(composition, starts_at, release_tail);
        let count = tones.len();
        let ends_at = tones.iter().map(|t| t.stop).fold(starts_at, f64::max);

        if let Err(err) = output.submit(tones) {
            tracing::warn!(%err, "audio output refused tones");
            return self.unavailable(err);
        }

        tracing::info!(
            tracks = composition.tracks.len(),
            tones = count,
            starts_at,
            ends_at,
            "scheduled composition"
        );
        PlaybackHandle {
            session: self.session,
            status: PlaybackStatus::Scheduled {
                tones: count,
                starts_at,
                ends_at,
            },
        }
    }

    /// Cut off all sound and discard the output.
    ///
    /// The handle only identifies the session in logs; stopping always
    /// silences the current output.
    pub fn stop(&mut self, handle: &PlaybackHandle) {
        if let Some(mut output) = self.output.take() {
            output.close();
            tracing::info!(
                session = self.session,
                requested = handle.session,
                "stopped playback"
            );
        }
    }

    fn acquire(&mut self) -> Result<&mut Box<dyn AudioOutput>, AudioError> {
        if self.output.is_none() {
            let mut output = (self.factory)()?;
            if let Err(err) = output.set_volume(self.settings.master_volume) {
                tracing::debug!(%err, "could not set master volume");
            }
            self.session += 1;
            tracing::info!(session = self.session, "audio output created");
            self.output = Some(output);
        }
        self.output.as_mut().ok_or(AudioError::Closed)
    }

    fn unavailable(&self, err: AudioError) -> PlaybackHandle {
        PlaybackHandle {
            session: self.session,
            status: PlaybackStatus::Unavailable(err.to_string()),
        }
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        if let Some(mut output) = self.output.take() {
            output.close();
        }
    }
}
