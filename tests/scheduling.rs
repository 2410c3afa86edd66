//! Render scheduler timing and lifecycle, observed through a recording output.

use std::cell::RefCell;
use std::rc::Rc;

use notaphone::audio::{AudioError, AudioOutput, ToneCommand};
use notaphone::config::Settings;
use notaphone::dsl::Compiler;
use notaphone::event::{PlaybackStatus, RenderScheduler};
use notaphone::instrument::{FilterKind, Source};

/// Everything the scheduler did to its outputs.
#[derive(Default)]
struct Log {
    created: usize,
    closed: usize,
    volume: Option<f32>,
    tones: Vec<ToneCommand>,
}

/// An output whose clock is fixed at `now` and which records every call.
struct Recorder {
    now: f64,
    log: Rc<RefCell<Log>>,
    closed: bool,
}

impl AudioOutput for Recorder {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn submit(&mut self, tones: Vec<ToneCommand>) -> Result<(), AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        self.log.borrow_mut().tones.extend(tones);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.log.borrow_mut().volume = Some(volume);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
        self.log.borrow_mut().closed += 1;
    }
}

fn recording(now: f64) -> (RenderScheduler, Rc<RefCell<Log>>) {
    let log = Rc::new(RefCell::new(Log::default()));
    let shared = Rc::clone(&log);
    let scheduler = RenderScheduler::new(
        Settings::default(),
        Box::new(move || {
            shared.borrow_mut().created += 1;
            Ok(Box::new(Recorder {
                now,
                log: Rc::clone(&shared),
                closed: false,
            }) as Box<dyn AudioOutput>)
        }),
    );
    (scheduler, log)
}

fn starts(log: &Rc<RefCell<Log>>) -> Vec<f64> {
    log.borrow().tones.iter().map(|t| t.start).collect()
}

#[test]
fn second_chord_starts_half_a_second_later() {
    let (mut scheduler, log) = recording(3.0);
    let handle = scheduler.render(&Compiler::compile("piano:C4.1,E4.2;"));

    let base = 3.0 + 0.1;
    let s = starts(&log);
    assert!((s[0] - base).abs() < 1e-12);
    assert!((s[1] - (base + 1.0 * 60.0 / 120.0)).abs() < 1e-12);
    match handle.status() {
        PlaybackStatus::Scheduled {
            tones, starts_at, ..
        } => {
            assert_eq!(*tones, 2);
            assert!((starts_at - base).abs() < 1e-12);
        }
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn tempo_scales_cursor() {
    let (mut scheduler, log) = recording(0.0);
    scheduler.render(&Compiler::compile("tempo:60;organ:C4.1,D4.1;"));
    let s = starts(&log);
    assert!((s[1] - s[0] - 1.0).abs() < 1e-12);
}

#[test]
fn tracks_share_the_base_time() {
    let (mut scheduler, log) = recording(1.0);
    scheduler.render(&Compiler::compile("piano:C4.2,D4.1;drums:k.1,s.1,h.1;"));
    let s = starts(&log);
    assert_eq!(s.len(), 5);
    assert!((s[0] - 1.1).abs() < 1e-12);
    assert!((s[2] - 1.1).abs() < 1e-12);
    assert!((s[1] - 2.1).abs() < 1e-12);
    assert!((s[4] - 2.1).abs() < 1e-12);
}

#[test]
fn master_volume_reaches_output() {
    let (mut scheduler, log) = recording(0.0);
    scheduler.render(&Compiler::compile("piano:C4.1;"));
    assert_eq!(log.borrow().volume, Some(0.8));
}

#[test]
fn unknown_instrument_still_sounds() {
    let (mut scheduler, log) = recording(0.0);
    let handle = scheduler.render(&Compiler::compile("hurdygurdy:A4.1;"));
    assert!(handle.is_scheduled());
    let log = log.borrow();
    assert_eq!(log.tones.len(), 1);
    let tone = &log.tones[0].tone;
    assert_eq!(tone.filter.map(|f| f.kind), Some(FilterKind::AllPass));
    assert!(matches!(tone.source, Source::Oscillator { .. }));
}

#[test]
fn render_is_eager_for_long_pieces() {
    let bar = "C4.0.25,D4.0.25,E4.0.25,F4.0.25";
    let body = vec![bar; 500].join("|");
    let (mut scheduler, log) = recording(0.0);
    let handle = scheduler.render(&Compiler::compile(&format!("piano:{body};")));
    assert_eq!(log.borrow().tones.len(), 2000);
    // 2000 quarter-beat notes at 120 BPM is 250 seconds of music.
    let ends_at = handle.ends_at().unwrap();
    assert!((ends_at - (0.1 + 250.0 + 0.1)).abs() < 1e-6);
}

#[test]
fn stop_closes_and_next_render_creates_fresh_output() {
    let (mut scheduler, log) = recording(0.0);
    let first = scheduler.render(&Compiler::compile("piano:C4.1;"));
    scheduler.render(&Compiler::compile("piano:D4.1;"));
    assert_eq!(log.borrow().created, 1);

    scheduler.stop(&first);
    assert_eq!(log.borrow().closed, 1);
    assert!(!scheduler.is_active());

    let second = scheduler.render(&Compiler::compile("piano:E4.1;"));
    assert!(second.is_scheduled());
    assert_eq!(log.borrow().created, 2);
    assert_ne!(first.session(), second.session());
}

#[test]
fn stop_without_output_is_harmless() {
    let (mut scheduler, log) = recording(0.0);
    let handle = scheduler.render(&Compiler::compile("piano:C4.1;"));
    scheduler.stop(&handle);
    scheduler.stop(&handle);
    assert_eq!(log.borrow().closed, 1);
}

#[test]
fn unavailable_output_is_a_status() {
    let mut scheduler = RenderScheduler::new(
        Settings::default(),
        Box::new(|| Err(AudioError::NoOutputDevice)),
    );
    let handle = scheduler.render(&Compiler::compile("piano:C4.1;"));
    assert!(matches!(handle.status(), PlaybackStatus::Unavailable(_)));
    assert_eq!(handle.ends_at(), None);
}
