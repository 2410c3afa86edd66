//! Audio output facility: real-time cpal engine and offline renderer.
//!
//! The scheduler talks to either through [`AudioOutput`]. The real-time
//! engine owns the cpal output stream and communicates with it via a
//! lock-free ring buffer; the audio thread drains [`AudioCommand`]s in its
//! callback, mixes due tones and publishes a frame clock the main thread
//! reads as "current time".

pub mod callback;
pub mod command;
pub mod mixer;
pub mod offline;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};
use thiserror::Error;

pub use command::{AudioCommand, ToneCommand};
pub use mixer::{Mixer, ToneBatch, LIMITER_CEILING};
pub use offline::OfflineRenderer;

use callback::AudioCallback;

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 1024;

/// Tones the audio thread can hold before its queues must grow.
const PREALLOCATED_TONES: usize = 4096;

/// Audio facility errors.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoOutputDevice,
    #[error("device config error: {0}")]
    DeviceConfig(String),
    #[error("stream build error: {0}")]
    StreamBuild(String),
    #[error("stream play error: {0}")]
    StreamPlay(String),
    /// The audio thread is not draining fast enough.
    #[error("audio command ring buffer is full")]
    BufferFull,
    #[error("audio output is closed")]
    Closed,
    #[error("wav write error: {0}")]
    Wav(#[from] hound::Error),
}

/// What the scheduler needs from a sound output.
pub trait AudioOutput {
    /// Seconds on the output's monotonic clock.
    fn current_time(&self) -> f64;

    /// Queue tones without waiting for any of them to play.
    fn submit(&mut self, tones: Vec<ToneCommand>) -> Result<(), AudioError>;

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError>;

    /// Cut off everything and release the output. Nothing queued before
    /// the call is heard after it returns.
    fn close(&mut self);
}

/// A shared output, so the caller can keep a handle to it (for example to
/// read back an offline render) while the scheduler drives it.
impl<T: AudioOutput> AudioOutput for Rc<RefCell<T>> {
    fn current_time(&self) -> f64 {
        self.borrow().current_time()
    }

    fn submit(&mut self, tones: Vec<ToneCommand>) -> Result<(), AudioError> {
        self.borrow_mut().submit(tones)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.borrow_mut().set_volume(volume)
    }

    fn close(&mut self) {
        self.borrow_mut().close();
    }
}

/// The real-time engine. Owns the cpal stream and ring buffer producer.
pub struct AudioEngine {
    stream: cpal::Stream,
    producer: ringbuf::HeapProd<AudioCommand>,
    clock: Arc<AtomicU64>,
    sample_rate: u32,
    channels: u16,
    closed: bool,
}

impl AudioEngine {
    /// Open the default output device. `sample_rate` overrides the device
    /// default when given; `seed` drives noise sources.
    pub fn new(sample_rate: Option<u32>, seed: u64) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = sample_rate.unwrap_or(config.sample_rate().0);
        let channels = config.channels();

        Self::build_with_device(&device, sample_rate, channels, seed)
    }

    fn build_with_device(
        device: &cpal::Device,
        sample_rate: u32,
        channels: u16,
        seed: u64,
    ) -> Result<Self, AudioError> {
        let rb = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY);
        let (producer, consumer) = rb.split();

        let clock = Arc::new(AtomicU64::new(0));
        let mut mixer = Mixer::new(sample_rate, channels, seed);
        mixer.reserve(PREALLOCATED_TONES);
        let mut audio_callback = AudioCallback::new(consumer, mixer, Arc::clone(&clock));

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err: cpal::StreamError| {
            tracing::warn!(%err, "audio stream error");
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        tracing::info!(sample_rate, channels, "audio output opened");

        Ok(Self {
            stream,
            producer,
            clock,
            sample_rate,
            channels,
            closed: false,
        })
    }

    fn send(&mut self, command: AudioCommand) -> Result<(), AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        self.producer
            .try_push(command)
            .map_err(|_| AudioError::BufferFull)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl AudioOutput for AudioEngine {
    fn current_time(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    fn submit(&mut self, tones: Vec<ToneCommand>) -> Result<(), AudioError> {
        let batch = ToneBatch::new(tones, self.sample_rate);
        self.send(AudioCommand::Schedule(batch))
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.send(AudioCommand::SetVolume(volume))
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        // Pausing stops the callback outright; the Stop command covers
        // backends where pause is unsupported.
        let _ = self.producer.try_push(AudioCommand::Stop);
        if let Err(err) = self.stream.pause() {
            tracing::debug!(%err, "pause failed while closing");
        }
        self.closed = true;
        tracing::info!("audio output closed");
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires audio device; run manually with `cargo test -- --ignored`
    fn engine_opens_and_closes() {
        let mut engine = AudioEngine::new(None, 42).expect("no audio device");
        assert!(engine.sample_rate() > 0);
        assert!(engine.channels() > 0);
        assert!(engine.set_volume(0.5).is_ok());
        engine.close();
        assert!(matches!(
            engine.submit(Vec::new()),
            Err(AudioError::Closed)
        ));
    }

    #[test]
    #[ignore] // Requires audio device
    fn engine_clock_advances() {
        let engine = AudioEngine::new(None, 42).expect("no audio device");
        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(engine.current_time() > 0.0);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            AudioError::NoOutputDevice.to_string(),
            "no audio output device found"
        );
        assert_eq!(
            AudioError::BufferFull.to_string(),
            "audio command ring buffer is full"
        );
        assert_eq!(
            AudioError::DeviceConfig("test".to_string()).to_string(),
            "device config error: test"
        );
    }
}
