//! Audio callback, run on the cpal audio thread.
//!
//! Drains commands from the ring buffer, renders the mixer into the output
//! and publishes the frame clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::AudioCommand;
use super::mixer::Mixer;

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    mixer: Mixer,
    clock: Arc<AtomicU64>,
}

impl AudioCallback {
    /// `clock` receives the number of frames rendered after every block.
    pub fn new(consumer: HeapCons<AudioCommand>, mixer: Mixer, clock: Arc<AtomicU64>) -> Self {
        Self {
            consumer,
            mixer,
            clock,
        }
    }

    /// Called by cpal for each block. Fills `output` with interleaved samples.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::Schedule(batch) => self.mixer.enqueue(batch),
                AudioCommand::SetVolume(v) => self.mixer.set_volume(v),
                AudioCommand::Stop => self.mixer.clear(),
            }
        }

        self.mixer.fill(output);
        self.clock.store(self.mixer.frame(), Ordering::Release);
    }
}
