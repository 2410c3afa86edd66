//! Voice mixer driven by a frame clock.
//!
//! Shared by the real-time callback and the offline renderer: tones wait in
//! a queue until their start frame, sound until their stop frame, and the sum
//! is scaled by the master volume and hard-limited.

use crate::instrument::Voice;

use super::command::ToneCommand;

/// Output never exceeds this magnitude.
pub const LIMITER_CEILING: f32 = 0.95;

#[derive(Debug)]
struct Pending {
    start_frame: u64,
    stop_frame: u64,
    command: ToneCommand,
}

/// Tones converted to frames and sorted latest-first, ready for
/// [`Mixer::enqueue`]. Built off the audio thread.
#[derive(Debug)]
pub struct ToneBatch {
    entries: Vec<Pending>,
}

impl ToneBatch {
    pub fn new(commands: Vec<ToneCommand>, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        let mut entries: Vec<Pending> = commands
            .into_iter()
            .map(|command| {
                let start_frame = to_frame(command.start, sample_rate);
                let stop_frame = to_frame(command.stop, sample_rate).max(start_frame);
                Pending {
                    start_frame,
                    stop_frame,
                    command,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.start_frame.cmp(&a.start_frame));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start frame of every tone, in queue order (latest first).
    pub fn start_frames(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|p| p.start_frame)
    }
}

struct Sounding {
    voice: Voice,
    stop_frame: u64,
}

pub struct Mixer {
    sample_rate: u32,
    channels: u16,
    frame: u64,
    /// Sorted by start frame, latest first, so the next due tone is at the end.
    pending: Vec<Pending>,
    sounding: Vec<Sounding>,
    volume: f32,
    seed: u64,
}

impl Mixer {
    pub fn new(sample_rate: u32, channels: u16, seed: u64) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            channels: channels.max(1),
            frame: 0,
            pending: Vec::new(),
            sounding: Vec::new(),
            volume: 1.0,
            seed,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Make room for `tones` queued and sounding tones, so the queues never
    /// grow while holding up to that many.
    pub fn reserve(&mut self, tones: usize) {
        self.pending.reserve(tones);
        self.sounding.reserve(tones);
    }

    /// Clamped to `0.0..=1.0`; NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_nan() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    /// Nothing queued and nothing sounding.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.sounding.is_empty()
    }

    /// Frame at which the last known tone stops.
    pub fn end_frame(&self) -> u64 {
        self.pending
            .iter()
            .map(|p| p.stop_frame)
            .chain(self.sounding.iter().map(|s| s.stop_frame))
            .max()
            .unwrap_or(self.frame)
            .max(self.frame)
    }

    pub fn schedule(&mut self, commands: Vec<ToneCommand>) {
        self.enqueue(ToneBatch::new(commands, self.sample_rate));
    }

    /// Add a prepared batch to the queue.
    ///
    /// An empty queue adopts the batch as is. Otherwise the batch is appended
    /// within reserved capacity and the queue re-sorted in place.
    pub fn enqueue(&mut self, batch: ToneBatch) {
        let was_empty = self.pending.is_empty();
        if was_empty && self.pending.capacity() < batch.len() {
            self.pending = batch.entries;
            return;
        }
        self.pending.extend(batch.entries);
        if !was_empty {
            self.pending
                .sort_unstable_by(|a, b| b.start_frame.cmp(&a.start_frame));
        }
    }

    /// Silence everything. The clock keeps running.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.sounding.clear();
    }

    /// Fill an interleaved buffer, advancing the clock one frame per
    /// `channels` samples. Every channel carries the same mono mix.
    pub fn fill(&mut self, output: &mut [f32]) {
        let channels = self.channels as usize;
        for frame in output.chunks_mut(channels) {
            let sample = self.next_frame();
            for out in frame.iter_mut() {
                *out = sample;
            }
        }
    }

    fn next_frame(&mut self) -> f32 {
        while let Some(next) = self.pending.last() {
            if next.start_frame > self.frame {
                break;
            }
            if let Some(due) = self.pending.pop() {
                self.seed = self.seed.wrapping_add(1);
                self.sounding.push(Sounding {
                    voice: Voice::from_tone(due.command.tone, self.sample_rate, self.seed),
                    stop_frame: due.stop_frame,
                });
            }
        }

        let now = self.frame;
        self.sounding.retain(|s| s.stop_frame > now);

        let mix: f32 = self
            .sounding
            .iter_mut()
            .map(|s| s.voice.next_sample())
            .sum();
        self.frame += 1;

        (mix * self.volume).clamp(-LIMITER_CEILING, LIMITER_CEILING)
    }
}

fn to_frame(secs: f64, sample_rate: u32) -> u64 {
    (secs.max(0.0) * sample_rate as f64).round() as u64
}
