//! Messages from the scheduler to the audio thread.

use serde::Serialize;

use crate::instrument::Tone;

use super::mixer::ToneBatch;

/// One tone placed on the output clock.
///
/// `start` and `stop` are absolute seconds on the facility's clock. The
/// tone's envelope times are relative to `start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneCommand {
    pub start: f64,
    pub stop: f64,
    pub tone: Tone,
}

impl ToneCommand {
    pub fn new(start: f64, stop: f64, tone: Tone) -> Self {
        Self {
            start,
            stop: stop.max(start),
            tone,
        }
    }

    pub fn length(&self) -> f64 {
        self.stop - self.start
    }
}

/// Commands sent from the main thread to the audio thread via ring buffer.
#[derive(Debug)]
pub enum AudioCommand {
    /// Queue a batch of tones, sorted before it is sent. Tones whose start
    /// has already passed begin on the next frame.
    Schedule(ToneBatch),

    /// Set master volume (0.0 to 1.0).
    SetVolume(f32),

    /// Drop every queued and sounding tone.
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{GainEnvelope, Modulation, Source, Waveform};
    use ringbuf::{
        traits::{Consumer, Producer, Split},
        HeapRb,
    };

    fn tone() -> Tone {
        Tone {
            source: Source::Oscillator {
                waveform: Waveform::Sine,
                freq_hz: 440.0,
                sweep: None,
            },
            filter: None,
            envelope: GainEnvelope::default(),
            modulation: Modulation::None,
        }
    }

    #[test]
    fn stop_never_precedes_start() {
        let cmd = ToneCommand::new(1.0, 0.5, tone());
        assert_eq!(cmd.stop, 1.0);
        assert_eq!(cmd.length(), 0.0);
    }

    #[test]
    fn commands_keep_order_through_queue() {
        let rb = HeapRb::<AudioCommand>::new(16);
        let (mut prod, mut cons) = rb.split();

        prod.try_push(AudioCommand::SetVolume(0.5)).unwrap();
        let batch = ToneBatch::new(vec![ToneCommand::new(0.1, 0.6, tone())], 1000);
        prod.try_push(AudioCommand::Schedule(batch)).unwrap();
        prod.try_push(AudioCommand::Stop).unwrap();

        assert!(matches!(
            cons.try_pop().unwrap(),
            AudioCommand::SetVolume(_)
        ));
        match cons.try_pop().unwrap() {
            AudioCommand::Schedule(batch) => {
                assert_eq!(batch.len(), 1);
                assert_eq!(batch.start_frames().next(), Some(100));
            }
            other => panic!("expected Schedule, got {other:?}"),
        }
        assert!(matches!(cons.try_pop().unwrap(), AudioCommand::Stop));
        assert!(cons.try_pop().is_none());
    }
}
