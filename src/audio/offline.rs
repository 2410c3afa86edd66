//! Offline output: a deterministic clock starting at zero, rendered on demand.

use std::path::Path;

use super::command::ToneCommand;
use super::mixer::Mixer;
use super::{AudioError, AudioOutput};

/// Renders scheduled tones into memory or a WAV file instead of a device.
///
/// Time only moves when [`OfflineRenderer::render`] runs, so the first
/// render always schedules against a clock of 0.0.
pub struct OfflineRenderer {
    mixer: Mixer,
    submitted: Vec<ToneCommand>,
    closed: bool,
}

impl OfflineRenderer {
    pub fn new(sample_rate: u32, channels: u16, seed: u64) -> Self {
        Self {
            mixer: Mixer::new(sample_rate, channels, seed),
            submitted: Vec::new(),
            closed: false,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.mixer.sample_rate()
    }

    pub fn channels(&self) -> u16 {
        self.mixer.channels()
    }

    /// Every tone submitted so far, in submission order.
    pub fn commands(&self) -> &[ToneCommand] {
        &self.submitted
    }

    /// Stop time of the last tone, in seconds.
    pub fn end_time(&self) -> f64 {
        self.mixer.end_frame() as f64 / self.sample_rate() as f64
    }

    /// Render interleaved samples from the current clock until the last
    /// tone stops.
    pub fn render(&mut self) -> Vec<f32> {
        let frames = self.mixer.end_frame().saturating_sub(self.mixer.frame());
        self.render_frames(frames)
    }

    /// Render exactly `frames` frames, advancing the clock.
    pub fn render_frames(&mut self, frames: u64) -> Vec<f32> {
        let mut out = vec![0.0; frames as usize * self.channels() as usize];
        self.mixer.fill(&mut out);
        out
    }

    /// Render to a 16-bit PCM WAV file. Returns the number of frames written.
    pub fn render_to_wav(&mut self, path: &Path) -> Result<u64, AudioError> {
        let samples = self.render();
        let spec = hound::WavSpec {
            channels: self.channels(),
            sample_rate: self.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &s in &samples {
            writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;

        let frames = (samples.len() / self.channels() as usize) as u64;
        tracing::info!(path = %path.display(), frames, "wrote wav");
        Ok(frames)
    }
}

impl AudioOutput for OfflineRenderer {
    fn current_time(&self) -> f64 {
        self.mixer.frame() as f64 / self.sample_rate() as f64
    }

    fn submit(&mut self, tones: Vec<ToneCommand>) -> Result<(), AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        self.submitted.extend(tones.iter().cloned());
        self.mixer.schedule(tones);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        self.mixer.set_volume(volume);
        Ok(())
    }

    fn close(&mut self) {
        self.mixer.clear();
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::profile_for;

    fn note(start: f64, stop: f64) -> ToneCommand {
        let tone = profile_for("flute").tones(440.0, stop - start, 1.0).remove(0);
        ToneCommand::new(start, stop, tone)
    }

    #[test]
    fn clock_starts_at_zero() {
        let out = OfflineRenderer::new(8000, 1, 0);
        assert_eq!(out.current_time(), 0.0);
        assert_eq!(out.end_time(), 0.0);
    }

    #[test]
    fn renders_until_last_stop() {
        let mut out = OfflineRenderer::new(8000, 2, 0);
        out.submit(vec![note(0.1, 0.3), note(0.2, 0.5)]).unwrap();
        assert_eq!(out.commands().len(), 2);
        let samples = out.render();
        assert_eq!(samples.len(), 4000 * 2);
        assert!((out.current_time() - 0.5).abs() < 1e-9);
        assert!(samples[..1600].iter().all(|s| *s == 0.0));
        assert!(samples.iter().any(|s| s.abs() > 0.01));
    }

    #[test]
    fn partial_render_advances_clock() {
        let mut out = OfflineRenderer::new(8000, 1, 0);
        out.submit(vec![note(0.0, 0.5)]).unwrap();
        assert_eq!(out.render_frames(800).len(), 800);
        assert!((out.current_time() - 0.1).abs() < 1e-12);
        assert_eq!(out.render().len(), 3200);
    }

    #[test]
    fn closed_output_rejects_and_silences() {
        let mut out = OfflineRenderer::new(8000, 1, 0);
        out.submit(vec![note(0.0, 0.5)]).unwrap();
        out.close();
        assert!(out.render().is_empty());
        assert!(matches!(
            out.submit(vec![note(0.0, 0.1)]),
            Err(AudioError::Closed)
        ));
    }

    #[test]
    fn writes_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let mut out = OfflineRenderer::new(8000, 1, 0);
        out.submit(vec![note(0.0, 0.25)]).unwrap();
        let frames = out.render_to_wav(&path).unwrap();
        assert_eq!(frames, 2000);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.spec().bits_per_sample, 16);
        assert_eq!(reader.len(), 2000);
    }
}
