//! Biquad filter stage for a single voice.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz};
use serde::{Deserialize, Serialize};

/// Highest cutoff as a fraction of the sample rate; the coefficient
/// calculation rejects anything at or above Nyquist.
const MAX_CUTOFF_RATIO: f64 = 0.45;
const MIN_CUTOFF_HZ: f64 = 10.0;
const MIN_Q: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
    AllPass,
}

/// A resolved filter setting: type, cutoff in Hz and resonance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub cutoff_hz: f64,
    pub q: f64,
}

/// Running biquad. Falls through unfiltered if the coefficients cannot be
/// built.
pub struct Filter {
    stage: Option<DirectForm2Transposed<f32>>,
}

impl Filter {
    pub fn new(spec: &FilterSpec, sample_rate: u32) -> Self {
        let fs = sample_rate.max(1) as f64;
        let cutoff = spec
            .cutoff_hz
            .clamp(MIN_CUTOFF_HZ, (fs * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ));
        let q = spec.q.max(MIN_Q);

        let filter_type = match spec.kind {
            FilterKind::LowPass => biquad::Type::LowPass,
            FilterKind::HighPass => biquad::Type::HighPass,
            FilterKind::BandPass => biquad::Type::BandPass,
            FilterKind::AllPass => biquad::Type::AllPass,
        };
        let stage = match Coefficients::<f32>::from_params(
            filter_type,
            (fs as f32).hz(),
            (cutoff as f32).hz(),
            q as f32,
        ) {
            Ok(coeffs) => Some(DirectForm2Transposed::<f32>::new(coeffs)),
            Err(err) => {
                tracing::debug!(?err, ?spec, "filter coefficients rejected, bypassing");
                None
            }
        };
        Self { stage }
    }

    /// A filter that passes everything through.
    pub fn bypass() -> Self {
        Self { stage: None }
    }

    pub fn is_bypassed(&self) -> bool {
        self.stage.is_none()
    }

    pub fn run(&mut self, input: f32) -> f32 {
        match &mut self.stage {
            Some(stage) => stage.run(input),
            None => input,
        }
    }
}
