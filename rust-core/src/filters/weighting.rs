//! Frequency weighting curves and the filters that apply them
//!
//! A weighting curve is a list of (frequency, dB) control points. The analyzer
//! hands a curve to a [`WeightingFilter`] together with raw samples and gets the
//! weighted samples back; it never interprets the curve itself.

use super::fir::FirFilter;
use crate::error::{AnalysisError, Result};
use crate::spectrum::fft::{bin_count, SpectralTransform};
use crate::spectrum::plan::PlanCache;
use std::sync::Arc;

/// Third-octave centre frequencies used to sample the standard curves
const THIRD_OCTAVE_CENTRES: [f64; 34] = [
    10.0, 12.5, 16.0, 20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0,
    250.0, 315.0, 400.0, 500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0,
    4000.0, 5000.0, 6300.0, 8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
];

/// One control point of a weighting or calibration curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Frequency in Hz
    pub frequency: f64,

    /// Gain in dB at `frequency`
    pub gain_db: f64,
}

impl CurvePoint {
    pub fn new(frequency: f64, gain_db: f64) -> Self {
        Self { frequency, gain_db }
    }
}

/// Gain in dB at `frequency`, linearly interpolated between control points
///
/// Points must be sorted by frequency. Outside the curve the nearest end point
/// holds; an empty curve is flat at 0 dB.
pub fn interpolate_gain_db(curve: &[CurvePoint], frequency: f64) -> f64 {
    let (first, last) = match (curve.first(), curve.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return 0.0,
    };
    if frequency <= first.frequency {
        return first.gain_db;
    }
    if frequency >= last.frequency {
        return last.gain_db;
    }

    let upper = curve.partition_point(|p| p.frequency <= frequency);
    let (a, b) = (curve[upper - 1], curve[upper]);
    let span = b.frequency - a.frequency;
    if span <= 0.0 {
        return b.gain_db;
    }
    a.gain_db + (b.gain_db - a.gain_db) * (frequency - a.frequency) / span
}

/// Linear gain for each unique bin of a `width`-point transform
pub fn bin_gains(curve: &[CurvePoint], width: usize, sample_rate: f64) -> Vec<f64> {
    let hz_per_bin = sample_rate / width as f64;
    (0..bin_count(width))
        .map(|k| 10f64.powf(interpolate_gain_db(curve, k as f64 * hz_per_bin) / 20.0))
        .collect()
}

/// A-weighting per IEC 61672-1, sampled at third-octave centres
pub fn a_weighting_curve() -> Vec<CurvePoint> {
    THIRD_OCTAVE_CENTRES
        .iter()
        .map(|&f| {
            let f2 = f * f;
            let ra = 12194.0f64.powi(2) * f2 * f2
                / ((f2 + 20.6f64.powi(2))
                    * ((f2 + 107.7f64.powi(2)) * (f2 + 737.9f64.powi(2))).sqrt()
                    * (f2 + 12194.0f64.powi(2)));
            CurvePoint::new(f, 20.0 * ra.log10() + 2.0)
        })
        .collect()
}

/// C-weighting per IEC 61672-1, sampled at third-octave centres
pub fn c_weighting_curve() -> Vec<CurvePoint> {
    THIRD_OCTAVE_CENTRES
        .iter()
        .map(|&f| {
            let f2 = f * f;
            let rc = 12194.0f64.powi(2) * f2
                / ((f2 + 20.6f64.powi(2)) * (f2 + 12194.0f64.powi(2)));
            CurvePoint::new(f, 20.0 * rc.log10() + 0.06)
        })
        .collect()
}

/// Applies a weighting curve to a block of samples
pub trait WeightingFilter: Send + Sync {
    /// Return `samples` shaped by `curve`, same length as the input
    fn apply(&self, samples: &[f64], curve: &[CurvePoint], sample_rate: f64) -> Result<Vec<f64>>;
}

/// Zero-phase weighting in the frequency domain
///
/// The whole block is transformed at once with a real FFT, each bin is scaled
/// by the interpolated curve gain and the result is transformed back. Treats
/// the block as periodic, exactly like the analyzer's own spectrum. Plans come
/// from the shared [`PlanCache`].
pub struct SpectralWeighting {
    plans: Arc<PlanCache>,
}

impl SpectralWeighting {
    pub fn new(plans: Arc<PlanCache>) -> Self {
        Self { plans }
    }
}

impl Default for SpectralWeighting {
    fn default() -> Self {
        Self::new(Arc::new(PlanCache::new()))
    }
}

impl WeightingFilter for SpectralWeighting {
    fn apply(&self, samples: &[f64], curve: &[CurvePoint], sample_rate: f64) -> Result<Vec<f64>> {
        let n = samples.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let plan = self.plans.real_plan(n)?;
        let (r2c, c2r) = (plan.forward, plan.inverse);

        let mut input = samples.to_vec();
        let mut spectrum = r2c.make_output_vec();
        r2c.process(&mut input, &mut spectrum)
            .map_err(|e| AnalysisError::TransformFailed(e.to_string()))?;

        let hz_per_bin = sample_rate / n as f64;
        for (k, bin) in spectrum.iter_mut().enumerate() {
            let gain = 10f64.powf(interpolate_gain_db(curve, k as f64 * hz_per_bin) / 20.0);
            *bin *= gain;
        }
        // DC (and Nyquist for even n) must be purely real for the inverse
        spectrum[0].im = 0.0;
        if n % 2 == 0 {
            if let Some(nyquist) = spectrum.last_mut() {
                nyquist.im = 0.0;
            }
        }

        let mut output = c2r.make_output_vec();
        c2r.process(&mut spectrum, &mut output)
            .map_err(|e| AnalysisError::TransformFailed(e.to_string()))?;

        let scale = 1.0 / n as f64;
        Ok(output.into_iter().map(|x| x * scale).collect())
    }
}

/// Weighting through a synthesized linear-phase FIR
///
/// The curve is turned into taps with `SpectralTransform::generate_fir` and run
/// as a streaming filter; output is shifted back by the group delay so it lines
/// up with the input. Blocks shorter than the tap count are rejected.
pub struct FirWeighting {
    plans: Arc<PlanCache>,
    design_width: usize,
}

impl FirWeighting {
    /// Create a FIR weighting stage designing `design_width / 2` taps
    pub fn new(plans: Arc<PlanCache>, design_width: usize) -> Result<Self> {
        if design_width < 4 {
            return Err(AnalysisError::InvalidParameter(format!(
                "FIR design width must be at least 4, got {}",
                design_width
            )));
        }
        Ok(Self {
            plans,
            design_width,
        })
    }

    /// Taps for a curve at a given sample rate
    pub fn design(&self, curve: &[CurvePoint], sample_rate: f64) -> Result<Vec<f64>> {
        let mut transform = SpectralTransform::new(self.design_width, &self.plans)?;
        let gains = bin_gains(curve, self.design_width, sample_rate);
        transform.generate_fir(sample_rate, &gains)
    }
}

impl WeightingFilter for FirWeighting {
    fn apply(&self, samples: &[f64], curve: &[CurvePoint], sample_rate: f64) -> Result<Vec<f64>> {
        let taps = self.design_width / 2;
        if samples.len() < taps {
            return Err(AnalysisError::InvalidParameter(format!(
                "block of {} samples is shorter than the {}-tap weighting filter",
                samples.len(),
                taps
            )));
        }

        let mut filter = FirFilter::new(self.design(curve, sample_rate)?);
        // Peak of the synthesized response sits at design_width / 4
        let delay = self.design_width / 4;

        let mut output = filter.process_block(samples);
        output.extend(std::iter::repeat(0.0).take(delay).map(|x| filter.process_sample(x)));
        Ok(output.split_off(delay.min(output.len())))
    }
}
