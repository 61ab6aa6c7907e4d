//! High-level spectral analyzer
//!
//! Windows each frame, averages magnitude spectra over the last few frames and
//! derives level, distortion and noise metrics.
//!
//! Averaging is done on linear magnitudes, not power. This understates the
//! averaged noise compared with a power mean and is kept as-is.

use super::distortion::{DistortionMetrics, NOISE_FLOOR_CLAMP_DB};
use super::fft::SpectralTransform;
use super::peaks::detect_peaks;
use super::plan::PlanCache;
use super::result::AnalysisResult;
use super::windowing::Window;
use crate::error::{AnalysisError, Result};
use crate::filters::weighting::{
    a_weighting_curve, bin_gains, c_weighting_curve, CurvePoint, SpectralWeighting,
    WeightingFilter,
};
use crate::filters::windows::WindowType;
use log::{debug, trace, warn};
use ringbuf::{HeapRb, Rb};
use std::sync::Arc;

/// Spectrum analyzer configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Analysis width (samples per frame)
    pub width: usize,

    /// Window type for spectral analysis
    pub window_type: WindowType,

    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Number of frames in the magnitude average
    pub average_count: usize,

    /// Optional per-bin calibration curve, applied to the averaged spectrum
    pub calibration: Option<Vec<CurvePoint>>,

    /// Curve handed to the weighting filter for dBA
    pub a_weighting: Vec<CurvePoint>,

    /// Curve handed to the weighting filter for dBC
    pub c_weighting: Vec<CurvePoint>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            width: 4096,
            window_type: WindowType::Hann,
            sample_rate: 48000.0,
            average_count: 1,
            calibration: None,
            a_weighting: a_weighting_curve(),
            c_weighting: c_weighting_curve(),
        }
    }
}

impl AnalyzerConfig {
    /// Check ranges before anything is allocated
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(AnalysisError::InvalidWidth(self.width));
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.average_count == 0 {
            return Err(AnalysisError::InvalidParameter(
                "average count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// DC, peak deviation and AC RMS of a block
struct Levels {
    dc: f64,
    peak: f64,
    rms: f64,
}

impl Levels {
    fn measure(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                dc: 0.0,
                peak: 0.0,
                rms: 0.0,
            };
        }

        let n = samples.len() as f64;
        let dc = samples.iter().sum::<f64>() / n;
        let (peak, sum_sq) = samples.iter().fold((0.0f64, 0.0), |(p, s), &x| {
            let d = x - dc;
            (p.max(d.abs()), s + d * d)
        });

        Self {
            dc,
            peak,
            rms: (sum_sq / n).sqrt(),
        }
    }
}

/// RMS to dBFS, clamped for silence
fn level_db(rms: f64) -> f64 {
    if rms > 0.0 {
        20.0 * rms.log10()
    } else {
        NOISE_FLOOR_CLAMP_DB
    }
}

/// Windowed, averaging spectrum analyzer
///
/// Not reentrant: the magnitude history and frame counter change on every call.
pub struct SpectralAnalyzer {
    config: AnalyzerConfig,
    plans: Arc<PlanCache>,
    transform: SpectralTransform,
    window: Window,
    history: HeapRb<Vec<f64>>,
    frame_index: u64,
    weighting: Box<dyn WeightingFilter>,
}

impl SpectralAnalyzer {
    /// Create new analyzer with its own plan cache
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        Self::with_plan_cache(config, Arc::new(PlanCache::new()))
    }

    /// Create new analyzer sharing `plans` with other transforms
    pub fn with_plan_cache(config: AnalyzerConfig, plans: Arc<PlanCache>) -> Result<Self> {
        let weighting = SpectralWeighting::new(Arc::clone(&plans));
        Self::with_weighting(config, plans, Box::new(weighting))
    }

    /// Create new analyzer with a custom weighting collaborator
    pub fn with_weighting(
        config: AnalyzerConfig,
        plans: Arc<PlanCache>,
        weighting: Box<dyn WeightingFilter>,
    ) -> Result<Self> {
        config.validate()?;

        let transform = SpectralTransform::new(config.width, &plans)?;
        let window = Window::new(config.window_type, config.width);
        let history = HeapRb::new(config.average_count);

        debug!(
            "Spectral analyzer: width {}, {} window, {} Hz, {} frame average",
            config.width,
            config.window_type.label(),
            config.sample_rate,
            config.average_count
        );

        Ok(Self {
            config,
            plans,
            transform,
            window,
            history,
            frame_index: 0,
            weighting,
        })
    }

    /// Analyze one frame without SPL calibration
    pub fn analyze(&mut self, samples: &[f64]) -> Result<AnalysisResult> {
        self.analyze_calibrated(samples, 0.0)
    }

    /// Analyze one frame of exactly `width` samples
    ///
    /// # Arguments
    /// * `samples` - Frame to analyze
    /// * `spl_calibration_db` - Offset added to the dBFS, dBA and dBC levels
    pub fn analyze_calibrated(
        &mut self,
        samples: &[f64],
        spl_calibration_db: f64,
    ) -> Result<AnalysisResult> {
        let width = self.config.width;
        if samples.len() != width {
            return Err(AnalysisError::LengthMismatch {
                expected: width,
                actual: samples.len(),
            });
        }
        let sample_rate = self.config.sample_rate;

        // DC removal happens on the windowed signal
        let mut windowed = self.window.apply(samples)?;
        let windowed_mean = windowed.iter().sum::<f64>() / width as f64;
        for x in windowed.iter_mut() {
            *x -= windowed_mean;
        }

        self.transform.execute_forward(&windowed)?;
        let frame = self.transform.magnitude().to_vec();
        let phase = self.transform.phase().to_vec();

        let a_weighted = self.weigh(samples, &self.config.a_weighting)?;
        let c_weighted = self.weigh(samples, &self.config.c_weighting)?;

        // Commit point; nothing below can fail
        self.history.push_overwrite(frame);
        let (mut magnitude, averaged_frames) = self.averaged_magnitude();
        self.frame_index += 1;

        let levels = Levels::measure(samples);

        let dbfs = level_db(levels.rms);
        let crest_factor = if levels.rms <= 0.0 || dbfs == 0.0 {
            0.0
        } else {
            levels.peak / levels.rms
        };
        if levels.rms <= 0.0 {
            warn!("Frame {} is silent, levels clamped", self.frame_index);
        }

        if let Some(curve) = &self.config.calibration {
            for (m, gain) in magnitude
                .iter_mut()
                .zip(bin_gains(curve, width, sample_rate))
            {
                *m *= gain;
            }
        }

        let hz_per_bin = self.hz_per_bin();
        let spurious_tones = detect_peaks(&magnitude, hz_per_bin);
        let distortion = DistortionMetrics::measure(&magnitude, hz_per_bin);

        trace!(
            "Frame {}: fundamental {:.2} Hz, THD {:.1} dB, SNR {:.1} dB",
            self.frame_index,
            distortion.fundamental_frequency,
            distortion.thd_db,
            distortion.snr_db
        );

        Ok(AnalysisResult {
            frame_index: self.frame_index,
            samples: samples.to_vec(),
            windowed,
            bins: magnitude.len(),
            magnitude,
            phase,
            averaged_frames,
            sample_rate,
            hz_per_bin,
            window_coherent_gain: self.window.coherent_gain(),
            dc_offset: levels.dc,
            peak: levels.peak,
            rms: levels.rms,
            dbfs: dbfs + spl_calibration_db,
            dba: level_db(Levels::measure(&a_weighted).rms) + spl_calibration_db,
            dbc: level_db(Levels::measure(&c_weighted).rms) + spl_calibration_db,
            crest_factor,
            fundamental_frequency: distortion.fundamental_frequency,
            fundamental_power: distortion.fundamental_power,
            first_bin_frequency: spurious_tones.first().map(|t| t.frequency),
            harmonic_bins: distortion.harmonic_bins,
            spurious_tones,
            thd_db: distortion.thd_db,
            thd_n_db: distortion.thd_n_db,
            snr_db: distortion.snr_db,
            sinad_db: distortion.sinad_db,
            enob: distortion.enob,
            sfdr_db: distortion.sfdr_db,
            noise_floor_db: distortion.noise_floor_db,
        })
    }

    /// Run the weighting collaborator and hold it to the frame length
    fn weigh(&self, samples: &[f64], curve: &[CurvePoint]) -> Result<Vec<f64>> {
        let weighted = self
            .weighting
            .apply(samples, curve, self.config.sample_rate)?;
        if weighted.len() != samples.len() {
            return Err(AnalysisError::LengthMismatch {
                expected: samples.len(),
                actual: weighted.len(),
            });
        }
        Ok(weighted)
    }

    /// Arithmetic mean of the retained magnitude frames
    fn averaged_magnitude(&self) -> (Vec<f64>, usize) {
        let mut sum = vec![0.0; self.transform.bins()];
        let mut frames = 0usize;
        for frame in self.history.iter() {
            for (s, &m) in sum.iter_mut().zip(frame) {
                *s += m;
            }
            frames += 1;
        }

        if frames > 1 {
            let scale = 1.0 / frames as f64;
            for s in sum.iter_mut() {
                *s *= scale;
            }
        }
        (sum, frames)
    }

    /// Replace the analysis window
    ///
    /// # Errors
    /// `WindowMismatch` if the window length differs from the analysis width
    pub fn set_window(&mut self, window: Window) -> Result<()> {
        if window.len() != self.config.width {
            return Err(AnalysisError::WindowMismatch {
                window: window.len(),
                width: self.config.width,
            });
        }
        self.config.window_type = window.window_type();
        self.window = window;
        Ok(())
    }

    /// Update configuration
    ///
    /// Rebuilds only what changed. A new width or averaging depth starts a new
    /// magnitude history.
    pub fn update_config(&mut self, config: AnalyzerConfig) -> Result<()> {
        config.validate()?;

        let width_changed = config.width != self.config.width;
        if width_changed {
            self.transform = SpectralTransform::new(config.width, &self.plans)?;
        }
        if width_changed || config.window_type != self.config.window_type {
            self.window = Window::new(config.window_type, config.width);
        }
        if width_changed || config.average_count != self.config.average_count {
            self.history = HeapRb::new(config.average_count);
        }

        debug!(
            "Analyzer reconfigured: width {}, {} window, {} Hz, {} frame average",
            config.width,
            config.window_type.label(),
            config.sample_rate,
            config.average_count
        );
        self.config = config;
        Ok(())
    }

    /// Forget the magnitude history and restart frame numbering
    pub fn reset(&mut self) {
        self.history = HeapRb::new(self.config.average_count);
        self.frame_index = 0;
    }

    /// Get current configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Frames analysed since creation or the last reset
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Get number of frequency bins
    pub fn bins(&self) -> usize {
        self.transform.bins()
    }

    /// Frequency resolution in Hz
    pub fn hz_per_bin(&self) -> f64 {
        self.transform.hz_per_bin(self.config.sample_rate)
    }

    /// Centre frequency of the last unique bin
    pub fn highest_frequency(&self) -> f64 {
        self.transform.highest_frequency(self.config.sample_rate)
    }

    /// Get frequency bins in Hz
    pub fn frequency_axis(&self) -> Vec<f64> {
        let hz_per_bin = self.hz_per_bin();
        (0..self.bins()).map(|k| k as f64 * hz_per_bin).collect()
    }
}
