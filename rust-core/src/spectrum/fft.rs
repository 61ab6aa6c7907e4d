//! Fixed-width complex FFT with cached spectral views
//!
//! Real input is stored with zero imaginary part. The forward transform is
//! scaled by 1/W so a constant input shows up as its mean in the DC bin; the
//! inverse is unscaled, which makes forward → reverse an identity.

use super::plan::{PlanCache, TransformPlan};
use crate::error::{AnalysisError, Result};
use log::debug;
use num_complex::Complex64;

/// Number of unique bins for a real transform of `width`
///
/// DC through Nyquist for even widths, DC through the last unique bin for odd.
pub fn bin_count(width: usize) -> usize {
    (width + 1) / 2 + usize::from(width % 2 == 0)
}

/// Complex FFT of a fixed width
pub struct SpectralTransform {
    width: usize,
    plan: TransformPlan,

    /// Frequency-domain buffer (W slots, Hermitian for real input)
    spectral: Vec<Complex64>,

    /// Time-domain buffer written by `execute_reverse`
    time: Vec<Complex64>,

    scratch: Vec<Complex64>,

    // Derived views, dropped whenever `spectral` changes
    magnitude: Option<Vec<f64>>,
    phase: Option<Vec<f64>>,
    real: Option<Vec<f64>>,
}

impl SpectralTransform {
    /// Create a transform of `width`, reusing plans from `plans`
    pub fn new(width: usize, plans: &PlanCache) -> Result<Self> {
        let plan = plans.plan(width)?;
        let zero = Complex64::new(0.0, 0.0);

        Ok(Self {
            width,
            spectral: vec![zero; width],
            time: vec![zero; width],
            scratch: vec![zero; plan.scratch_len()],
            plan,
            magnitude: None,
            phase: None,
            real: None,
        })
    }

    /// Transform width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of unique frequency bins
    pub fn bins(&self) -> usize {
        bin_count(self.width)
    }

    /// Frequency resolution for a given sample rate
    pub fn hz_per_bin(&self, sample_rate: f64) -> f64 {
        sample_rate / self.width as f64
    }

    /// Centre frequency of the last unique bin (Nyquist for even widths)
    pub fn highest_frequency(&self, sample_rate: f64) -> f64 {
        (self.bins() - 1) as f64 * self.hz_per_bin(sample_rate)
    }

    fn invalidate(&mut self) {
        self.magnitude = None;
        self.phase = None;
        self.real = None;
    }

    /// Forward transform of `samples`, scaled by 1/W
    pub fn execute_forward(&mut self, samples: &[f64]) -> Result<()> {
        if samples.len() != self.width {
            return Err(AnalysisError::LengthMismatch {
                expected: self.width,
                actual: samples.len(),
            });
        }

        for (slot, &x) in self.spectral.iter_mut().zip(samples) {
            *slot = Complex64::new(x, 0.0);
        }
        self.plan
            .forward()
            .process_with_scratch(&mut self.spectral, &mut self.scratch);

        let scale = 1.0 / self.width as f64;
        for c in self.spectral.iter_mut() {
            *c *= scale;
        }

        self.invalidate();
        Ok(())
    }

    /// Unscaled inverse transform of the current spectrum into the time buffer
    pub fn execute_reverse(&mut self) {
        self.time.copy_from_slice(&self.spectral);
        self.plan
            .inverse()
            .process_with_scratch(&mut self.time, &mut self.scratch);
    }

    /// Complex spectrum (all W slots)
    pub fn spectrum(&self) -> &[Complex64] {
        &self.spectral
    }

    /// Real part of the time buffer after `execute_reverse`
    pub fn time_real(&self) -> Vec<f64> {
        self.time.iter().map(|c| c.re).collect()
    }

    /// Magnitude of each unique bin
    pub fn magnitude(&mut self) -> &[f64] {
        let bins = self.bins();
        let spectral = &self.spectral;
        self.magnitude
            .get_or_insert_with(|| spectral[..bins].iter().map(|c| c.norm()).collect())
    }

    /// Phase of each unique bin in radians
    pub fn phase(&mut self) -> &[f64] {
        let bins = self.bins();
        let spectral = &self.spectral;
        self.phase
            .get_or_insert_with(|| spectral[..bins].iter().map(|c| c.arg()).collect())
    }

    /// Real part of each unique bin
    pub fn real(&mut self) -> &[f64] {
        let bins = self.bins();
        let spectral = &self.spectral;
        self.real
            .get_or_insert_with(|| spectral[..bins].iter().map(|c| c.re).collect())
    }

    /// Scale each bin and its conjugate mirror by a real gain
    ///
    /// Bins beyond the end of `coeffs` get gain 0.
    pub fn apply_spectral_gain(&mut self, coeffs: &[f64]) {
        let width = self.width;
        for k in 0..self.bins() {
            let gain = coeffs.get(k).copied().unwrap_or(0.0);
            self.spectral[k] *= gain;

            let mirror = (width - k) % width;
            if mirror != k {
                self.spectral[mirror] *= gain;
            }
        }
        self.invalidate();
    }

    /// Rotate every bin by a constant phase
    pub fn spectral_phase_shift(&mut self, radians: f64) {
        let rotation = Complex64::from_polar(1.0, radians);
        for c in self.spectral.iter_mut() {
            *c *= rotation;
        }
        self.invalidate();
    }

    /// Rebuild a Hermitian spectrum from per-bin magnitude and phase
    pub fn set_spectral(&mut self, magnitude: &[f64], phase: &[f64]) -> Result<()> {
        let bins = self.bins();
        for len in [magnitude.len(), phase.len()] {
            if len != bins {
                return Err(AnalysisError::LengthMismatch {
                    expected: bins,
                    actual: len,
                });
            }
        }

        let width = self.width;
        for k in 0..bins {
            let c = Complex64::from_polar(magnitude[k], phase[k]);
            self.spectral[k] = c;

            let mirror = (width - k) % width;
            if mirror != k {
                self.spectral[mirror] = c.conj();
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Synthesize an impulse response whose frequency response follows `coeffs`
    ///
    /// Starts from a flat unit-impulse spectrum, applies `coeffs` as per-bin
    /// gain and inverse-transforms. The circular response is then rotated so
    /// its peak sits at the middle and the central W/2 taps are returned.
    pub fn generate_fir(&mut self, sample_rate: f64, coeffs: &[f64]) -> Result<Vec<f64>> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }

        let bins = self.bins();
        let flat = vec![1.0 / self.width as f64; bins];
        self.set_spectral(&flat, &vec![0.0; bins])?;
        self.apply_spectral_gain(coeffs);
        self.execute_reverse();

        let half = self.width / 2;
        let centre = self.width / 4;
        let taps = (0..half)
            .map(|i| self.time[(i + self.width - centre) % self.width].re)
            .collect();

        debug!(
            "Generated {}-tap FIR at {:.3} Hz/bin",
            half,
            self.hz_per_bin(sample_rate)
        );
        Ok(taps)
    }
}
