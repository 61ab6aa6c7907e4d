//! Streaming FIR filter
//!
//! Direct-form convolution over a fixed ring delay line, used to run impulse
//! responses synthesized by `SpectralTransform::generate_fir`.

/// Real-time FIR filter with a zero-allocation delay line
pub struct FirFilter {
    /// Filter taps h[n]
    taps: Vec<f64>,

    /// Delay line holding the last `taps.len()` inputs
    delay: Vec<f64>,

    /// Next write position in the delay line
    cursor: usize,
}

impl FirFilter {
    /// Create a new FIR filter from its taps
    ///
    /// An empty tap list yields a filter that outputs silence.
    pub fn new(taps: Vec<f64>) -> Self {
        let delay = vec![0.0; taps.len()];
        Self {
            taps,
            delay,
            cursor: 0,
        }
    }

    /// Process single sample
    ///
    /// # Returns
    /// Output sample y[n] = Σ h[k] * x[n-k]
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let length = self.taps.len();
        if length == 0 {
            return 0.0;
        }

        self.delay[self.cursor] = input;

        let mut output = 0.0;
        for (k, &tap) in self.taps.iter().enumerate() {
            let idx = (self.cursor + length - k) % length;
            output += tap * self.delay[idx];
        }

        self.cursor = (self.cursor + 1) % length;
        output
    }

    /// Process a block of samples
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.delay.fill(0.0);
        self.cursor = 0;
    }

    /// Get filter taps
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Group delay of a symmetric (linear-phase) response, in samples
    pub fn group_delay_samples(&self) -> f64 {
        self.taps.len().saturating_sub(1) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_impulse() {
        let mut filter = FirFilter::new(vec![1.0 / 3.0; 3]);

        let out = filter.process_block(&[3.0, 0.0, 0.0, 0.0]);

        for &y in &out[..3] {
            assert!((y - 1.0).abs() < 1e-12);
        }
        assert!(out[3].abs() < 1e-12);
    }

    #[test]
    fn test_delay_line_wraps() {
        // Taps at lag 0 and lag 3
        let mut filter = FirFilter::new(vec![1.0, 0.0, 0.0, 1.0]);

        let out = filter.process_block(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert!((out[3] - 5.0).abs() < 1e-12); // 4 + 1
        assert!((out[4] - 7.0).abs() < 1e-12); // 5 + 2
    }

    #[test]
    fn test_reset_and_empty() {
        let mut filter = FirFilter::new(vec![1.0, 1.0]);
        filter.process_sample(5.0);
        filter.reset();
        assert!((filter.process_sample(1.0) - 1.0).abs() < 1e-12);

        let mut silent = FirFilter::new(Vec::new());
        assert_eq!(silent.process_sample(1.0), 0.0);
        assert_eq!(silent.group_delay_samples(), 0.0);
    }
}
