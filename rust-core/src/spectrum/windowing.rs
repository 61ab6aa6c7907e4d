//! Precomputed analysis windows
//!
//! Coefficients are generated once per (length, type) pair and reused for every
//! frame.

use crate::error::{AnalysisError, Result};
use crate::filters::windows::{generate_window, WindowType};

/// Immutable window coefficients for one analysis width
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    window_type: WindowType,
    coefficients: Vec<f64>,
}

impl Window {
    /// Generate a window of `length` coefficients
    pub fn new(window_type: WindowType, length: usize) -> Self {
        Self {
            window_type,
            coefficients: generate_window(window_type, length),
        }
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Multiply `signal` by the window
    ///
    /// # Errors
    /// `WindowMismatch` when the signal length differs from the window length;
    /// nothing is truncated or padded.
    pub fn apply(&self, signal: &[f64]) -> Result<Vec<f64>> {
        if signal.len() != self.coefficients.len() {
            return Err(AnalysisError::WindowMismatch {
                window: self.coefficients.len(),
                width: signal.len(),
            });
        }

        Ok(signal
            .iter()
            .zip(&self.coefficients)
            .map(|(&s, &w)| s * w)
            .collect())
    }

    /// Mean coefficient (amplitude loss of a centred tone)
    pub fn coherent_gain(&self) -> f64 {
        if self.coefficients.is_empty() {
            return 0.0;
        }
        self.coefficients.iter().sum::<f64>() / self.coefficients.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_window() {
        let window = Window::new(WindowType::Hamming, 101);
        let windowed = window.apply(&vec![1.0; 101]).unwrap();

        assert_eq!(windowed.len(), 101);
        assert!((windowed[50] - 1.0).abs() < 1e-12);
        assert!(windowed[0] < 0.1);
        assert!(windowed[100] < 0.1);
    }

    #[test]
    fn test_apply_rejects_mismatch() {
        let window = Window::new(WindowType::Hann, 8);
        let err = window.apply(&[1.0; 9]).unwrap_err();
        assert_eq!(err, AnalysisError::WindowMismatch { window: 8, width: 9 });
    }

    #[test]
    fn test_coherent_gain() {
        let rect = Window::new(WindowType::Rectangular, 100);
        let hann = Window::new(WindowType::Hann, 1000);

        assert!((rect.coherent_gain() - 1.0).abs() < 1e-12);
        assert!((hann.coherent_gain() - 0.5).abs() < 0.01);
    }
}
