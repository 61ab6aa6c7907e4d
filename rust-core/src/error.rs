//! Error types for the analysis core

use thiserror::Error;

/// Errors surfaced by the analysis pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Sample block does not match the configured analysis width
    #[error("sample length {actual} does not match analysis width {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Window coefficients do not match the transform width
    #[error("window length {window} does not match transform width {width}")]
    WindowMismatch { window: usize, width: usize },

    /// Transform width must be at least one sample
    #[error("invalid transform width: {0}")]
    InvalidWidth(usize),

    /// Out-of-range configuration value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Plan lookup or creation failed (fatal, never retried)
    #[error("transform plan unavailable: {0}")]
    PlanUnavailable(String),

    /// Underlying FFT primitive rejected its buffers
    #[error("transform failed: {0}")]
    TransformFailed(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::LengthMismatch { expected: 8, actual: 7 };
        assert_eq!(
            err.to_string(),
            "sample length 7 does not match analysis width 8"
        );

        let err = AnalysisError::InvalidWidth(0);
        assert!(err.to_string().contains('0'));
    }
}
