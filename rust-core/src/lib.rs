//! Spectral Trace - signal analysis core
//!
//! Bounded sample history, windowed FFT analysis and signal-quality metrics
//! (THD, SNR, SINAD, ENOB, SFDR) for streamed traces, with optional Python
//! bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod buffer;
pub mod error;
pub mod filters;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use buffer::{CircularSampleBuffer, CopyPolicy, Cursor};
pub use error::{AnalysisError, Result};
pub use filters::{CurvePoint, FirFilter, WindowType};
pub use spectrum::{
    AnalysisResult, AnalyzerConfig, PlanCache, SpectralAnalyzer, SpectralTransform,
    StreamingAnalysisFilter, StreamingConfig,
};
