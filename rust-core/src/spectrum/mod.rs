//! Spectral analysis with FFT

pub mod analysis;
pub mod distortion;
pub mod fft;
pub mod peaks;
pub mod plan;
pub mod result;
pub mod streaming;
pub mod windowing;

pub use analysis::{AnalyzerConfig, SpectralAnalyzer};
pub use distortion::DistortionMetrics;
pub use fft::SpectralTransform;
pub use plan::PlanCache;
pub use result::{AnalysisResult, SpuriousTone, METRIC_NAMES};
pub use streaming::{StreamingAnalysisFilter, StreamingConfig};
pub use windowing::Window;
