//! Window functions, FIR filtering and frequency weighting

pub mod fir;
pub mod weighting;
pub mod windows;

pub use fir::FirFilter;
pub use weighting::{CurvePoint, FirWeighting, SpectralWeighting, WeightingFilter};
pub use windows::{generate_window, WindowType};
