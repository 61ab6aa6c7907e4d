//! PyO3 bindings for Python integration

use crate::error::AnalysisError;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

mod filter_bindings;
mod spectrum_bindings;
mod streaming_bindings;

impl From<AnalysisError> for PyErr {
    fn from(err: AnalysisError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Python module definition
#[pymodule]
fn spectral_trace(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<filter_bindings::PyFirFilter>()?;
    m.add_class::<spectrum_bindings::PySpectralAnalyzer>()?;
    m.add_class::<streaming_bindings::PyStreamingAnalysisFilter>()?;

    // Add WindowType enum
    m.add_class::<filter_bindings::PyWindowType>()?;

    Ok(())
}
