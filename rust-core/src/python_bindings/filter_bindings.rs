//! Python bindings for window types and FIR filtering

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use crate::filters::{generate_window, FirFilter, WindowType};

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone, Copy)]
pub enum PyWindowType {
    Rectangular,
    Hamming,
    Blackman,
    Hann,
    RaisedCosineSquared,
    Logarithmic,
    QuarterRaisedCosine,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Rectangular => WindowType::Rectangular,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::RaisedCosineSquared => WindowType::RaisedCosineSquared,
            PyWindowType::Logarithmic => WindowType::Logarithmic,
            PyWindowType::QuarterRaisedCosine => WindowType::QuarterRaisedCosine,
        }
    }
}

impl From<WindowType> for PyWindowType {
    fn from(win: WindowType) -> Self {
        match win {
            WindowType::Rectangular => PyWindowType::Rectangular,
            WindowType::Hamming => PyWindowType::Hamming,
            WindowType::Blackman => PyWindowType::Blackman,
            WindowType::Hann => PyWindowType::Hann,
            WindowType::RaisedCosineSquared => PyWindowType::RaisedCosineSquared,
            WindowType::Logarithmic => PyWindowType::Logarithmic,
            WindowType::QuarterRaisedCosine => PyWindowType::QuarterRaisedCosine,
        }
    }
}

#[pymethods]
impl PyWindowType {
    /// Generate `length` window coefficients
    fn coefficients<'py>(&self, py: Python<'py>, length: usize) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, generate_window((*self).into(), length))
    }

    /// Window value at a ratio in [0, 1]
    fn coefficient(&self, ratio: f64) -> f64 {
        WindowType::from(*self).coefficient(ratio)
    }

    /// Ratio at which the window takes `value`
    fn inverse(&self, value: f64) -> f64 {
        WindowType::from(*self).inverse(value)
    }

    fn label(&self) -> &'static str {
        WindowType::from(*self).label()
    }
}

/// FIR filter exposed to Python
#[pyclass(name = "FirFilter")]
pub struct PyFirFilter {
    filter: FirFilter,
}

#[pymethods]
impl PyFirFilter {
    /// Create a new FIR filter
    ///
    /// Args:
    ///     taps: Filter coefficients as numpy array
    #[new]
    fn new(taps: PyReadonlyArray1<f64>) -> PyResult<Self> {
        Ok(Self {
            filter: FirFilter::new(taps.as_slice()?.to_vec()),
        })
    }

    /// Process a block of samples
    fn process_block<'py>(
        &mut self,
        py: Python<'py>,
        input_signal: PyReadonlyArray1<f64>,
    ) -> PyResult<&'py PyArray1<f64>> {
        let output = self.filter.process_block(input_signal.as_slice()?);
        Ok(PyArray1::from_vec(py, output))
    }

    /// Reset filter state
    fn reset(&mut self) {
        self.filter.reset();
    }

    fn get_taps<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, self.filter.taps().to_vec())
    }

    /// Get group delay in samples
    fn group_delay(&self) -> f64 {
        self.filter.group_delay_samples()
    }
}
