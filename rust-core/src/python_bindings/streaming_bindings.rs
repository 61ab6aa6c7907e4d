//! Python bindings for the streaming analysis filter

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use crate::spectrum::{AnalyzerConfig, StreamingAnalysisFilter, StreamingConfig};
use super::filter_bindings::PyWindowType;
use super::spectrum_bindings::result_to_dict;

/// Streaming analysis filter exposed to Python
#[pyclass(name = "StreamingAnalysisFilter")]
pub struct PyStreamingAnalysisFilter {
    filter: StreamingAnalysisFilter,
}

#[pymethods]
impl PyStreamingAnalysisFilter {
    /// Create a new streaming filter
    ///
    /// Args:
    ///     width: Sliding window length
    ///     stride: Samples between analyses (defaults to width)
    ///     window_type: Window type for analysis
    ///     sample_rate: Sample rate in Hz
    #[new]
    #[pyo3(signature = (width=4096, stride=None, window_type=PyWindowType::Hann, sample_rate=48000.0))]
    fn new(
        width: usize,
        stride: Option<usize>,
        window_type: PyWindowType,
        sample_rate: f64,
    ) -> PyResult<Self> {
        let config = StreamingConfig {
            analyzer: AnalyzerConfig {
                width,
                window_type: window_type.into(),
                sample_rate,
                ..AnalyzerConfig::default()
            },
            stride: stride.unwrap_or(width),
        };

        Ok(Self {
            filter: StreamingAnalysisFilter::new(config)?,
        })
    }

    /// Push one sample, returns the fundamental frequency estimate
    fn insert(&mut self, value: f64) -> PyResult<f64> {
        Ok(self.filter.insert(value)?)
    }

    /// Push a block of samples, returns the fundamental frequency estimate
    fn insert_bulk(&mut self, values: PyReadonlyArray1<f64>) -> PyResult<f64> {
        Ok(self.filter.insert_bulk(values.as_slice()?)?)
    }

    /// History of one metric, or None for an unknown name
    fn series<'py>(&self, py: Python<'py>, name: &str) -> Option<&'py PyArray1<f64>> {
        self.filter
            .series(name)
            .map(|values| PyArray1::from_slice(py, values))
    }

    /// All metric series keyed by name
    fn all_series<'py>(&self, py: Python<'py>) -> PyResult<&'py PyDict> {
        let dict = PyDict::new(py);
        for (name, values) in self.filter.all_series() {
            dict.set_item(*name, PyArray1::from_slice(py, values))?;
        }
        Ok(dict)
    }

    /// Most recent analysis as a dict
    fn latest<'py>(&self, py: Python<'py>) -> PyResult<Option<&'py PyDict>> {
        self.filter
            .latest()
            .map(|result| result_to_dict(py, result))
            .transpose()
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
