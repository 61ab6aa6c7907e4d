//! Python bindings for spectral analysis

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use crate::spectrum::{AnalysisResult, AnalyzerConfig, SpectralAnalyzer};
use super::filter_bindings::PyWindowType;

/// Convert a result into a dict of metrics and numpy arrays
pub(crate) fn result_to_dict<'py>(py: Python<'py>, result: &AnalysisResult) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    for (name, value) in result.named_metrics() {
        dict.set_item(name, value)?;
    }

    dict.set_item("frame_index", result.frame_index)?;
    dict.set_item("hz_per_bin", result.hz_per_bin)?;
    dict.set_item("fundamental_power", result.fundamental_power)?;
    dict.set_item("first_bin_frequency", result.first_bin_frequency)?;
    dict.set_item("magnitude", PyArray1::from_slice(py, &result.magnitude))?;
    dict.set_item("magnitude_db", PyArray1::from_vec(py, result.magnitude_db()))?;
    dict.set_item("phase", PyArray1::from_slice(py, &result.phase))?;

    let tones = PyList::empty(py);
    for tone in &result.spurious_tones {
        tones.append((tone.frequency, tone.level_db))?;
    }
    dict.set_item("spurious_tones", tones)?;

    Ok(dict)
}

/// Spectral analyzer exposed to Python
#[pyclass(name = "SpectralAnalyzer")]
pub struct PySpectralAnalyzer {
    analyzer: SpectralAnalyzer,
}

#[pymethods]
impl PySpectralAnalyzer {
    /// Create a new spectral analyzer
    ///
    /// Args:
    ///     width: Samples per frame
    ///     window_type: Window type for analysis
    ///     sample_rate: Sample rate in Hz
    ///     average_count: Frames in the magnitude average
    #[new]
    #[pyo3(signature = (width=4096, window_type=PyWindowType::Hann, sample_rate=48000.0, average_count=1))]
    fn new(
        width: usize,
        window_type: PyWindowType,
        sample_rate: f64,
        average_count: usize,
    ) -> PyResult<Self> {
        let config = AnalyzerConfig {
            width,
            window_type: window_type.into(),
            sample_rate,
            average_count,
            ..AnalyzerConfig::default()
        };

        Ok(Self {
            analyzer: SpectralAnalyzer::new(config)?,
        })
    }

    /// Analyze one frame
    ///
    /// Args:
    ///     signal: Exactly `width` samples as numpy array
    ///     spl_calibration: Offset in dB added to the level metrics
    ///
    /// Returns:
    ///     Dict of metrics, spectra and spurious tones
    #[pyo3(signature = (signal, spl_calibration=0.0))]
    fn analyze<'py>(
        &mut self,
        py: Python<'py>,
        signal: PyReadonlyArray1<f64>,
        spl_calibration: f64,
    ) -> PyResult<&'py PyDict> {
        let result = self
            .analyzer
            .analyze_calibrated(signal.as_slice()?, spl_calibration)?;
        result_to_dict(py, &result)
    }

    /// Get frequency bins in Hz
    fn frequency_bins_hz<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, self.analyzer.frequency_axis())
    }

    /// Get number of frequency bins
    fn num_bins(&self) -> usize {
        self.analyzer.bins()
    }

    /// Update configuration
    #[pyo3(signature = (width=None, window_type=None, sample_rate=None, average_count=None))]
    fn update_config(
        &mut self,
        width: Option<usize>,
        window_type: Option<PyWindowType>,
        sample_rate: Option<f64>,
        average_count: Option<usize>,
    ) -> PyResult<()> {
        let mut config = self.analyzer.config().clone();

        if let Some(width) = width {
            config.width = width;
        }
        if let Some(win) = window_type {
            config.window_type = win.into();
        }
        if let Some(sr) = sample_rate {
            config.sample_rate = sr;
        }
        if let Some(count) = average_count {
            config.average_count = count;
        }

        Ok(self.analyzer.update_config(config)?)
    }

    /// Clear averaging history
    fn reset(&mut self) {
        self.analyzer.reset();
    }

    fn get_sample_rate(&self) -> f64 {
        self.analyzer.config().sample_rate
    }

    fn get_width(&self) -> usize {
        self.analyzer.config().width
    }
}
