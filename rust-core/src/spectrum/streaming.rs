//! Streaming adapter around the spectral analyzer
//!
//! Keeps the last `width` samples in a circular buffer and re-runs the
//! analysis every `stride` inserts. Each insert appends the latest metrics to
//! per-name series, so a series grows by exactly one value per sample.

use super::analysis::{AnalyzerConfig, SpectralAnalyzer};
use super::plan::PlanCache;
use super::result::{AnalysisResult, METRIC_NAMES};
use crate::buffer::{CircularSampleBuffer, CopyPolicy};
use crate::error::{AnalysisError, Result};
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Streaming analysis configuration
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    pub analyzer: AnalyzerConfig,

    /// Inserts between analyses (1 analyses on every sample)
    pub stride: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        let analyzer = AnalyzerConfig::default();
        Self {
            stride: analyzer.width,
            analyzer,
        }
    }
}

/// Sliding-window analyzer fed one sample at a time
pub struct StreamingAnalysisFilter {
    analyzer: SpectralAnalyzer,
    window: CircularSampleBuffer<f64>,
    stride: usize,
    since_analysis: usize,
    latest: Option<AnalysisResult>,
    series: BTreeMap<&'static str, Vec<f64>>,
}

impl StreamingAnalysisFilter {
    pub fn new(config: StreamingConfig) -> Result<Self> {
        Self::with_plan_cache(config, Arc::new(PlanCache::new()))
    }

    pub fn with_plan_cache(config: StreamingConfig, plans: Arc<PlanCache>) -> Result<Self> {
        let analyzer = SpectralAnalyzer::with_plan_cache(config.analyzer, plans)?;
        Self::from_analyzer(analyzer, config.stride)
    }

    /// Wrap an existing analyzer; the window length follows its width
    pub fn from_analyzer(analyzer: SpectralAnalyzer, stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(AnalysisError::InvalidParameter(
                "stride must be at least 1".into(),
            ));
        }

        let width = analyzer.config().width;
        debug!("Streaming filter: width {}, stride {}", width, stride);

        Ok(Self {
            analyzer,
            window: CircularSampleBuffer::new(width),
            stride,
            since_analysis: 0,
            latest: None,
            series: METRIC_NAMES.iter().map(|&name| (name, Vec::new())).collect(),
        })
    }

    /// Push one sample
    ///
    /// Returns the current fundamental frequency estimate, 0 until the first
    /// analysis has run. A failed analysis still records the previous metrics
    /// for this sample and is retried on the next insert.
    pub fn insert(&mut self, value: f64) -> Result<f64> {
        self.window.insert(value);
        self.since_analysis += 1;
        let analysed = if self.since_analysis >= self.stride {
            self.run_analysis()
        } else {
            Ok(())
        };
        self.record(1);
        analysed?;
        Ok(self.fundamental())
    }

    /// Push a block of samples
    ///
    /// Produces the same series as inserting each value in turn; the buffer is
    /// filled in runs between analysis points. Values after a failed analysis
    /// are not inserted.
    pub fn insert_bulk(&mut self, values: &[f64]) -> Result<f64> {
        let mut rest = values;
        while !rest.is_empty() {
            let until_analysis = self.stride.saturating_sub(self.since_analysis).max(1);
            let run = until_analysis.min(rest.len());
            let (chunk, tail) = rest.split_at(run);

            self.window.insert_bulk(chunk);
            self.since_analysis += run;

            if self.since_analysis >= self.stride {
                self.record(run - 1);
                let analysed = self.run_analysis();
                self.record(1);
                analysed?;
            } else {
                self.record(run);
            }
            rest = tail;
        }
        Ok(self.fundamental())
    }

    /// Analyse the current window; the stride counter restarts only on success
    fn run_analysis(&mut self) -> Result<()> {
        let width = self.window.capacity();
        let start = self.window.cursor_back(width);
        let frame = self.window.copy_range(start, width, CopyPolicy::ZeroPad);
        self.latest = Some(self.analyzer.analyze(&frame)?);
        self.since_analysis = 0;
        Ok(())
    }

    /// Append the latest metrics `count` times
    fn record(&mut self, count: usize) {
        let latest = match &self.latest {
            Some(latest) => latest,
            None => return,
        };
        for (name, value) in latest.named_metrics() {
            if let Some(series) = self.series.get_mut(name) {
                series.extend(std::iter::repeat(value).take(count));
            }
        }
    }

    fn fundamental(&self) -> f64 {
        self.latest
            .as_ref()
            .map_or(0.0, |r| r.fundamental_frequency)
    }

    /// History of one metric, one value per insert since the first analysis
    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// All metric series keyed by name
    pub fn all_series(&self) -> &BTreeMap<&'static str, Vec<f64>> {
        &self.series
    }

    /// Most recent analysis result
    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.latest.as_ref()
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn analyzer(&self) -> &SpectralAnalyzer {
        &self.analyzer
    }

    /// Drop buffered samples, results and series
    pub fn reset(&mut self) {
        self.window.clear();
        self.analyzer.reset();
        self.since_analysis = 0;
        self.latest = None;
        for series in self.series.values_mut() {
            series.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::weighting::{CurvePoint, WeightingFilter};
    use crate::filters::windows::WindowType;
    use std::f64::consts::PI;

    const REJECT_MARKER: f64 = 99.0;

    /// Flat weighting that refuses windows ending in a marker value
    struct RejectingWeighting;

    impl WeightingFilter for RejectingWeighting {
        fn apply(&self, samples: &[f64], _curve: &[CurvePoint], _sample_rate: f64) -> Result<Vec<f64>> {
            if samples.last() == Some(&REJECT_MARKER) {
                return Err(AnalysisError::InvalidParameter("rejected window".into()));
            }
            Ok(samples.to_vec())
        }
    }

    fn rejecting_filter(width: usize, stride: usize) -> StreamingAnalysisFilter {
        let analyzer = SpectralAnalyzer::with_weighting(
            config(width, stride).analyzer,
            Arc::new(PlanCache::new()),
            Box::new(RejectingWeighting),
        )
        .unwrap();
        StreamingAnalysisFilter::from_analyzer(analyzer, stride).unwrap()
    }

    fn config(width: usize, stride: usize) -> StreamingConfig {
        StreamingConfig {
            analyzer: AnalyzerConfig {
                width,
                window_type: WindowType::Rectangular,
                sample_rate: 1000.0,
                ..AnalyzerConfig::default()
            },
            stride,
        }
    }

    fn sine(len: usize, freq: f64, sample_rate: f64) -> Vec<f64> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_zero_stride_rejected() {
        assert!(StreamingAnalysisFilter::new(config(64, 0)).is_err());
    }

    #[test]
    fn test_analysis_every_stride() {
        let mut filter = StreamingAnalysisFilter::new(config(64, 16)).unwrap();
        let samples = sine(64, 125.0, 1000.0);

        for &x in &samples[..15] {
            assert_eq!(filter.insert(x).unwrap(), 0.0);
        }
        assert!(filter.latest().is_none());
        assert!(filter.series("thd").unwrap().is_empty());

        filter.insert(samples[15]).unwrap();
        assert_eq!(filter.latest().unwrap().frame_index, 1);
        assert_eq!(filter.series("rms").unwrap().len(), 1);

        for &x in &samples[16..] {
            filter.insert(x).unwrap();
        }
        assert_eq!(filter.latest().unwrap().frame_index, 4);
        assert_eq!(filter.series("rms").unwrap().len(), 49);
    }

    #[test]
    fn test_full_window_tracks_tone() {
        let mut filter = StreamingAnalysisFilter::new(config(64, 64)).unwrap();
        // 125 Hz lands on bin 8 at 1000/64 Hz per bin
        let fundamental = filter.insert_bulk(&sine(64, 125.0, 1000.0)).unwrap();

        assert!((fundamental - 125.0).abs() < 1e-6);
        let thd = filter.series("thd").unwrap();
        assert_eq!(thd.len(), 1);
        assert!(thd[0] < -100.0);
    }

    #[test]
    fn test_partial_window_is_zero_padded() {
        let mut filter = StreamingAnalysisFilter::new(config(32, 8)).unwrap();
        filter.insert_bulk(&[1.0; 8]).unwrap();

        let latest = filter.latest().unwrap();
        assert_eq!(&latest.samples[..24], &[0.0; 24]);
        assert_eq!(&latest.samples[24..], &[1.0; 8]);
    }

    #[test]
    fn test_bulk_matches_single_inserts() {
        let samples = sine(300, 70.0, 1000.0);
        let mut single = StreamingAnalysisFilter::new(config(64, 10)).unwrap();
        let mut bulk = StreamingAnalysisFilter::new(config(64, 10)).unwrap();

        let mut last = 0.0;
        for &x in &samples {
            last = single.insert(x).unwrap();
        }

        // Uneven chunks straddle the analysis points
        let mut bulk_last = 0.0;
        for chunk in samples.chunks(7) {
            bulk_last = bulk.insert_bulk(chunk).unwrap();
        }

        assert_eq!(last, bulk_last);
        for name in METRIC_NAMES {
            assert_eq!(single.series(name), bulk.series(name), "series {}", name);
        }
        assert_eq!(single.series("dc").unwrap().len(), 291);
    }

    #[test]
    fn test_reset() {
        let mut filter = StreamingAnalysisFilter::new(config(16, 4)).unwrap();
        filter.insert_bulk(&[0.5; 20]).unwrap();
        assert!(filter.latest().is_some());

        filter.reset();

        assert!(filter.latest().is_none());
        assert!(filter.all_series().values().all(|s| s.is_empty()));
        assert_eq!(filter.analyzer().frame_index(), 0);
    }

    #[test]
    fn test_unknown_series() {
        let filter = StreamingAnalysisFilter::new(config(16, 4)).unwrap();
        assert!(filter.series("loudness").is_none());
    }

    #[test]
    fn test_failed_analysis_keeps_series_aligned() {
        let mut filter = rejecting_filter(16, 4);
        filter.insert_bulk(&[0.25; 11]).unwrap();
        assert_eq!(filter.series("rms").unwrap().len(), 8);

        // Fourth insert of the stride triggers a rejected analysis
        assert!(filter.insert(REJECT_MARKER).is_err());
        assert_eq!(filter.latest().unwrap().frame_index, 2);
        assert_eq!(filter.series("rms").unwrap().len(), 9);

        // Retried on the next insert
        filter.insert(0.25).unwrap();
        assert_eq!(filter.latest().unwrap().frame_index, 3);
        assert_eq!(filter.series("rms").unwrap().len(), 10);

        filter.insert_bulk(&[0.25; 4]).unwrap();
        assert_eq!(filter.latest().unwrap().frame_index, 4);
        assert_eq!(filter.series("rms").unwrap().len(), 14);
    }

    #[test]
    fn test_bulk_failure_matches_single_inserts() {
        let mut samples = vec![0.5; 20];
        samples[7] = REJECT_MARKER;

        let mut single = rejecting_filter(16, 4);
        let single_errors = samples.iter().filter(|&&x| single.insert(x).is_err()).count();
        assert_eq!(single_errors, 1);

        let mut bulk = rejecting_filter(16, 4);
        assert!(bulk.insert_bulk(&samples).is_err());
        bulk.insert_bulk(&samples[8..]).unwrap();

        for name in METRIC_NAMES {
            assert_eq!(single.series(name), bulk.series(name), "series {}", name);
        }
    }
}
