//! End-to-end checks through the public API

use spectral_trace::filters::weighting::FirWeighting;
use spectral_trace::{
    AnalysisError, AnalyzerConfig, CircularSampleBuffer, CopyPolicy, PlanCache,
    SpectralAnalyzer, SpectralTransform, StreamingAnalysisFilter, StreamingConfig, WindowType,
};
use std::f64::consts::PI;
use std::sync::Arc;
use std::thread;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sine(len: usize, freq: f64, amplitude: f64, sample_rate: f64) -> Vec<f64> {
    (0..len)
        .map(|n| amplitude * (2.0 * PI * freq * n as f64 / sample_rate).sin())
        .collect()
}

fn rect_config(width: usize, sample_rate: f64) -> AnalyzerConfig {
    AnalyzerConfig {
        width,
        window_type: WindowType::Rectangular,
        sample_rate,
        ..AnalyzerConfig::default()
    }
}

#[test]
fn test_harmonic_distortion_report() {
    init_logging();
    let sample_rate = 48000.0;
    let width = 4800;
    // 1 kHz lands on bin 100
    let mut signal = sine(width, 1000.0, 1.0, sample_rate);
    for (x, h) in signal.iter_mut().zip(sine(width, 2000.0, 0.01, sample_rate)) {
        *x += h;
    }

    let mut analyzer = SpectralAnalyzer::new(rect_config(width, sample_rate)).unwrap();
    let result = analyzer.analyze(&signal).unwrap();

    assert!((result.fundamental_frequency - 1000.0).abs() < 1e-6);
    assert!((result.thd_db + 40.0).abs() < 0.01);
    assert!(result.thd_n_db >= result.thd_db);
    assert!(result.sinad_db <= result.snr_db);
    assert_eq!(result.harmonic_bins[0], 200);

    let freqs: Vec<f64> = result.spurious_tones.iter().map(|t| t.frequency).collect();
    assert_eq!(freqs.len(), 2);
    assert!((freqs[1] - 2000.0).abs() < 1e-6);
}

#[test]
fn test_shared_plan_cache_across_threads() {
    init_logging();
    let plans = Arc::new(PlanCache::new());

    let handles: Vec<_> = (1..=4)
        .map(|k| {
            let plans = Arc::clone(&plans);
            thread::spawn(move || {
                let mut analyzer =
                    SpectralAnalyzer::with_plan_cache(rect_config(1024, 1024.0), plans).unwrap();
                let tone = sine(1024, 50.0 * k as f64, 1.0, 1024.0);
                analyzer.analyze(&tone).unwrap().fundamental_frequency
            })
        })
        .collect();

    for (k, handle) in (1..=4).zip(handles) {
        let fundamental = handle.join().unwrap();
        assert!((fundamental - 50.0 * k as f64).abs() < 1e-6);
    }
}

#[test]
fn test_fir_weighting_collaborator() {
    init_logging();
    let sample_rate = 48000.0;
    let width = 4800;
    let plans = Arc::new(PlanCache::new());
    let weighting = FirWeighting::new(Arc::clone(&plans), 1024).unwrap();
    let mut analyzer = SpectralAnalyzer::with_weighting(
        AnalyzerConfig {
            width,
            sample_rate,
            ..AnalyzerConfig::default()
        },
        plans,
        Box::new(weighting),
    )
    .unwrap();

    let result = analyzer.analyze(&sine(width, 100.0, 1.0, sample_rate)).unwrap();

    assert!(result.dba < result.dbfs - 10.0);
    assert!(result.dbc > result.dba + 5.0);
}

#[test]
fn test_streaming_matches_direct_analysis() {
    init_logging();
    let width = 256;
    let signal = sine(width * 3, 1000.0 * 12.0 / 256.0, 0.5, 1000.0);

    let mut filter = StreamingAnalysisFilter::new(StreamingConfig {
        analyzer: rect_config(width, 1000.0),
        stride: width,
    })
    .unwrap();
    filter.insert_bulk(&signal).unwrap();

    let mut analyzer = SpectralAnalyzer::new(rect_config(width, 1000.0)).unwrap();
    let direct = analyzer.analyze(&signal[2 * width..]).unwrap();
    let streamed = filter.latest().unwrap();

    assert_eq!(streamed.samples, direct.samples);
    assert_eq!(streamed.thd_db, direct.thd_db);
    assert_eq!(filter.series("fundamental").unwrap().len(), 2 * width + 1);
}

#[test]
fn test_buffer_feeds_transform() {
    let mut buffer = CircularSampleBuffer::new(8);
    buffer.insert_bulk(&[9.0, 9.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);

    let (frame, cursor) = buffer.read(buffer.cursor(), 8, CopyPolicy::EmptyIfInsufficient);
    assert_eq!(frame, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    assert_eq!(cursor, buffer.head_cursor());

    let plans = PlanCache::new();
    let mut transform = SpectralTransform::new(8, &plans).unwrap();
    transform.execute_forward(&frame).unwrap();
    assert!((transform.magnitude()[0] - 4.5).abs() < 1e-12);
}

#[test]
fn test_errors_surface() {
    let mut analyzer = SpectralAnalyzer::new(rect_config(64, 1000.0)).unwrap();
    assert_eq!(
        analyzer.analyze(&[0.0; 10]).unwrap_err(),
        AnalysisError::LengthMismatch { expected: 64, actual: 10 }
    );

    let err = StreamingAnalysisFilter::new(StreamingConfig {
        analyzer: rect_config(64, 1000.0),
        stride: 0,
    });
    assert!(matches!(err, Err(AnalysisError::InvalidParameter(_))));
}
