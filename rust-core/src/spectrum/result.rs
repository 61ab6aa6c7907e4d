//! Per-frame analysis snapshot

/// Metric series names, in the order `named_metrics` reports them
pub const METRIC_NAMES: [&str; 15] = [
    "dc",
    "peak",
    "rms",
    "dbfs",
    "dba",
    "dbc",
    "crest",
    "fundamental",
    "thd",
    "thd_n",
    "snr",
    "sinad",
    "enob",
    "sfdr",
    "noise_floor",
];

/// A detected spectral peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpuriousTone {
    /// Centroid-refined frequency in Hz
    pub frequency: f64,

    /// Peak bin level in dB
    pub level_db: f64,
}

/// Everything derived from one analysed frame
///
/// Built fresh by every `analyze` call and handed over to the caller; earlier
/// results are never touched again.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Sequence number of the frame (1 for the first analysed frame)
    pub frame_index: u64,

    /// Input samples as received
    pub samples: Vec<f64>,

    /// Samples after windowing and windowed-mean removal
    pub windowed: Vec<f64>,

    /// Magnitude averaged over the retained frames (calibrated if configured)
    pub magnitude: Vec<f64>,

    /// Phase of the latest frame in radians
    pub phase: Vec<f64>,

    /// Number of unique bins
    pub bins: usize,

    /// Frames that went into `magnitude`
    pub averaged_frames: usize,

    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Frequency resolution in Hz
    pub hz_per_bin: f64,

    /// Mean coefficient of the analysis window
    pub window_coherent_gain: f64,

    // Time-domain levels (unwindowed input)
    pub dc_offset: f64,
    pub peak: f64,
    pub rms: f64,
    pub dbfs: f64,
    pub dba: f64,
    pub dbc: f64,
    pub crest_factor: f64,

    // Tone analysis
    pub fundamental_frequency: f64,
    pub fundamental_power: f64,
    pub first_bin_frequency: Option<f64>,
    pub harmonic_bins: Vec<usize>,
    pub spurious_tones: Vec<SpuriousTone>,

    // Distortion and noise, all in dB except `enob` (bits)
    pub thd_db: f64,
    pub thd_n_db: f64,
    pub snr_db: f64,
    pub sinad_db: f64,
    pub enob: f64,
    pub sfdr_db: f64,
    pub noise_floor_db: f64,
}

impl AnalysisResult {
    /// Scalar metrics keyed by series name
    pub fn named_metrics(&self) -> [(&'static str, f64); 15] {
        let values = [
            self.dc_offset,
            self.peak,
            self.rms,
            self.dbfs,
            self.dba,
            self.dbc,
            self.crest_factor,
            self.fundamental_frequency,
            self.thd_db,
            self.thd_n_db,
            self.snr_db,
            self.sinad_db,
            self.enob,
            self.sfdr_db,
            self.noise_floor_db,
        ];

        let mut named = [("", 0.0); 15];
        for (slot, (name, value)) in named.iter_mut().zip(METRIC_NAMES.iter().zip(values)) {
            *slot = (*name, value);
        }
        named
    }

    /// Averaged magnitude in dB, floored at -120 dB
    pub fn magnitude_db(&self) -> Vec<f64> {
        super::peaks::to_db(&self.magnitude)
    }

    /// Centre frequency of a bin in Hz
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.hz_per_bin
    }

    /// Check if the frame had no AC content (levels hold their floor values)
    pub fn is_silent(&self) -> bool {
        self.rms <= 0.0
    }
}
