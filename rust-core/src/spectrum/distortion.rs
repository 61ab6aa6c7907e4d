//! Fundamental, harmonic and noise power from a magnitude spectrum
//!
//! The fundamental is simply the strongest non-DC bin. A weak fundamental
//! sitting under a stronger spur is misclassified, and every ratio below
//! inherits that. Tone bins are single bins, so window leakage around the
//! fundamental is counted as noise.

use super::peaks::centroid_frequency;

/// Ratio substituted when a denominator is zero
pub const SENTINEL_RATIO: f64 = 1e9;

/// Reported noise floor when no noise power is left
pub const NOISE_FLOOR_CLAMP_DB: f64 = -200.0;

/// Highest harmonic order searched
const MAX_HARMONIC: usize = 10;

/// Power ratio in dB, free of NaN and infinities
///
/// A zero denominator yields [`SENTINEL_RATIO`]; a zero numerator its
/// reciprocal.
pub fn ratio_db(numerator: f64, denominator: f64) -> f64 {
    let ratio = if denominator > 0.0 {
        numerator / denominator
    } else {
        SENTINEL_RATIO
    };
    let ratio = if ratio > 0.0 { ratio } else { 1.0 / SENTINEL_RATIO };
    10.0 * ratio.log10()
}

/// Tone and noise breakdown of one spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionMetrics {
    pub fundamental_bin: Option<usize>,
    pub fundamental_frequency: f64,
    pub fundamental_power: f64,
    pub harmonic_bins: Vec<usize>,
    pub harmonic_power: f64,
    pub noise_power: f64,
    pub largest_spur_power: f64,
    pub thd_db: f64,
    pub thd_n_db: f64,
    pub snr_db: f64,
    pub sinad_db: f64,
    pub enob: f64,
    pub sfdr_db: f64,
    pub noise_floor_db: f64,
}

impl DistortionMetrics {
    /// Measure a magnitude spectrum (index 0 is DC)
    pub fn measure(magnitude: &[f64], hz_per_bin: f64) -> Self {
        let bins = magnitude.len();
        let mut tone = vec![false; bins];

        let mut fundamental_bin = None;
        for k in 1..bins {
            match fundamental_bin {
                Some(best) if magnitude[k] <= magnitude[best] => {}
                _ => fundamental_bin = Some(k),
            }
        }

        let (fundamental_frequency, fundamental_power) = match fundamental_bin {
            Some(bin) => {
                tone[bin] = true;
                (
                    centroid_frequency(magnitude, bin, 2, hz_per_bin),
                    magnitude[bin] * magnitude[bin],
                )
            }
            None => (0.0, 0.0),
        };

        let mut harmonic_bins = Vec::new();
        let mut harmonic_power = 0.0;
        if fundamental_bin.is_some() && hz_per_bin > 0.0 {
            for order in 2..=MAX_HARMONIC {
                let bin = (fundamental_frequency * order as f64 / hz_per_bin).round() as usize;
                if bin >= bins {
                    break;
                }
                if !tone[bin] {
                    tone[bin] = true;
                    harmonic_power += magnitude[bin] * magnitude[bin];
                    harmonic_bins.push(bin);
                }
            }
        }

        let mut noise_power = 0.0;
        let mut noise_bins = 0usize;
        let mut largest_spur_power = 0.0f64;
        for k in 1..bins {
            if tone[k] {
                continue;
            }
            let power = magnitude[k] * magnitude[k];
            noise_power += power;
            noise_bins += 1;
            largest_spur_power = largest_spur_power.max(power);
        }

        let sinad_db = ratio_db(fundamental_power, noise_power + harmonic_power);
        let mean_noise = if noise_bins > 0 {
            noise_power / noise_bins as f64
        } else {
            0.0
        };

        Self {
            fundamental_bin,
            fundamental_frequency,
            fundamental_power,
            harmonic_bins,
            harmonic_power,
            noise_power,
            largest_spur_power,
            thd_db: ratio_db(harmonic_power, fundamental_power),
            thd_n_db: ratio_db(harmonic_power + noise_power, fundamental_power),
            snr_db: ratio_db(fundamental_power, noise_power),
            sinad_db,
            enob: (sinad_db - 1.76) / 6.02,
            sfdr_db: ratio_db(fundamental_power, largest_spur_power),
            noise_floor_db: if mean_noise > 0.0 {
                10.0 * mean_noise.log10()
            } else {
                NOISE_FLOOR_CLAMP_DB
            },
        }
    }
}
