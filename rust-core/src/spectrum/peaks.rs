//! Peak and spur detection on a magnitude spectrum
//!
//! Peaks are bins that stand more than 3 dB above a smoothed baseline. The
//! baseline is a rolling mean of a rolling maximum, so broad noise humps do not
//! register while narrow tones do.

use super::result::SpuriousTone;

/// Lowest level reported for any bin, in dB
pub const DB_FLOOR: f64 = -120.0;

/// Most tones kept per frame
pub const MAX_SPURIOUS_TONES: usize = 10;

/// Margin above baseline for a bin to count as a peak, in dB
const PEAK_MARGIN_DB: f64 = 3.0;

/// Convert magnitudes to dB, floored at [`DB_FLOOR`]
pub fn to_db(magnitude: &[f64]) -> Vec<f64> {
    magnitude
        .iter()
        .map(|&m| {
            if m > 0.0 {
                (20.0 * m.log10()).max(DB_FLOOR)
            } else {
                DB_FLOOR
            }
        })
        .collect()
}

/// Index range of a centred window of `width` around `i`, clipped to `len`
#[inline]
fn centred(i: usize, width: usize, len: usize) -> (usize, usize) {
    let lo = i.saturating_sub((width.max(1) - 1) / 2);
    let hi = (i + width / 2 + 1).min(len);
    (lo, hi)
}

/// Centred rolling maximum
pub fn rolling_max(values: &[f64], width: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let (lo, hi) = centred(i, width, values.len());
            values[lo..hi].iter().copied().fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

/// Centred rolling mean (edge windows average over what is in range)
pub fn rolling_mean(values: &[f64], width: usize) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    for &v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v);
    }

    (0..values.len())
        .map(|i| {
            let (lo, hi) = centred(i, width, values.len());
            (prefix[hi] - prefix[lo]) / (hi - lo) as f64
        })
        .collect()
}

/// Magnitude-weighted centroid frequency over `centre ± half_width`
///
/// DC never contributes. Falls back to the centre bin when the window holds no
/// energy.
pub fn centroid_frequency(magnitude: &[f64], centre: usize, half_width: usize, hz_per_bin: f64) -> f64 {
    let lo = centre.saturating_sub(half_width).max(1);
    let hi = (centre + half_width + 1).min(magnitude.len());

    let (weighted, total) = (lo..hi).fold((0.0, 0.0), |(w, t), i| {
        (w + i as f64 * magnitude[i], t + magnitude[i])
    });

    if total > 0.0 {
        weighted / total * hz_per_bin
    } else {
        centre as f64 * hz_per_bin
    }
}

/// Find up to [`MAX_SPURIOUS_TONES`] peaks in scan order
pub fn detect_peaks(magnitude: &[f64], hz_per_bin: f64) -> Vec<SpuriousTone> {
    let bins = magnitude.len();
    let db = to_db(magnitude);

    let local_max = rolling_max(&db, (bins / 128).max(3));
    let baseline = rolling_mean(&local_max, (bins / 32).max(8));

    let above: Vec<f64> = local_max
        .iter()
        .zip(&baseline)
        .map(|(&m, &b)| if m > b + PEAK_MARGIN_DB { 1.0 } else { 0.0 })
        .collect();
    let in_peak: Vec<bool> = rolling_mean(&above, 3).iter().map(|&v| v > 0.5).collect();

    let mut tones = Vec::new();
    let mut k = 0;
    while k < bins && tones.len() < MAX_SPURIOUS_TONES {
        if !in_peak[k] {
            k += 1;
            continue;
        }

        let start = k;
        while k < bins && in_peak[k] {
            k += 1;
        }

        let mut best = start;
        for i in start..k {
            if magnitude[i] > magnitude[best] {
                best = i;
            }
        }
        if best == 0 {
            continue;
        }

        tones.push(SpuriousTone {
            frequency: centroid_frequency(magnitude, best, 1, hz_per_bin),
            level_db: db[best],
        });
    }

    tones
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum_with(bins: usize, tones: &[(usize, f64)]) -> Vec<f64> {
        let mut magnitude = vec![0.0; bins];
        for &(bin, level) in tones {
            magnitude[bin] = level;
        }
        magnitude
    }

    #[test]
    fn test_to_db_floor() {
        let db = to_db(&[1.0, 0.1, 0.0, 1e-9]);
        assert!((db[0] - 0.0).abs() < 1e-12);
        assert!((db[1] + 20.0).abs() < 1e-12);
        assert_eq!(db[2], DB_FLOOR);
        assert_eq!(db[3], DB_FLOOR);
    }

    #[test]
    fn test_rolling_windows() {
        let values = [1.0, 5.0, 2.0, 0.0, 3.0];

        assert_eq!(rolling_max(&values, 3), vec![5.0, 5.0, 5.0, 3.0, 3.0]);

        let mean = rolling_mean(&values, 3);
        assert!((mean[0] - 3.0).abs() < 1e-12); // edge: (1 + 5) / 2
        assert!((mean[2] - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_skips_dc() {
        let magnitude = [10.0, 1.0, 1.0, 0.0];
        // Bins 1 and 2 share the energy; DC is ignored
        let f = centroid_frequency(&magnitude, 1, 1, 100.0);
        assert!((f - 150.0).abs() < 1e-9);

        let silent = [0.0; 4];
        assert_eq!(centroid_frequency(&silent, 2, 1, 100.0), 200.0);
    }

    #[test]
    fn test_single_tone_detected() {
        let magnitude = spectrum_with(129, &[(20, 0.5)]);

        let tones = detect_peaks(&magnitude, 10.0);

        assert_eq!(tones.len(), 1);
        assert!((tones[0].frequency - 200.0).abs() < 1e-9);
        assert!((tones[0].level_db + 6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_tones_in_scan_order() {
        // Weaker tone first: order follows the bin scan, not the level
        let magnitude = spectrum_with(257, &[(30, 0.001), (90, 0.5), (200, 0.01)]);

        let tones = detect_peaks(&magnitude, 1.0);
        let freqs: Vec<f64> = tones.iter().map(|t| t.frequency).collect();

        assert_eq!(freqs, vec![30.0, 90.0, 200.0]);
    }

    #[test]
    fn test_tone_count_capped() {
        let tones: Vec<(usize, f64)> = (1..=15).map(|i| (i * 30, 0.1)).collect();
        let magnitude = spectrum_with(513, &tones);

        assert_eq!(detect_peaks(&magnitude, 1.0).len(), MAX_SPURIOUS_TONES);
    }

    #[test]
    fn test_flat_spectrum_has_no_peaks() {
        let magnitude = vec![0.01; 129];
        assert!(detect_peaks(&magnitude, 1.0).is_empty());
    }
}
