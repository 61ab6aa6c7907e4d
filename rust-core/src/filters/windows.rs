//! Window functions for spectral analysis and FIR shaping
//!
//! Every family is a pure function of a ratio in [0, 1]. Windows are generated
//! from the first half and mirrored, so they are exactly symmetric for odd and
//! even lengths alike.

use std::f64::consts::PI;

/// Dynamic range of the logarithmic taper in dB
const LOG_TAPER_RANGE_DB: f64 = 60.0;

/// Bisection steps used by families without a closed-form inverse
const BISECTION_STEPS: usize = 20;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    /// Rectangular window, 1 on the half-open interval [0, 1)
    Rectangular,

    /// Hamming window: w = 0.54 - 0.46*cos(2πr)
    /// Sidelobe attenuation: ~43 dB
    Hamming,

    /// Blackman window: w = 0.42 - 0.5*cos(2πr) + 0.08*cos(4πr)
    /// Sidelobe attenuation: ~58 dB
    Blackman,

    /// Hann (raised cosine) window: w = 0.5 - 0.5*cos(2πr)
    Hann,

    /// Squared raised cosine: w = (0.5 - 0.5*cos(2πr))²
    RaisedCosineSquared,

    /// Exponential taper spanning 60 dB from the edges to the centre
    Logarithmic,

    /// Raised cosine over the first and last quarter, flat in between
    QuarterRaisedCosine,
}

impl WindowType {
    /// All window families
    pub const ALL: [WindowType; 7] = [
        WindowType::Rectangular,
        WindowType::Hamming,
        WindowType::Blackman,
        WindowType::Hann,
        WindowType::RaisedCosineSquared,
        WindowType::Logarithmic,
        WindowType::QuarterRaisedCosine,
    ];

    /// Resolve the family to its coefficient function
    pub fn shape(self) -> fn(f64) -> f64 {
        match self {
            WindowType::Rectangular => rectangular,
            WindowType::Hamming => hamming,
            WindowType::Blackman => blackman,
            WindowType::Hann => hann,
            WindowType::RaisedCosineSquared => raised_cosine_squared,
            WindowType::Logarithmic => logarithmic,
            WindowType::QuarterRaisedCosine => quarter_raised_cosine,
        }
    }

    /// Coefficient at a fractional position `ratio` in [0, 1]
    ///
    /// Positions outside the window support yield 0.
    pub fn coefficient(self, ratio: f64) -> f64 {
        (self.shape())(ratio)
    }

    /// Position in [0, 0.5] whose coefficient equals `value`
    ///
    /// Rising half of the window only. `Blackman` has no convenient closed form
    /// and is inverted by a 20-step bisection, so its result is an
    /// approximation (resolution 0.5 / 2^20). Rectangular maps any value of at
    /// least 0.5 to the start of its support and anything smaller to its end.
    /// The flat part of `QuarterRaisedCosine` inverts to its first point, 0.25.
    pub fn inverse(self, value: f64) -> f64 {
        match self {
            WindowType::Rectangular => {
                if value >= 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
            WindowType::Hann => hann_inverse(value),
            WindowType::RaisedCosineSquared => hann_inverse(value.max(0.0).sqrt()),
            WindowType::Hamming => {
                let c = ((0.54 - value) / 0.46).clamp(-1.0, 1.0);
                c.acos() / (2.0 * PI)
            }
            WindowType::Blackman => bisect_rising_half(blackman, value),
            WindowType::Logarithmic => {
                if value <= 0.0 {
                    return 0.0;
                }
                let t = 1.0 + 20.0 * value.log10() / LOG_TAPER_RANGE_DB;
                t.clamp(0.0, 1.0) / 2.0
            }
            WindowType::QuarterRaisedCosine => {
                let c = (1.0 - 2.0 * value).clamp(-1.0, 1.0);
                c.acos() / (4.0 * PI)
            }
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            WindowType::Rectangular => "Rectangular",
            WindowType::Hamming => "Hamming",
            WindowType::Blackman => "Blackman",
            WindowType::Hann => "Hann",
            WindowType::RaisedCosineSquared => "RaisedCosineSquared",
            WindowType::Logarithmic => "Logarithmic",
            WindowType::QuarterRaisedCosine => "QuarterRaisedCosine",
        }
    }
}

fn in_support(ratio: f64) -> bool {
    (0.0..=1.0).contains(&ratio)
}

fn rectangular(ratio: f64) -> f64 {
    if (0.0..1.0).contains(&ratio) {
        1.0
    } else {
        0.0
    }
}

fn hann(ratio: f64) -> f64 {
    if !in_support(ratio) {
        return 0.0;
    }
    0.5 - 0.5 * (2.0 * PI * ratio).cos()
}

fn hann_inverse(value: f64) -> f64 {
    let c = (1.0 - 2.0 * value).clamp(-1.0, 1.0);
    c.acos() / (2.0 * PI)
}

fn raised_cosine_squared(ratio: f64) -> f64 {
    let w = hann(ratio);
    w * w
}

fn hamming(ratio: f64) -> f64 {
    if !in_support(ratio) {
        return 0.0;
    }
    0.54 - 0.46 * (2.0 * PI * ratio).cos()
}

fn blackman(ratio: f64) -> f64 {
    if !in_support(ratio) {
        return 0.0;
    }
    let w = 0.42 - 0.5 * (2.0 * PI * ratio).cos() + 0.08 * (4.0 * PI * ratio).cos();
    // Endpoints evaluate to -1.4e-17
    w.max(0.0)
}

fn logarithmic(ratio: f64) -> f64 {
    if !in_support(ratio) {
        return 0.0;
    }
    let t = 1.0 - (1.0 - 2.0 * ratio).abs();
    10f64.powf(LOG_TAPER_RANGE_DB * (t - 1.0) / 20.0)
}

fn quarter_raised_cosine(ratio: f64) -> f64 {
    if !in_support(ratio) {
        return 0.0;
    }
    let edge = ratio.min(1.0 - ratio);
    if edge >= 0.25 {
        1.0
    } else {
        0.5 - 0.5 * (4.0 * PI * edge).cos()
    }
}

/// Invert a window that rises monotonically on [0, 0.5]
fn bisect_rising_half(shape: fn(f64) -> f64, value: f64) -> f64 {
    let (mut lo, mut hi) = (0.0, 0.5);
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if shape(mid) < value {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    let shape = window_type.shape();
    let mut window = vec![0.0; length];
    if length == 0 {
        return window;
    }
    if length == 1 {
        window[0] = shape(0.5);
        return window;
    }

    let span = (length - 1) as f64;
    for n in 0..(length + 1) / 2 {
        let w = shape(n as f64 / span);
        window[n] = w;
        window[length - 1 - n] = w;
    }

    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_generation() {
        for length in [160, 161] {
            for window_type in WindowType::ALL {
                let w = generate_window(window_type, length);
                assert_eq!(w.len(), length);

                // Exact symmetry, including the odd midpoint
                for i in 0..length / 2 {
                    assert_eq!(w[i], w[length - 1 - i], "{:?} at {}", window_type, i);
                }
                assert!(w.iter().all(|&c| c >= 0.0));
            }
        }

        let hamming = generate_window(WindowType::Hamming, 161);
        assert!((hamming[80] - 1.0).abs() < 1e-10);
        assert!(hamming[0] > 0.07 && hamming[0] < 0.09);
    }

    #[test]
    fn test_rectangular_window() {
        let window = generate_window(WindowType::Rectangular, 100);
        assert!(window.iter().all(|&w| w == 1.0));

        assert_eq!(WindowType::Rectangular.coefficient(0.0), 1.0);
        assert_eq!(WindowType::Rectangular.coefficient(1.0), 0.0);
        assert_eq!(WindowType::Rectangular.inverse(1.0), 0.0);
        assert_eq!(WindowType::Rectangular.inverse(0.0), 1.0);
    }

    #[test]
    fn test_logarithmic_range() {
        let edge = WindowType::Logarithmic.coefficient(0.0);
        let centre = WindowType::Logarithmic.coefficient(0.5);

        assert!((20.0 * edge.log10() + 60.0).abs() < 1e-9);
        assert!((centre - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_quarter_raised_cosine_plateau() {
        let w = WindowType::QuarterRaisedCosine;
        assert!(w.coefficient(0.0).abs() < 1e-12);
        assert!((w.coefficient(0.25) - 1.0).abs() < 1e-12);
        assert_eq!(w.coefficient(0.6), 1.0);
        assert!((w.coefficient(0.9) - w.coefficient(0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let tapered = [
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::Hann,
            WindowType::RaisedCosineSquared,
            WindowType::Logarithmic,
        ];

        for window_type in tapered {
            for i in 1..50 {
                let r = i as f64 / 100.0;
                let back = window_type.inverse(window_type.coefficient(r));
                assert!(
                    (back - r).abs() < 1e-3,
                    "{:?}: r = {}, inverse = {}",
                    window_type,
                    r,
                    back
                );
            }
        }

        // Quarter taper is only invertible on its rising edge
        for i in 1..25 {
            let r = i as f64 / 100.0;
            let w = WindowType::QuarterRaisedCosine;
            assert!((w.inverse(w.coefficient(r)) - r).abs() < 1e-3);
        }
    }
}
