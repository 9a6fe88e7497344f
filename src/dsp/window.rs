//! Analysis window functions
//!
//! Pure per-sample coefficient generators used to shape a frame before the
//! FFT. All coefficients lie in [0, 1]; Rectangular is the identity window.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Default Kaiser shape parameter (alpha)
pub const KAISER_DEFAULT_ALPHA: f32 = 5.0;

/// Number of terms in the truncated Bessel I0 power series
const BESSEL_I0_TERMS: usize = 25;

/// Supported window functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowFunction {
    /// Hann window: good general-purpose leakage suppression
    Hanning,
    /// Hamming window: non-zero endpoints, lower first sidelobe
    Hamming,
    /// Blackman window: strong sidelobe suppression, wider main lobe
    Blackman,
    /// No windowing (all coefficients 1.0)
    Rectangular,
    /// Kaiser window with alpha = 5.0
    Kaiser,
}

/// Compute window coefficients for the given function and length
///
/// Lengths of 0 or 1 are handled by guarding the `N-1` denominator, so a
/// length-1 window is a single coefficient rather than a division by zero.
pub fn coefficients(function: WindowFunction, length: usize) -> Vec<f32> {
    let denom = (length.saturating_sub(1)).max(1) as f32;

    (0..length)
        .map(|i| {
            let i = i as f32;
            match function {
                WindowFunction::Hanning => 0.5 * (1.0 - (2.0 * PI * i / denom).cos()),
                WindowFunction::Hamming => 0.54 - 0.46 * (2.0 * PI * i / denom).cos(),
                WindowFunction::Blackman => {
                    0.42 - 0.5 * (2.0 * PI * i / denom).cos()
                        + 0.08 * (4.0 * PI * i / denom).cos()
                }
                WindowFunction::Rectangular => 1.0,
                WindowFunction::Kaiser => {
                    let x = 2.0 * i / denom - 1.0;
                    let arg = KAISER_DEFAULT_ALPHA * (1.0 - x * x).max(0.0).sqrt();
                    bessel_i0(arg) / bessel_i0(KAISER_DEFAULT_ALPHA)
                }
            }
        })
        .collect()
}

/// Modified Bessel function of the first kind, order zero
///
/// Truncated power series `sum_k ((x^2/4)^k / (k!)^2)`, accumulated in f64 to
/// keep the high-order terms from losing precision.
fn bessel_i0(x: f32) -> f32 {
    let x2_over_4 = (x as f64) * (x as f64) / 4.0;
    let mut sum = 1.0f64;
    let mut term = 1.0f64;
    for k in 1..BESSEL_I0_TERMS {
        term *= x2_over_4 / ((k * k) as f64);
        sum += term;
    }
    sum as f32
}
