//! In-place radix-2 Cooley-Tukey FFT and derived spectra
//!
//! Real input is zero-padded to the next power of two and transformed in an
//! interleaved `[re, im, re, im, ...]` buffer. Twiddle factors follow a
//! per-stage recurrence computed in f64 so long transforms stay accurate.
//! The engine is pure: silence in, zeros out, no failure modes.

use std::f64::consts::PI;

/// Floor for dB conversion of zero or negative power
pub const DB_FLOOR: f32 = -120.0;

/// Smallest power of two that is >= `n` (1 for n = 0)
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Forward FFT of a real sample slice
///
/// Returns an interleaved complex buffer of length `2 * next_power_of_two(n)`.
/// Input shorter than the padded size is zero-extended.
pub fn transform(samples: &[f32]) -> Vec<f32> {
    let n = next_power_of_two(samples.len());
    let mut buffer = vec![0.0f32; 2 * n];
    for (i, &s) in samples.iter().enumerate() {
        buffer[2 * i] = s;
    }
    fft_in_place(&mut buffer, n);
    buffer
}

/// Iterative in-place FFT over `n` interleaved complex values
///
/// `n` must be a power of two. No allocation inside the butterfly loops.
fn fft_in_place(buffer: &mut [f32], n: usize) {
    debug_assert!(n.is_power_of_two());
    debug_assert_eq!(buffer.len(), 2 * n);

    // Bit-reversal permutation of the complex elements
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            buffer.swap(2 * i, 2 * j);
            buffer.swap(2 * i + 1, 2 * j + 1);
        }
    }

    // Butterfly passes, doubling the block length each round
    let mut len = 2usize;
    while len <= n {
        let angle = -2.0 * PI / len as f64;
        let (w_step_re, w_step_im) = (angle.cos(), angle.sin());
        let half = len / 2;

        let mut start = 0;
        while start < n {
            let mut w_re = 1.0f64;
            let mut w_im = 0.0f64;
            for k in 0..half {
                let even = 2 * (start + k);
                let odd = 2 * (start + k + half);

                let odd_re = buffer[odd] as f64;
                let odd_im = buffer[odd + 1] as f64;
                let t_re = w_re * odd_re - w_im * odd_im;
                let t_im = w_re * odd_im + w_im * odd_re;

                let even_re = buffer[even] as f64;
                let even_im = buffer[even + 1] as f64;

                buffer[even] = (even_re + t_re) as f32;
                buffer[even + 1] = (even_im + t_im) as f32;
                buffer[odd] = (even_re - t_re) as f32;
                buffer[odd + 1] = (even_im - t_im) as f32;

                let next_re = w_re * w_step_re - w_im * w_step_im;
                w_im = w_re * w_step_im + w_im * w_step_re;
                w_re = next_re;
            }
            start += len;
        }
        len <<= 1;
    }
}

/// Magnitude `sqrt(re^2 + im^2)` of the first `bins` complex values
pub fn magnitude_spectrum(complex: &[f32], bins: usize) -> Vec<f32> {
    let available = complex.len() / 2;
    (0..bins.min(available))
        .map(|k| {
            let re = complex[2 * k];
            let im = complex[2 * k + 1];
            (re * re + im * im).sqrt()
        })
        .collect()
}

/// Power `re^2 + im^2` of the first `bins` complex values
pub fn power_spectrum(complex: &[f32], bins: usize) -> Vec<f32> {
    let available = complex.len() / 2;
    (0..bins.min(available))
        .map(|k| {
            let re = complex[2 * k];
            let im = complex[2 * k + 1];
            re * re + im * im
        })
        .collect()
}

/// Convert power to dB relative to `max_power`
///
/// Zero or negative power (and a zero reference) map to the -120 dB floor.
pub fn power_to_db(power: f32, max_power: f32) -> f32 {
    if power <= 0.0 || max_power <= 0.0 {
        return DB_FLOOR;
    }
    (10.0 * (power / max_power).log10()).max(DB_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::num_complex::Complex;
    use rustfft::FftPlanner;
    use std::f32::consts::PI as PI32;

    #[test]
    fn test_output_length_is_padded() {
        assert_eq!(transform(&[1.0, 0.0, 0.0]).len(), 8);
        assert_eq!(transform(&vec![0.0; 1000]).len(), 2048);
        assert_eq!(transform(&[]).len(), 2);
    }

    #[test]
    fn test_silence_yields_zeros() {
        let out = transform(&vec![0.0f32; 256]);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_impulse_has_flat_spectrum() {
        let mut input = vec![0.0f32; 64];
        input[0] = 1.0;
        let out = transform(&input);
        let mags = magnitude_spectrum(&out, 32);
        for &m in &mags {
            assert!((m - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_transform_is_idempotent() {
        let input: Vec<f32> = (0..512)
            .map(|i| (i as f32 * 0.131).sin() + 0.3 * (i as f32 * 0.477).cos())
            .collect();
        let a = transform(&input);
        let b = transform(&input);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        // 1 kHz sine at 44.1 kHz, 4096-point FFT: peak near bin round(f*N/sr) = 93
        let sr = 44100.0;
        let freq = 1000.0;
        let n = 4096;
        let input: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI32 * freq * i as f32 / sr).sin())
            .collect();
        let out = transform(&input);
        let mags = magnitude_spectrum(&out, n / 2);
        let peak_bin = mags
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let expected = (freq * n as f32 / sr).round() as usize;
        assert!(
            (peak_bin as i64 - expected as i64).abs() <= 1,
            "peak at bin {}, expected near {}",
            peak_bin,
            expected
        );
    }

    #[test]
    fn test_matches_rustfft() {
        let input: Vec<f32> = (0..1024)
            .map(|i| (i as f32 * 0.0173).sin() * (i as f32 * 0.0031).cos())
            .collect();
        let ours = transform(&input);

        let mut reference: Vec<Complex<f32>> =
            input.iter().map(|&s| Complex::new(s, 0.0)).collect();
        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(1024).process(&mut reference);

        for k in 0..1024 {
            let dr = (ours[2 * k] - reference[k].re).abs();
            let di = (ours[2 * k + 1] - reference[k].im).abs();
            assert!(dr < 1e-2 && di < 1e-2, "bin {} diverges: {} {}", k, dr, di);
        }
    }

    #[test]
    fn test_power_to_db() {
        assert_eq!(power_to_db(0.0, 1.0), DB_FLOOR);
        assert_eq!(power_to_db(-1.0, 1.0), DB_FLOOR);
        assert_eq!(power_to_db(1.0, 0.0), DB_FLOOR);
        assert!((power_to_db(1.0, 1.0)).abs() < 1e-6);
        assert!((power_to_db(0.1, 1.0) + 10.0).abs() < 1e-4);
        assert_eq!(power_to_db(1e-30, 1.0), DB_FLOOR);
    }

    #[test]
    fn test_power_is_magnitude_squared() {
        let input: Vec<f32> = (0..128).map(|i| (i as f32 * 0.2).sin()).collect();
        let out = transform(&input);
        let mags = magnitude_spectrum(&out, 64);
        let powers = power_spectrum(&out, 64);
        for (m, p) in mags.iter().zip(&powers) {
            assert!((m * m - p).abs() < 1e-3);
        }
    }
}
