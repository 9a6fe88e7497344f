//! Chroma vector extraction
//!
//! Folds STFT magnitude into a 12-bin pitch-class histogram: every bin whose
//! frequency falls inside the analysis band is mapped to its nearest MIDI
//! note's pitch class and its magnitude accumulated there.

use crate::dsp::stft::Stft;

/// Number of pitch classes (C through B)
pub const PITCH_CLASSES: usize = 12;

/// Accumulate raw (unnormalized) chroma energy from an STFT
///
/// Bins outside `[min_hz, max_hz]` are ignored. The result is all-zero for an
/// empty or silent STFT. Pitch class mapping:
/// `pc = round(69 + 12 * log2(f / reference_hz)) mod 12`, wrapped positive.
pub fn accumulate_chroma(
    stft: &Stft,
    min_hz: f32,
    max_hz: f32,
    reference_hz: f32,
) -> [f32; PITCH_CLASSES] {
    let mut chroma = [0.0f32; PITCH_CLASSES];
    if reference_hz <= 0.0 {
        return chroma;
    }

    // Precompute the pitch class per bin; shared by every frame
    let bins = stft.num_bins();
    let mut bin_classes: Vec<Option<usize>> = Vec::with_capacity(bins);
    for bin in 0..bins {
        let freq = stft.bin_frequency(bin);
        if freq < min_hz || freq > max_hz || freq <= 0.0 {
            bin_classes.push(None);
        } else {
            let midi = 69.0 + 12.0 * (freq / reference_hz).log2();
            let pc = (midi.round() as i32).rem_euclid(PITCH_CLASSES as i32) as usize;
            bin_classes.push(Some(pc));
        }
    }

    for frame in &stft.frames {
        for (bin, &magnitude) in frame.iter().enumerate() {
            if let Some(pc) = bin_classes.get(bin).copied().flatten() {
                chroma[pc] += magnitude;
            }
        }
    }
    chroma
}

/// Log-compress and peak-normalize a chroma vector in place
///
/// Accumulated energy scales with frame count, so the vector is rescaled by
/// its maximum before the `ln(1 + x)` compression; otherwise long inputs push
/// every class into the flat region of the log and the class contrast the key
/// templates rely on is lost. A final peak normalization maps the loudest
/// class to 1. No-op on an all-zero vector.
pub fn normalize_chroma(chroma: &mut [f32; PITCH_CLASSES]) {
    let raw_max = chroma.iter().copied().fold(0.0f32, f32::max);
    if raw_max <= 0.0 {
        return;
    }
    for v in chroma.iter_mut() {
        *v = (1.0 + *v / raw_max).ln();
    }
    let max = chroma.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for v in chroma.iter_mut() {
            *v /= max;
        }
    }
}

/// Build a normalized chroma vector from an STFT
pub fn chroma_from_stft(
    stft: &Stft,
    min_hz: f32,
    max_hz: f32,
    reference_hz: f32,
) -> [f32; PITCH_CLASSES] {
    let mut chroma = accumulate_chroma(stft, min_hz, max_hz, reference_hz);
    normalize_chroma(&mut chroma);
    log::debug!(
        "Chroma from {} frames: max class {:?}",
        stft.num_frames(),
        chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(pc, _)| pc)
    );
    chroma
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::stft;
    use crate::dsp::window::WindowFunction;
    use std::f32::consts::PI;

    fn sine(freq: f32, seconds: f32, sr: u32) -> Vec<f32> {
        (0..(seconds * sr as f32) as usize)
            .map(|i| (2.0 * PI * freq * i as f32 / sr as f32).sin())
            .collect()
    }

    #[test]
    fn test_a440_lands_in_pitch_class_a() {
        let samples = sine(440.0, 2.0, 44100);
        let stft = stft::build(&samples, 44100, 4096, 1024, WindowFunction::Hanning).unwrap();
        let chroma = chroma_from_stft(&stft, 27.5, 5000.0, 440.0);

        // A is pitch class 9
        let peak = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(pc, _)| pc)
            .unwrap();
        assert_eq!(peak, 9);
        assert!((chroma[9] - 1.0).abs() < 1e-6, "peak should normalize to 1");
    }

    #[test]
    fn test_accumulated_chroma_is_nonnegative_with_energy() {
        let samples = sine(261.63, 1.0, 44100); // C4
        let stft = stft::build(&samples, 44100, 4096, 1024, WindowFunction::Hanning).unwrap();
        let chroma = accumulate_chroma(&stft, 27.5, 5000.0, 440.0);
        assert!(chroma.iter().all(|&v| v >= 0.0));
        assert!(chroma.iter().any(|&v| v > 0.0));
        assert_eq!(
            chroma
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .map(|(pc, _)| pc),
            Some(0) // C
        );
    }

    #[test]
    fn test_silence_gives_zero_chroma() {
        let stft =
            stft::build(&vec![0.0; 44100], 44100, 4096, 1024, WindowFunction::Hanning).unwrap();
        let chroma = chroma_from_stft(&stft, 27.5, 5000.0, 440.0);
        assert!(chroma.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_band_limits_exclude_out_of_range_bins() {
        // 10 kHz tone is above the 5 kHz analysis band
        let samples = sine(10_000.0, 1.0, 44100);
        let stft = stft::build(&samples, 44100, 4096, 1024, WindowFunction::Hanning).unwrap();
        let chroma = accumulate_chroma(&stft, 27.5, 5000.0, 440.0);
        let total: f32 = chroma.iter().sum();
        // Only window leakage should remain, far below the tone's energy
        let full = accumulate_chroma(&stft, 27.5, 22050.0, 440.0);
        let full_total: f32 = full.iter().sum();
        assert!(total < full_total * 0.1);
    }

    #[test]
    fn test_long_input_keeps_class_contrast() {
        // C4 + E4 + G4 for 5 seconds. Accumulated magnitudes grow with frame
        // count; compression must stay scale-invariant so the triad classes
        // remain well separated from spectral leakage.
        let sr = 44100u32;
        let samples: Vec<f32> = (0..(5 * sr) as usize)
            .map(|i| {
                let t = i as f32 / sr as f32;
                ((2.0 * PI * 261.63 * t).sin()
                    + (2.0 * PI * 329.63 * t).sin()
                    + (2.0 * PI * 392.0 * t).sin())
                    / 3.0
            })
            .collect();
        let stft = stft::build(&samples, sr, 4096, 1024, WindowFunction::Hanning).unwrap();
        let chroma = chroma_from_stft(&stft, 27.5, 5000.0, 440.0);

        for pc in [0usize, 4, 7] {
            assert!(chroma[pc] > 0.8, "class {} too weak: {}", pc, chroma[pc]);
        }
        for pc in (0..PITCH_CLASSES).filter(|pc| ![0, 4, 7].contains(pc)) {
            assert!(
                chroma[pc] < 0.5,
                "leakage class {} too strong: {}",
                pc,
                chroma[pc]
            );
        }

        let estimate = crate::features::key::estimate(&chroma);
        assert_eq!(estimate.key, Some(crate::analysis::result::Key::Major(0)));
    }

    #[test]
    fn test_normalize_is_noop_on_zero() {
        let mut chroma = [0.0f32; PITCH_CLASSES];
        normalize_chroma(&mut chroma);
        assert!(chroma.iter().all(|&v| v == 0.0));
    }
}
