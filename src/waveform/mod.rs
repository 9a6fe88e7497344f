//! Waveform amplitude sampling for scrub-bar visualization
//!
//! Downsamples PCM amplitude into a short fixed-length array of integers in
//! [0, 100]: one peak amplitude per visual bucket, rescaled so the loudest
//! bucket sits at 85 (headroom for the UI), then smoothed and
//! range-compressed so quiet material stays visible.

pub mod aiff;

use crate::error::AnalysisError;
use crate::io::decoder;
use std::path::Path;

/// Level the loudest bucket is rescaled to, leaving visual headroom
pub const PEAK_LEVEL: u8 = 85;

/// Neutral mid-level used when no audio data is available
pub const NEUTRAL_LEVEL: u8 = 50;

/// Floor of the range-compression remap
const COMPRESS_FLOOR: u8 = 30;

/// Raw ranges at or below this are left uncompressed
const COMPRESS_MIN_RANGE: u8 = 5;

/// A flat mid-level placeholder array
pub fn neutral(target: usize) -> Vec<u8> {
    vec![NEUTRAL_LEVEL; target]
}

/// Downsample normalized PCM into `target` peak-amplitude values in [0, 100]
///
/// Empty input yields the neutral placeholder so callers always have
/// something to draw.
pub fn sample_pcm(samples: &[f32], target: usize) -> Vec<u8> {
    if target == 0 {
        return Vec::new();
    }
    if samples.is_empty() {
        return neutral(target);
    }

    // Peak absolute amplitude per bucket
    let mut peaks = vec![0.0f32; target];
    for (bucket, peak) in peaks.iter_mut().enumerate() {
        let start = bucket * samples.len() / target;
        let end = ((bucket + 1) * samples.len() / target).max(start + 1);
        *peak = samples[start..end.min(samples.len())]
            .iter()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max);
    }

    let max_peak = peaks.iter().copied().fold(0.0f32, f32::max);
    if max_peak <= 0.0 {
        return neutral(target);
    }

    let mut values: Vec<u8> = peaks
        .iter()
        .map(|&p| {
            let scaled = p / max_peak * PEAK_LEVEL as f32;
            scaled.round().clamp(0.0, 100.0) as u8
        })
        .collect();

    postprocess(&mut values);
    values
}

/// Smooth and range-compress a waveform array in place
///
/// Applied by every extraction path: 3-point moving average
/// `(prev + 2*curr + next) / 4`, then a `[min, max] -> [30, 85]` remap when
/// the raw range exceeds 5.
pub fn postprocess(values: &mut [u8]) {
    smooth3(values);
    compress_range(values);
}

fn smooth3(values: &mut [u8]) {
    if values.len() < 3 {
        return;
    }
    let original = values.to_vec();
    for i in 1..original.len() - 1 {
        let sum = original[i - 1] as u16 + 2 * original[i] as u16 + original[i + 1] as u16;
        values[i] = (sum / 4) as u8;
    }
}

fn compress_range(values: &mut [u8]) {
    let Some(&min) = values.iter().min() else {
        return;
    };
    let Some(&max) = values.iter().max() else {
        return;
    };
    let range = max - min;
    if range <= COMPRESS_MIN_RANGE {
        return;
    }
    let span = (PEAK_LEVEL - COMPRESS_FLOOR) as f32;
    for v in values.iter_mut() {
        let t = (*v - min) as f32 / range as f32;
        *v = (COMPRESS_FLOOR as f32 + t * span).round().clamp(0.0, 100.0) as u8;
    }
}

/// Sample a waveform from an audio file
///
/// AIFF containers go through the bespoke chunk parser; everything else is
/// seek-sampled through the decoder chain. Every failure mode degrades to the
/// neutral placeholder, never an error.
pub fn sample_file(path: &Path, target: usize) -> Vec<u8> {
    if target == 0 {
        return Vec::new();
    }

    let result = if is_aiff_path(path) {
        sample_aiff_file(path, target)
    } else {
        decoder::seek_sample_peaks(path, target)
    };

    match result {
        Ok(values) => values,
        Err(err) => {
            log::warn!(
                "Waveform extraction failed for {}: {}; using neutral placeholder",
                path.display(),
                err
            );
            neutral(target)
        }
    }
}

fn sample_aiff_file(path: &Path, target: usize) -> Result<Vec<u8>, AnalysisError> {
    let data = std::fs::read(path)
        .map_err(|e| AnalysisError::DecodingError(format!("read {}: {}", path.display(), e)))?;
    aiff::sample_peaks(&data, target)
}

/// Case-insensitive `.aif` / `.aiff` extension check
pub fn is_aiff_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            e == "aif" || e == "aiff"
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::path::PathBuf;

    #[test]
    fn test_length_matches_target_and_bounds_hold() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 44100.0).sin() * 0.7)
            .collect();
        for target in [1usize, 10, 100, 480] {
            let values = sample_pcm(&samples, target);
            assert_eq!(values.len(), target);
            assert!(values.iter().all(|&v| v <= 100));
        }
    }

    #[test]
    fn test_zero_target() {
        assert!(sample_pcm(&[0.5; 100], 0).is_empty());
    }

    #[test]
    fn test_empty_input_is_neutral() {
        let values = sample_pcm(&[], 32);
        assert_eq!(values, vec![NEUTRAL_LEVEL; 32]);
    }

    #[test]
    fn test_silence_is_neutral() {
        let values = sample_pcm(&vec![0.0; 4096], 16);
        assert_eq!(values, vec![NEUTRAL_LEVEL; 16]);
    }

    #[test]
    fn test_loud_section_stands_out() {
        // Quiet first half, loud second half
        let mut samples = vec![0.05f32; 8192];
        for s in samples[4096..].iter_mut() {
            *s = 0.9;
        }
        let values = sample_pcm(&samples, 16);
        assert!(values[2] < values[13]);
    }

    #[test]
    fn test_compression_remaps_wide_range() {
        let mut values = vec![0u8, 10, 40, 85, 60, 5, 0, 0];
        postprocess(&mut values);
        let min = *values.iter().min().unwrap();
        let max = *values.iter().max().unwrap();
        assert!(min >= COMPRESS_FLOOR);
        assert!(max <= PEAK_LEVEL);
    }

    #[test]
    fn test_narrow_range_left_alone() {
        let mut values = vec![50u8; 8];
        postprocess(&mut values);
        assert_eq!(values, vec![50u8; 8]);
    }

    #[test]
    fn test_smoothing_formula() {
        let mut values = vec![0u8, 40, 0];
        smooth3(&mut values);
        // (0 + 80 + 0) / 4 = 20; endpoints untouched
        assert_eq!(values, vec![0, 20, 0]);
    }

    #[test]
    fn test_aiff_extension_detection() {
        assert!(is_aiff_path(&PathBuf::from("song.aiff")));
        assert!(is_aiff_path(&PathBuf::from("song.AIF")));
        assert!(!is_aiff_path(&PathBuf::from("song.mp3")));
        assert!(!is_aiff_path(&PathBuf::from("aiff")));
    }

    #[test]
    fn test_missing_file_degrades_to_neutral() {
        let values = sample_file(&PathBuf::from("/nonexistent/file.aiff"), 12);
        assert_eq!(values, neutral(12));
    }
}
