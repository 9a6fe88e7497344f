//! Short-time Fourier transform
//!
//! Slides an analysis window across a mono sample buffer at a fixed hop and
//! computes one magnitude-spectrum frame per position. Frames are computed in
//! parallel but the output matrix is strictly time-ordered.

use crate::dsp::{fft, window, window::WindowFunction};
use crate::error::AnalysisError;
use rayon::prelude::*;

/// Magnitude spectrogram with its analysis parameters
#[derive(Debug, Clone)]
pub struct Stft {
    /// Magnitude frames, `n_frames x (window_size / 2)`, time-ordered
    pub frames: Vec<Vec<f32>>,

    /// Analysis window size in samples
    pub window_size: usize,

    /// Hop size in samples
    pub hop_size: usize,

    /// Sample rate of the analyzed signal in Hz
    pub sample_rate: u32,
}

impl Stft {
    /// Number of time frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of frequency bins per frame (positive frequencies only)
    pub fn num_bins(&self) -> usize {
        self.window_size / 2
    }

    /// Center frequency of a bin in Hz
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.window_size as f32
    }

    /// Analysis frame rate in frames per second
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate as f32 / self.hop_size as f32
    }
}

/// Build a magnitude STFT from mono samples
///
/// Frame count is `max(0, (len - window_size) / hop_size + 1)`; an empty or
/// too-short input yields an empty matrix, not an error.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `window_size < 2`, `hop_size == 0`
/// or `sample_rate == 0`.
pub fn build(
    mono: &[f32],
    sample_rate: u32,
    window_size: usize,
    hop_size: usize,
    window_function: WindowFunction,
) -> Result<Stft, AnalysisError> {
    if window_size < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "Window size must be >= 2, got {}",
            window_size
        )));
    }
    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput("Hop size must be > 0".to_string()));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }

    let n_frames = if mono.len() >= window_size {
        (mono.len() - window_size) / hop_size + 1
    } else {
        0
    };

    log::debug!(
        "Building STFT: {} samples, window={}, hop={}, {} frames",
        mono.len(),
        window_size,
        hop_size,
        n_frames
    );

    let coefficients = window::coefficients(window_function, window_size);
    let bins = window_size / 2;

    let frames: Vec<Vec<f32>> = (0..n_frames)
        .into_par_iter()
        .map(|frame_index| {
            let start = frame_index * hop_size;
            let windowed: Vec<f32> = mono[start..start + window_size]
                .iter()
                .zip(&coefficients)
                .map(|(&s, &c)| s * c)
                .collect();
            let spectrum = fft::transform(&windowed);
            fft::magnitude_spectrum(&spectrum, bins)
        })
        .collect();

    Ok(Stft {
        frames,
        window_size,
        hop_size,
        sample_rate,
    })
}
