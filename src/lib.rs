//! # Sift DSP
//!
//! The audio analysis engine behind a music library sorter: BPM estimation,
//! musical key detection, spectrogram rendering, and waveform sampling.
//!
//! ## Features
//!
//! - **BPM Estimation**: Spectral-flux onset curve with FFT-accelerated
//!   autocorrelation and octave folding into a configurable range
//! - **Key Detection**: Chroma accumulation with Krumhansl-Schmuckler
//!   template matching, reported with Camelot wheel codes
//! - **Spectrogram Rendering**: STFT power rendering through configurable
//!   color schemes and resolution presets
//! - **Waveform Sampling**: Fixed-length peak-amplitude arrays for scrub
//!   bars, with a bespoke AIFF fast path
//!
//! ## Quick Start
//!
//! ```no_run
//! use sift_dsp::{analyze_samples, AnalysisConfig};
//!
//! // Mono samples, normalized to [-1.0, 1.0]
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 44100;
//!
//! let result = analyze_samples(&samples, sample_rate, &AnalysisConfig::default())?;
//!
//! if let Some(bpm) = result.bpm {
//!     println!("BPM: {:.1} (confidence: {:.2})", bpm, result.bpm_confidence);
//! }
//! if let Some(key) = &result.key {
//!     println!("Key: {} ({})", key.label(), key.camelot());
//! }
//! # Ok::<(), sift_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! Audio Input → STFT → Spectral Flux → Autocorrelation → BPM
//!                  └──→ Chroma → Template Matching → Key
//! ```
//!
//! Silent or empty input is a well-defined outcome (absent fields with zero
//! confidence), not an error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod dsp;
pub mod error;
pub mod features;
pub mod io;
pub mod render;
pub mod waveform;

// Re-export main types
pub use analysis::result::{AnalysisMetadata, Key, TrackAnalysis};
pub use analysis::service::{AnalysisService, CancellationToken};
pub use config::{AnalysisConfig, SpectrogramConfig};
pub use error::AnalysisError;

use std::time::Instant;

/// Main analysis function
///
/// Runs the full BPM and key pipeline over mono audio samples.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (typically 44100 or 48000)
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `TrackAnalysis` with BPM, key, and confidence metrics. Empty or silent
/// input yields `TrackAnalysis::empty` rather than an error.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero sample rate or an
/// unusable STFT configuration.
///
/// # Example
///
/// ```no_run
/// use sift_dsp::{analyze_samples, AnalysisConfig};
///
/// let samples = vec![0.0f32; 44100 * 30]; // 30 seconds of silence
/// let result = analyze_samples(&samples, 44100, &AnalysisConfig::default())?;
/// assert!(result.bpm.is_none());
/// # Ok::<(), sift_dsp::AnalysisError>(())
/// ```
pub fn analyze_samples(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<TrackAnalysis, AnalysisError> {
    let token = CancellationToken::new();
    analyze_samples_cancellable(samples, sample_rate, config, &token)
}

/// [`analyze_samples`] with cooperative cancellation
///
/// The token is checked between pipeline stages; a cancelled token makes the
/// next checkpoint return `AnalysisError::Cancelled`.
pub fn analyze_samples_cancellable(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
    token: &CancellationToken,
) -> Result<TrackAnalysis, AnalysisError> {
    let start_time = Instant::now();

    log::debug!(
        "Starting analysis: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }

    if samples.is_empty() {
        return Ok(TrackAnalysis::empty(sample_rate));
    }

    token.check()?;
    let stft = dsp::stft::build(
        samples,
        sample_rate,
        config.window_size,
        config.hop_size,
        config.window_function,
    )?;

    token.check()?;
    let tempo = features::tempo::estimate(&stft, config.min_bpm, config.max_bpm);

    token.check()?;
    let chroma = features::chroma::chroma_from_stft(
        &stft,
        config.chroma_min_hz,
        config.chroma_max_hz,
        config.reference_frequency,
    );
    let key = features::key::estimate(&chroma);

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Analysis done in {:.1} ms: bpm={:?} key={:?}",
        processing_time_ms,
        tempo.bpm,
        key.key
    );

    Ok(TrackAnalysis {
        bpm: tempo.bpm,
        bpm_confidence: tempo.confidence,
        key: key.key,
        key_confidence: key.confidence,
        metadata: AnalysisMetadata {
            duration_seconds: samples.len() as f32 / sample_rate as f32,
            sample_rate,
            processing_time_ms,
        },
    })
}

/// Analyze an audio file end to end
///
/// Decodes through the default backend chain, downmixes to mono, then runs
/// [`analyze_samples`].
///
/// # Errors
///
/// `DecodingError`/`MalformedContainer` for unreadable files, plus anything
/// [`analyze_samples`] returns.
pub fn analyze_file(
    path: &std::path::Path,
    config: &AnalysisConfig,
) -> Result<TrackAnalysis, AnalysisError> {
    let audio = io::decoder::decode_file(path)?;
    let sample_rate = audio.sample_rate;
    let mono = audio.into_mono();
    analyze_samples(&mono, sample_rate, config)
}
