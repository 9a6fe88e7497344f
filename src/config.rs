//! Configuration parameters for analysis and rendering

use crate::dsp::window::WindowFunction;
use crate::render::color::ColorScheme;
use crate::render::spectrogram::{ResolutionPreset, SpectrumKind};
use serde::{Deserialize, Serialize};

/// Analysis configuration (BPM and key estimation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Window function applied per STFT frame (default: Hanning)
    pub window_function: WindowFunction,

    /// STFT window size in samples (default: 4096)
    pub window_size: usize,

    /// STFT hop size in samples (default: 1024)
    pub hop_size: usize,

    /// Minimum BPM of the accepted range (default: 60.0)
    pub min_bpm: f32,

    /// Maximum BPM of the accepted range (default: 145.0)
    pub max_bpm: f32,

    /// Lower edge of the chroma analysis band in Hz (default: 27.5, A0)
    pub chroma_min_hz: f32,

    /// Upper edge of the chroma analysis band in Hz (default: 5000.0)
    pub chroma_max_hz: f32,

    /// Tuning reference for pitch-class mapping (default: 440.0, A4)
    pub reference_frequency: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_function: WindowFunction::Hanning,
            window_size: 4096,
            hop_size: 1024,
            min_bpm: 60.0,
            max_bpm: 145.0,
            chroma_min_hz: 27.5,
            chroma_max_hz: 5000.0,
            reference_frequency: 440.0,
        }
    }
}

/// Spectrogram rendering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramConfig {
    /// Window function for the rendering STFT (default: Hanning)
    pub window_function: WindowFunction,

    /// STFT window size for rendering (default: 2048)
    pub window_size: usize,

    /// STFT hop size for rendering (default: 512)
    pub hop_size: usize,

    /// Color scheme (default: Professional)
    pub color_scheme: ColorScheme,

    /// Output resolution preset (default: Medium, 800x400)
    pub resolution: ResolutionPreset,

    /// Spectral quantity to render (default: Power)
    pub spectrum_kind: SpectrumKind,

    /// Dynamic range of the dB intensity mapping (default: 120.0)
    pub dynamic_range_db: f32,

    /// Lower frequency crop in Hz; 0 disables (default: 0.0)
    pub min_frequency_hz: f32,

    /// Upper frequency crop in Hz; 0 means Nyquist (default: 0.0)
    pub max_frequency_hz: f32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            window_function: WindowFunction::Hanning,
            window_size: 2048,
            hop_size: 512,
            color_scheme: ColorScheme::Professional,
            resolution: ResolutionPreset::Medium,
            spectrum_kind: SpectrumKind::Power,
            dynamic_range_db: 120.0,
            min_frequency_hz: 0.0,
            max_frequency_hz: 0.0,
        }
    }
}
