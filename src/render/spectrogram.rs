//! Spectrogram rendering
//!
//! Maps a magnitude STFT onto a fixed-resolution pixel grid: global max
//! normalization, dB intensity scaling over a configurable dynamic range, and
//! per-scheme color mapping. Time runs left to right, frequency bottom to top.

use crate::config::SpectrogramConfig;
use crate::dsp::stft::Stft;
use crate::render::color::{self, Rgb};
use serde::{Deserialize, Serialize};

/// Fixed output resolutions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionPreset {
    /// 150 x 200 list tile
    Thumbnail,
    /// 400 x 300
    Small,
    /// 800 x 400
    Medium,
    /// 1600 x 600
    Large,
    /// 2400 x 800 full-width banner
    Banner,
}

impl ResolutionPreset {
    /// Pixel dimensions as (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            ResolutionPreset::Thumbnail => (150, 200),
            ResolutionPreset::Small => (400, 300),
            ResolutionPreset::Medium => (800, 400),
            ResolutionPreset::Large => (1600, 600),
            ResolutionPreset::Banner => (2400, 800),
        }
    }
}

/// Which spectral quantity feeds the intensity mapping
///
/// Only `Power` and `Magnitude` are meaningfully distinct; `Phase` and
/// `Complex` fall back to magnitude rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpectrumKind {
    /// Squared magnitude
    Power,
    /// Raw magnitude
    Magnitude,
    /// Falls back to magnitude
    Phase,
    /// Falls back to magnitude
    Complex,
}

/// Rendered pixel grid, row-major from the top-left
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Row-major pixels, `width * height` entries
    pub pixels: Vec<Rgb>,
    /// Preset the grid was rendered at
    pub resolution: ResolutionPreset,
}

impl PixelGrid {
    /// Solid-color grid at the given preset
    pub fn filled(resolution: ResolutionPreset, fill: Rgb) -> Self {
        let (width, height) = resolution.dimensions();
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
            resolution,
        }
    }

    /// Pixel at (x, y); y = 0 is the top row
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, value: Rgb) {
        self.pixels[y * self.width + x] = value;
    }
}

/// Render a magnitude STFT into a color pixel grid
///
/// An empty STFT renders as the scheme's zero-intensity color (callers that
/// want a visible placeholder use [`fallback`](crate::render::fallback)
/// instead). Frequencies outside the configured band are cropped.
pub fn render(stft: &Stft, config: &SpectrogramConfig) -> PixelGrid {
    let (width, height) = config.resolution.dimensions();
    let background = color::map_intensity(config.color_scheme, 0);
    let mut grid = PixelGrid::filled(config.resolution, background);

    let n_frames = stft.num_frames();
    let n_bins = stft.num_bins();
    if n_frames == 0 || n_bins == 0 {
        return grid;
    }

    // Crop the bin range to the configured frequency band
    let bin_hz = stft.sample_rate as f32 / stft.window_size as f32;
    let min_bin = if config.min_frequency_hz > 0.0 {
        ((config.min_frequency_hz / bin_hz).floor() as usize).min(n_bins - 1)
    } else {
        0
    };
    let max_bin = if config.max_frequency_hz > 0.0 {
        ((config.max_frequency_hz / bin_hz).ceil() as usize).clamp(min_bin + 1, n_bins)
    } else {
        n_bins
    };
    let band_bins = max_bin - min_bin;

    let use_power = matches!(config.spectrum_kind, SpectrumKind::Power);
    let value_of = |magnitude: f32| -> f32 {
        if use_power {
            magnitude * magnitude
        } else {
            magnitude
        }
    };

    let max_value = stft
        .frames
        .iter()
        .flat_map(|frame| frame[min_bin..max_bin].iter())
        .map(|&m| value_of(m))
        .fold(0.0f32, f32::max);
    if max_value <= 0.0 {
        return grid;
    }

    let dynamic_range = config.dynamic_range_db.max(1.0);
    log::debug!(
        "Rendering spectrogram: {} frames x {} bins -> {}x{}, scheme {:?}",
        n_frames,
        band_bins,
        width,
        height,
        config.color_scheme
    );

    for x in 0..width {
        let frame_index = x * n_frames / width;
        let frame = &stft.frames[frame_index];
        for y in 0..height {
            // y = 0 is the top row = highest frequency
            let bin = min_bin + (height - 1 - y) * band_bins / height;
            let value = value_of(frame[bin]);
            let db = 10.0 * (value / max_value).log10();
            let intensity = ((db + dynamic_range) / dynamic_range).clamp(0.0, 1.0);
            let level = (intensity * 255.0).round() as u8;
            grid.set_pixel(x, y, color::map_intensity(config.color_scheme, level));
        }
    }

    grid
}
