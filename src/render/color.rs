//! Color schemes for spectrogram rendering
//!
//! Every scheme is a table of (intensity, color) stops with piecewise-linear
//! RGB interpolation between them. Intensity is the 0-255 value derived from
//! the dB mapping in [`spectrogram`](crate::render::spectrogram); all schemes
//! increase in brightness monotonically with intensity.

use serde::{Deserialize, Serialize};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Construct from channel values
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness proxy (integer Rec. 601 luma)
    pub fn luma(&self) -> u32 {
        (299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32) / 1000
    }
}

/// Spectrogram color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorScheme {
    /// Black through greens and yellows to white, 8 bands
    Professional,
    /// Deep blue through cyan to white
    Classic,
    /// Plain grayscale ramp
    Monochrome,
    /// HSV hue sweep from blue to red with rising value
    Rainbow,
    /// Black through reds and oranges to white
    HeatMap,
}

// Band stop tables. The Professional thresholds (30/60/90/.../255) are the
// scheme's documented banding structure; the others follow the same pattern
// with their own stops.

const PROFESSIONAL_STOPS: &[(u8, Rgb)] = &[
    (0, Rgb::new(0, 0, 0)),
    (30, Rgb::new(0, 64, 0)),
    (60, Rgb::new(0, 128, 0)),
    (90, Rgb::new(64, 192, 64)),
    (120, Rgb::new(160, 208, 64)),
    (150, Rgb::new(224, 224, 0)),
    (180, Rgb::new(240, 240, 96)),
    (210, Rgb::new(255, 255, 160)),
    (255, Rgb::new(255, 255, 255)),
];

const CLASSIC_STOPS: &[(u8, Rgb)] = &[
    (0, Rgb::new(0, 0, 32)),
    (60, Rgb::new(0, 64, 255)),
    (120, Rgb::new(0, 224, 255)),
    (180, Rgb::new(144, 255, 255)),
    (255, Rgb::new(255, 255, 255)),
];

const MONOCHROME_STOPS: &[(u8, Rgb)] = &[
    (0, Rgb::new(0, 0, 0)),
    (255, Rgb::new(255, 255, 255)),
];

const HEATMAP_STOPS: &[(u8, Rgb)] = &[
    (0, Rgb::new(0, 0, 0)),
    (50, Rgb::new(96, 0, 0)),
    (110, Rgb::new(224, 32, 0)),
    (170, Rgb::new(255, 128, 0)),
    (220, Rgb::new(255, 224, 64)),
    (255, Rgb::new(255, 255, 255)),
];

/// Map a 0-255 intensity to a color under the given scheme
pub fn map_intensity(scheme: ColorScheme, intensity: u8) -> Rgb {
    match scheme {
        ColorScheme::Professional => interpolate_stops(PROFESSIONAL_STOPS, intensity),
        ColorScheme::Classic => interpolate_stops(CLASSIC_STOPS, intensity),
        ColorScheme::Monochrome => interpolate_stops(MONOCHROME_STOPS, intensity),
        ColorScheme::HeatMap => interpolate_stops(HEATMAP_STOPS, intensity),
        ColorScheme::Rainbow => {
            let t = intensity as f32 / 255.0;
            // Hue sweeps blue (240 deg) down to red (0 deg); value rises so
            // brightness stays monotonic
            hsv_to_rgb(240.0 * (1.0 - t), 1.0, 0.15 + 0.85 * t)
        }
    }
}

/// Piecewise-linear interpolation across a stop table
fn interpolate_stops(stops: &[(u8, Rgb)], intensity: u8) -> Rgb {
    debug_assert!(stops.len() >= 2);
    let mut low = stops[0];
    for &stop in stops {
        if intensity >= stop.0 {
            low = stop;
        } else {
            let span = (stop.0 - low.0) as f32;
            let t = if span > 0.0 {
                (intensity - low.0) as f32 / span
            } else {
                0.0
            };
            return lerp_rgb(low.1, stop.1, t);
        }
    }
    low.1
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let mix = |x: u8, y: u8| -> u8 {
        (x as f32 + (y as f32 - x as f32) * t).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

/// Convert HSV (h in degrees, s and v in [0, 1]) to RGB
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Rgb::new(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// All supported schemes, mainly for tests and UI pickers
pub const ALL_SCHEMES: [ColorScheme; 5] = [
    ColorScheme::Professional,
    ColorScheme::Classic,
    ColorScheme::Monochrome,
    ColorScheme::Rainbow,
    ColorScheme::HeatMap,
];
