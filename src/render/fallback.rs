//! Placeholder spectrogram pattern
//!
//! When no decodable audio exists the UI still needs a tile, so this module
//! draws a deterministic pseudo-visual derived from a hash of the file name
//! and byte size: a handful of sine streaks with hash-picked frequency,
//! amplitude and hue. It is explicitly not a spectral analysis.

use crate::config::SpectrogramConfig;
use crate::render::color::{self, Rgb};
use crate::render::spectrogram::PixelGrid;

/// Generate the placeholder pattern for a file that could not be decoded
pub fn placeholder(file_name: &str, byte_size: u64, config: &SpectrogramConfig) -> PixelGrid {
    let seed = fnv1a64(file_name.as_bytes()) ^ byte_size.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = SplitMix64(seed);

    let background = color::map_intensity(config.color_scheme, 0);
    let mut grid = PixelGrid::filled(config.resolution, background);
    let width = grid.width;
    let height = grid.height;

    log::debug!(
        "Drawing fallback pattern for {:?} ({} bytes), seed {:#018x}",
        file_name,
        byte_size,
        seed
    );

    let streaks = 3 + (rng.next() % 5) as usize;
    for _ in 0..streaks {
        let frequency = 0.005 + (rng.next() % 1000) as f32 / 1000.0 * 0.05;
        let amplitude = height as f32 * (0.05 + (rng.next() % 1000) as f32 / 1000.0 * 0.3);
        let phase = (rng.next() % 1000) as f32 / 1000.0 * std::f32::consts::TAU;
        let center = (rng.next() % height.max(1) as u64) as f32;
        let hue = (rng.next() % 360) as f32;
        let streak_color = color::hsv_to_rgb(hue, 0.6, 0.8);
        let halo = color::hsv_to_rgb(hue, 0.6, 0.35);

        for x in 0..width {
            let y_center = center + amplitude * (frequency * x as f32 + phase).sin();
            let y = y_center.round() as isize;
            draw_dot(&mut grid, x, y, streak_color, halo);
        }
    }

    grid
}

fn draw_dot(grid: &mut PixelGrid, x: usize, y: isize, core: Rgb, halo: Rgb) {
    let height = grid.height as isize;
    for (dy, value) in [(-1isize, halo), (0, core), (1, halo)] {
        let row = y + dy;
        if (0..height).contains(&row) {
            let current = grid.pixel(x, row as usize);
            // Keep the brighter of overlapping streaks
            if value.luma() >= current.luma() {
                grid.pixels[row as usize * grid.width + x] = value;
            }
        }
    }
}

/// FNV-1a over a byte slice; stable across platforms and releases
fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325u64;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    hash
}

/// Tiny deterministic generator for spreading hash bits across parameters
struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpectrogramConfig;
    use crate::render::spectrogram::ResolutionPreset;

    fn config() -> SpectrogramConfig {
        SpectrogramConfig {
            resolution: ResolutionPreset::Thumbnail,
            ..SpectrogramConfig::default()
        }
    }

    #[test]
    fn test_pattern_is_deterministic() {
        let a = placeholder("track.mp3", 123_456, &config());
        let b = placeholder("track.mp3", 123_456, &config());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_files_give_different_patterns() {
        let a = placeholder("track.mp3", 123_456, &config());
        let b = placeholder("other.mp3", 123_456, &config());
        let c = placeholder("track.mp3", 123_457, &config());
        assert_ne!(a.pixels, b.pixels);
        assert_ne!(a.pixels, c.pixels);
    }

    #[test]
    fn test_pattern_has_preset_dimensions_and_content() {
        let grid = placeholder("track.mp3", 1, &config());
        assert_eq!(grid.width, 150);
        assert_eq!(grid.height, 200);
        let background = color::map_intensity(config().color_scheme, 0);
        assert!(grid.pixels.iter().any(|&p| p != background));
    }

    #[test]
    fn test_fnv1a_reference_vectors() {
        // Standard FNV-1a test vectors
        assert_eq!(fnv1a64(b""), 0xCBF2_9CE4_8422_2325);
        assert_eq!(fnv1a64(b"a"), 0xAF63_DC4C_8601_EC8C);
    }
}
