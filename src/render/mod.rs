//! Visual rendering of spectral data
//!
//! Color mapping, the spectrogram pixel-grid renderer and the placeholder
//! pattern used when a file has no decodable audio.

pub mod color;
pub mod fallback;
pub mod spectrogram;
