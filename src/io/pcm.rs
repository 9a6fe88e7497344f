//! Raw PCM byte-buffer conversions
//!
//! Helpers for turning little-endian PCM byte streams into normalized f32
//! samples, and for collapsing interleaved multi-channel audio to mono.

/// Decode signed 16-bit little-endian PCM to normalized f32
///
/// A trailing odd byte is ignored.
pub fn decode_i16_le(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// Decode unsigned 8-bit PCM (0..=255, midpoint 128) to normalized f32
pub fn decode_u8(data: &[u8]) -> Vec<f32> {
    data.iter().map(|&b| (b as f32 - 128.0) / 128.0).collect()
}

/// Decode 32-bit little-endian float PCM
pub fn decode_f32_le(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4)
        .map(|quad| f32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]))
        .collect()
}

/// Average interleaved channels down to a mono signal
///
/// A trailing partial frame is dropped. One channel returns the input
/// unchanged.
pub fn interleaved_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
