//! AIFF/AIFC container parsing
//!
//! Manual big-endian chunk walk: verify the `FORM` header, locate `COMM`
//! (channel count, bits per sample, 80-bit extended sample rate) and `SSND`
//! (sound data offset and size), then read PCM frames straight out of the
//! sound-data region. Only uncompressed big-endian integer PCM is handled.

use crate::error::AnalysisError;

/// Parsed container layout
#[derive(Debug, Clone, PartialEq)]
pub struct AiffInfo {
    /// Interleaved channel count
    pub channels: u16,

    /// Bits per sample (8, 16, 24 or 32)
    pub bits_per_sample: u16,

    /// Sample rate decoded from the COMM extended field (44100 fallback)
    pub sample_rate: u32,

    /// Byte offset of the first sample frame
    pub sound_start: usize,

    /// Length of the sample data region in bytes
    pub sound_len: usize,
}

impl AiffInfo {
    /// Bytes per interleaved frame (all channels)
    pub fn frame_size(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }

    /// Number of complete sample frames in the sound region
    pub fn num_frames(&self) -> usize {
        let frame = self.frame_size();
        if frame == 0 {
            0
        } else {
            self.sound_len / frame
        }
    }
}

/// Parse the container structure without touching sample data
///
/// # Errors
///
/// `MalformedContainer` when the FORM header is missing, the form type is not
/// `AIFF`/`AIFC`, a required chunk (`COMM`, `SSND`) is absent, or the COMM
/// fields are unusable.
pub fn parse(data: &[u8]) -> Result<AiffInfo, AnalysisError> {
    if data.len() < 12 || &data[0..4] != b"FORM" {
        return Err(AnalysisError::MalformedContainer(
            "Missing FORM header".to_string(),
        ));
    }
    let form_type = &data[8..12];
    if form_type != b"AIFF" && form_type != b"AIFC" {
        return Err(AnalysisError::MalformedContainer(format!(
            "Unexpected form type {:?}",
            String::from_utf8_lossy(form_type)
        )));
    }

    let mut channels: Option<u16> = None;
    let mut bits_per_sample: Option<u16> = None;
    let mut sample_rate: Option<u32> = None;
    let mut sound: Option<(usize, usize)> = None;

    let mut cursor = 12usize;
    while cursor + 8 <= data.len() {
        let id = &data[cursor..cursor + 4];
        let size = read_u32_be(data, cursor + 4) as usize;
        let body = cursor + 8;
        if body + size > data.len() {
            // Truncated final chunk; stop scanning
            log::warn!("AIFF chunk {:?} truncated", String::from_utf8_lossy(id));
            break;
        }

        match id {
            b"COMM" if size >= 18 => {
                channels = Some(read_u16_be(data, body));
                bits_per_sample = Some(read_u16_be(data, body + 6));
                sample_rate = Some(read_extended_rate(&data[body + 8..body + 18]));
            }
            b"SSND" if size >= 8 => {
                let offset = read_u32_be(data, body) as usize;
                let start = body + 8 + offset;
                let len = size.saturating_sub(8 + offset);
                sound = Some((start, len));
            }
            _ => {}
        }

        // Chunks are padded to even byte boundaries
        cursor = body + size + (size & 1);
    }

    let channels = channels.ok_or_else(|| {
        AnalysisError::MalformedContainer("Missing COMM chunk".to_string())
    })?;
    let bits_per_sample = bits_per_sample.unwrap_or(16);
    let (sound_start, sound_len) = sound.ok_or_else(|| {
        AnalysisError::MalformedContainer("Missing SSND chunk".to_string())
    })?;

    if channels == 0 {
        return Err(AnalysisError::MalformedContainer(
            "COMM reports zero channels".to_string(),
        ));
    }
    if !matches!(bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(AnalysisError::MalformedContainer(format!(
            "Unsupported bits per sample: {}",
            bits_per_sample
        )));
    }

    Ok(AiffInfo {
        channels,
        bits_per_sample,
        sample_rate: sample_rate.unwrap_or(44100),
        sound_start: sound_start.min(data.len()),
        sound_len: sound_len.min(data.len().saturating_sub(sound_start.min(data.len()))),
    })
}

/// Sample `target` evenly spaced frame peaks into [0, 100] values
///
/// Reads one interleaved frame per position, keeps the loudest channel's
/// absolute amplitude, then applies the shared waveform post-processing.
pub fn sample_peaks(data: &[u8], target: usize) -> Result<Vec<u8>, AnalysisError> {
    let info = parse(data)?;
    let num_frames = info.num_frames();
    if target == 0 {
        return Ok(Vec::new());
    }
    if num_frames == 0 {
        return Err(AnalysisError::MalformedContainer(
            "SSND chunk holds no complete frames".to_string(),
        ));
    }

    let frame_size = info.frame_size();
    let mut values = Vec::with_capacity(target);
    for k in 0..target {
        let frame_index = k * num_frames / target;
        let start = info.sound_start + frame_index * frame_size;
        let peak = frame_peak(data, start, &info);
        values.push((peak * 100.0).round().clamp(0.0, 100.0) as u8);
    }

    super::postprocess(&mut values);
    Ok(values)
}

/// Decode the entire sound region to normalized interleaved f32
pub fn decode_samples(data: &[u8]) -> Result<(Vec<f32>, AiffInfo), AnalysisError> {
    let info = parse(data)?;
    let bytes_per_sample = info.bits_per_sample as usize / 8;
    let total_samples = info.sound_len / bytes_per_sample;

    let mut samples = Vec::with_capacity(total_samples);
    for i in 0..total_samples {
        let at = info.sound_start + i * bytes_per_sample;
        samples.push(read_sample(data, at, info.bits_per_sample));
    }
    Ok((samples, info))
}

/// Loudest absolute amplitude across one frame's channels
fn frame_peak(data: &[u8], frame_start: usize, info: &AiffInfo) -> f32 {
    let bytes_per_sample = info.bits_per_sample as usize / 8;
    let mut peak = 0.0f32;
    for ch in 0..info.channels as usize {
        let at = frame_start + ch * bytes_per_sample;
        peak = peak.max(read_sample(data, at, info.bits_per_sample).abs());
    }
    peak
}

/// Read one big-endian PCM sample normalized to [-1, 1]
fn read_sample(data: &[u8], at: usize, bits: u16) -> f32 {
    match bits {
        8 => {
            let Some(&b) = data.get(at) else { return 0.0 };
            b as i8 as f32 / 128.0
        }
        16 => {
            let (Some(&hi), Some(&lo)) = (data.get(at), data.get(at + 1)) else {
                return 0.0;
            };
            i16::from_be_bytes([hi, lo]) as f32 / 32768.0
        }
        24 => {
            let (Some(&b0), Some(&b1), Some(&b2)) =
                (data.get(at), data.get(at + 1), data.get(at + 2))
            else {
                return 0.0;
            };
            let raw = i32::from_be_bytes([b0, b1, b2, 0]) >> 8;
            raw as f32 / 8_388_608.0
        }
        32 => {
            let Some(bytes) = data.get(at..at + 4) else { return 0.0 };
            i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32 / 2_147_483_648.0
        }
        _ => 0.0,
    }
}

fn read_u16_be(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

fn read_u32_be(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Decode the COMM chunk's 80-bit extended-precision sample rate
///
/// Falls back to 44100 for zero, NaN-ish or absurd values.
fn read_extended_rate(bytes: &[u8]) -> u32 {
    if bytes.len() < 10 {
        return 44100;
    }
    let exponent = (((bytes[0] & 0x7F) as i32) << 8 | bytes[1] as i32) - 16383;
    let mantissa = u64::from_be_bytes([
        bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9],
    ]);
    if mantissa == 0 {
        return 44100;
    }
    let rate = mantissa as f64 * ((exponent - 63) as f64).exp2();
    if rate.is_finite() && (1.0..=1_000_000.0).contains(&rate) {
        rate.round() as u32
    } else {
        44100
    }
}
