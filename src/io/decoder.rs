//! File decoding through an ordered backend chain
//!
//! Each backend inspects a file and either produces interleaved f32 samples
//! or declares the file unsupported, in which case the next backend gets a
//! turn. The AIFF chunk parser runs first for `.aif`/`.aiff` files; symphonia
//! handles everything else.

use crate::error::AnalysisError;
use crate::waveform;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::{FormatOptions, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

/// Decoded audio in interleaved channel order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved normalized samples in [-1, 1]
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Interleaved channel count
    pub channels: usize,
}

impl DecodedAudio {
    /// Collapse to a mono signal by frame averaging
    pub fn into_mono(self) -> Vec<f32> {
        if self.channels <= 1 {
            self.samples
        } else {
            super::pcm::interleaved_to_mono(&self.samples, self.channels)
        }
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        (self.samples.len() / self.channels) as f64 / self.sample_rate as f64
    }
}

/// Outcome of a single backend's attempt
pub enum DecodeOutcome {
    /// The backend decoded the file
    Decoded(DecodedAudio),

    /// The backend does not handle this kind of file; try the next one
    Unsupported,
}

/// A single decoding strategy in the chain
pub trait DecodeBackend: Send + Sync {
    /// Backend name for log lines
    fn name(&self) -> &'static str;

    /// Attempt to decode the file
    ///
    /// Returns `Unsupported` to pass the file along the chain, `Decoded` on
    /// success, or an error when the backend recognized the file but could
    /// not decode it.
    fn try_decode(&self, path: &Path) -> Result<DecodeOutcome, AnalysisError>;
}

/// Bespoke big-endian AIFF chunk parser, gated on file extension
pub struct AiffBackend;

impl DecodeBackend for AiffBackend {
    fn name(&self) -> &'static str {
        "aiff"
    }

    fn try_decode(&self, path: &Path) -> Result<DecodeOutcome, AnalysisError> {
        if !waveform::is_aiff_path(path) {
            return Ok(DecodeOutcome::Unsupported);
        }
        let data = std::fs::read(path).map_err(|e| {
            AnalysisError::DecodingError(format!("read {}: {}", path.display(), e))
        })?;
        let (samples, info) = waveform::aiff::decode_samples(&data)?;
        Ok(DecodeOutcome::Decoded(DecodedAudio {
            samples,
            sample_rate: info.sample_rate,
            channels: info.channels as usize,
        }))
    }
}

/// General-purpose symphonia backend (mp3, flac, ogg, aac, wav, m4a)
pub struct SymphoniaBackend;

impl DecodeBackend for SymphoniaBackend {
    fn name(&self) -> &'static str {
        "symphonia"
    }

    fn try_decode(&self, path: &Path) -> Result<DecodeOutcome, AnalysisError> {
        let mut reader = match open_format(path) {
            Ok(reader) => reader,
            Err(err) => {
                // Probe failure means symphonia does not recognize the
                // container; let the chain keep going
                log::debug!("symphonia probe failed for {}: {}", path.display(), err);
                return Ok(DecodeOutcome::Unsupported);
            }
        };

        let sample_rate = reader.sample_rate;
        let channels = reader.channels;
        let mut all_samples: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match reader.format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(AnalysisError::DecodingError(format!(
                        "packet read failed: {}",
                        e
                    )))
                }
            };

            if packet.track_id() != reader.track_id {
                continue;
            }

            let decoded = match reader.decoder.decode(&packet) {
                Ok(d) => d,
                Err(symphonia::core::errors::Error::DecodeError(e)) => {
                    // Corrupt packet; skip it and keep decoding
                    log::debug!("skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(AnalysisError::DecodingError(format!(
                        "decode failed: {}",
                        e
                    )))
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let buf = sample_buf
                .get_or_insert_with(|| SampleBuffer::<f32>::new(num_frames as u64, spec));
            if buf.capacity() < num_frames * spec.channels.count() {
                *buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            }
            buf.copy_interleaved_ref(decoded);
            all_samples.extend_from_slice(buf.samples());
        }

        log::debug!(
            "Decoded {}: {} samples, {} Hz, {} channels",
            path.display(),
            all_samples.len(),
            sample_rate,
            channels
        );

        Ok(DecodeOutcome::Decoded(DecodedAudio {
            samples: all_samples,
            sample_rate,
            channels,
        }))
    }
}

/// Ordered list of decode backends tried first to last
pub struct DecoderChain {
    backends: Vec<Box<dyn DecodeBackend>>,
}

impl DecoderChain {
    /// Empty chain; callers push backends in priority order
    pub fn new() -> DecoderChain {
        DecoderChain {
            backends: Vec::new(),
        }
    }

    /// The standard chain: AIFF parser first, symphonia as the catch-all
    pub fn with_default_backends() -> DecoderChain {
        let mut chain = DecoderChain::new();
        chain.push(Box::new(AiffBackend));
        chain.push(Box::new(SymphoniaBackend));
        chain
    }

    /// Append a backend at the lowest priority
    pub fn push(&mut self, backend: Box<dyn DecodeBackend>) {
        self.backends.push(backend);
    }

    /// Decode a file with the first backend that supports it
    ///
    /// # Errors
    ///
    /// `DecodingError` when a backend recognized the file but failed, or when
    /// no backend supports it at all.
    pub fn decode(&self, path: &Path) -> Result<DecodedAudio, AnalysisError> {
        for backend in &self.backends {
            match backend.try_decode(path)? {
                DecodeOutcome::Decoded(audio) => {
                    log::debug!("{} decoded by {} backend", path.display(), backend.name());
                    return Ok(audio);
                }
                DecodeOutcome::Unsupported => continue,
            }
        }
        Err(AnalysisError::DecodingError(format!(
            "no decode backend supports {}",
            path.display()
        )))
    }
}

impl Default for DecoderChain {
    fn default() -> DecoderChain {
        DecoderChain::with_default_backends()
    }
}

/// Decode a file with the default backend chain
pub fn decode_file(path: &Path) -> Result<DecodedAudio, AnalysisError> {
    DecoderChain::with_default_backends().decode(path)
}

/// Open symphonia format reader state shared by decode and seek paths
struct FormatSession {
    format: Box<dyn symphonia::core::formats::FormatReader>,
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    duration_seconds: Option<f64>,
}

fn open_format(path: &Path) -> Result<FormatSession, AnalysisError> {
    let file = std::fs::File::open(path).map_err(|e| {
        AnalysisError::DecodingError(format!("open {}: {}", path.display(), e))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AnalysisError::DecodingError(format!("probe failed: {}", e)))?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AnalysisError::DecodingError("no audio tracks found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AnalysisError::DecodingError("unknown sample rate".to_string()))?;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());

    let duration_seconds = match (track.codec_params.n_frames, track.codec_params.time_base) {
        (Some(n), Some(tb)) => {
            let t = tb.calc_time(n);
            Some(t.seconds as f64 + t.frac)
        }
        (Some(n), None) => Some(n as f64 / sample_rate as f64),
        _ => None,
    };

    let decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AnalysisError::DecodingError(format!("codec init failed: {}", e)))?;

    Ok(FormatSession {
        format,
        decoder,
        track_id,
        sample_rate,
        channels,
        duration_seconds,
    })
}

/// Sample `target` waveform peaks by coarse-seeking through the file
///
/// One packet is decoded at each of `target` evenly spaced time positions
/// and its loudest absolute amplitude recorded, so long files never need a
/// full decode. Files whose duration is unknown fall back to decoding
/// everything and bucketing the samples.
pub fn seek_sample_peaks(path: &Path, target: usize) -> Result<Vec<u8>, AnalysisError> {
    if target == 0 {
        return Ok(Vec::new());
    }

    let mut session = open_format(path)?;

    let Some(duration) = session.duration_seconds else {
        log::debug!(
            "{}: duration unknown, falling back to full decode for waveform",
            path.display()
        );
        let mono = decode_file(path)?.into_mono();
        return Ok(waveform::sample_pcm(&mono, target));
    };

    if duration <= 0.0 {
        return Err(AnalysisError::DecodingError(format!(
            "{}: zero-length stream",
            path.display()
        )));
    }

    let mut values = Vec::with_capacity(target);
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    for k in 0..target {
        let position = duration * k as f64 / target as f64;
        let peak = peak_at(&mut session, position, &mut sample_buf);
        values.push((peak * 100.0).round().clamp(0.0, 100.0) as u8);
    }

    waveform::postprocess(&mut values);
    Ok(values)
}

/// Seek to `position` seconds and take the peak of the next decoded packet
fn peak_at(
    session: &mut FormatSession,
    position: f64,
    sample_buf: &mut Option<SampleBuffer<f32>>,
) -> f32 {
    let seek = session.format.seek(
        SeekMode::Coarse,
        SeekTo::Time {
            time: Time::from(position),
            track_id: Some(session.track_id),
        },
    );
    if seek.is_err() {
        return 0.0;
    }
    // Decoder state is stale after a seek
    session.decoder.reset();

    loop {
        let packet = match session.format.next_packet() {
            Ok(packet) => packet,
            Err(_) => return 0.0,
        };
        if packet.track_id() != session.track_id {
            continue;
        }
        let decoded = match session.decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(_) => return 0.0,
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }
        let buf =
            sample_buf.get_or_insert_with(|| SampleBuffer::<f32>::new(num_frames as u64, spec));
        if buf.capacity() < num_frames * spec.channels.count() {
            *buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);
        return buf
            .samples()
            .iter()
            .map(|s| s.abs())
            .fold(0.0f32, f32::max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn write_temp_wav(name: &str, seconds: f32, freq: f32) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        let total = (44100.0 * seconds) as usize;
        for i in 0..total {
            let value = (2.0 * PI * freq * i as f32 / 44100.0).sin() * 0.8;
            writer.write_sample((value * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_chain_decodes_wav() {
        let path = write_temp_wav("chain_decodes.wav", 0.5, 440.0);
        let audio = decode_file(&path).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, 1);
        assert!((audio.samples.len() as i64 - 22050).abs() < 64);
        let peak = audio.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!((peak - 0.8).abs() < 0.05, "peak {}", peak);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(matches!(
            decode_file(Path::new("/nonexistent/audio.mp3")),
            Err(AnalysisError::DecodingError(_))
        ));
    }

    #[test]
    fn test_garbage_file_unsupported() {
        let path = std::env::temp_dir().join("garbage_bytes.bin");
        std::fs::write(&path, [0u8; 64]).unwrap();
        assert!(decode_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_seek_peaks_from_wav() {
        let path = write_temp_wav("seek_peaks.wav", 2.0, 220.0);
        let values = seek_sample_peaks(&path, 24).unwrap();
        assert_eq!(values.len(), 24);
        assert!(values.iter().all(|&v| v <= 100));
        // A constant-amplitude sine should not collapse to silence
        assert!(values.iter().any(|&v| v > 0));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_into_mono_averages_stereo() {
        let audio = DecodedAudio {
            samples: vec![1.0, 0.0, -0.5, 0.5],
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(audio.into_mono(), vec![0.5, 0.0]);
    }
}
