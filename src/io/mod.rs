//! Audio input: PCM conversion and file decoding

pub mod decoder;
pub mod pcm;

pub use decoder::{decode_file, DecodedAudio, DecoderChain};
