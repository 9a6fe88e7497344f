//! Feature extraction on top of the STFT
//!
//! Tempo (spectral flux + autocorrelation) and key (chroma + template
//! matching). Both consume the same magnitude STFT and are independent of
//! each other.

pub mod chroma;
pub mod key;
pub mod tempo;
