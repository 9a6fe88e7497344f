//! Core signal-processing primitives
//!
//! Window functions, the FFT engine and the STFT builder. Everything here is
//! pure computation with no I/O and no failure modes beyond parameter checks.

pub mod fft;
pub mod stft;
pub mod window;
