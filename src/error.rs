//! Error types for the audio analysis engine

use std::fmt;

/// Errors that can occur during audio analysis
///
/// The DSP components themselves are pure and cannot fail; errors arise at the
/// decode boundary, from invalid caller parameters, or when an in-flight
/// analysis is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Invalid input parameters
    InvalidInput(String),

    /// Audio decoding error (unsupported container, missing audio track)
    DecodingError(String),

    /// Malformed container structure (e.g., AIFF missing its SSND chunk)
    MalformedContainer(String),

    /// Analysis was cancelled before completion
    Cancelled,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::MalformedContainer(msg) => write!(f, "Malformed container: {}", msg),
            AnalysisError::Cancelled => write!(f, "Analysis cancelled"),
        }
    }
}

impl std::error::Error for AnalysisError {}
