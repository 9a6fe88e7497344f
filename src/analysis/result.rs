//! Analysis result types

use serde::{Deserialize, Serialize};

/// Note names in pitch-class order
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Key {
    /// Short musical notation (e.g., "C", "F#", "Am", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use sift_dsp::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(6).name(), "F#");
    /// assert_eq!(Key::Minor(9).name(), "Am");
    /// ```
    pub fn name(&self) -> String {
        match self {
            Key::Major(i) => NOTE_NAMES[*i as usize % 12].to_string(),
            Key::Minor(i) => format!("{}m", NOTE_NAMES[*i as usize % 12]),
        }
    }

    /// Long display label (e.g., "C major", "A minor")
    ///
    /// # Example
    ///
    /// ```
    /// use sift_dsp::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).label(), "C major");
    /// assert_eq!(Key::Minor(9).label(), "A minor");
    /// ```
    pub fn label(&self) -> String {
        match self {
            Key::Major(i) => format!("{} major", NOTE_NAMES[*i as usize % 12]),
            Key::Minor(i) => format!("{} minor", NOTE_NAMES[*i as usize % 12]),
        }
    }

    /// Camelot wheel notation used by DJ software (e.g., "8B" for C major,
    /// "8A" for A minor)
    ///
    /// # Example
    ///
    /// ```
    /// use sift_dsp::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).camelot(), "8B");
    /// assert_eq!(Key::Minor(9).camelot(), "8A");
    /// assert_eq!(Key::Major(7).camelot(), "9B");
    /// ```
    pub fn camelot(&self) -> String {
        // Wheel positions indexed by pitch class
        const MAJOR_WHEEL: [u32; 12] = [8, 3, 10, 5, 12, 7, 2, 9, 4, 11, 6, 1];
        const MINOR_WHEEL: [u32; 12] = [5, 12, 7, 2, 9, 4, 11, 6, 1, 8, 3, 10];
        match self {
            Key::Major(i) => format!("{}B", MAJOR_WHEEL[*i as usize % 12]),
            Key::Minor(i) => format!("{}A", MINOR_WHEEL[*i as usize % 12]),
        }
    }

    /// Pitch class of the key's root (0 = C .. 11 = B)
    pub fn root(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % 12,
        }
    }
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Audio duration in seconds
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,
}

/// Complete analysis result for one track
///
/// Absent fields mean the input was silent, empty, or carried no measurable
/// periodicity/tonality; that is a well-defined outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAnalysis {
    /// BPM estimate, folded into the configured range
    pub bpm: Option<f32>,

    /// BPM confidence (0.0-1.0)
    pub bpm_confidence: f32,

    /// Detected key
    pub key: Option<Key>,

    /// Key confidence (0.0-1.0)
    pub key_confidence: f32,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl TrackAnalysis {
    /// The "no result" value returned for empty or silent input
    pub fn empty(sample_rate: u32) -> Self {
        Self {
            bpm: None,
            bpm_confidence: 0.0,
            key: None,
            key_confidence: 0.0,
            metadata: AnalysisMetadata {
                duration_seconds: 0.0,
                sample_rate,
                processing_time_ms: 0.0,
            },
        }
    }
}
