//! Musical key estimation
//!
//! Matches a chroma vector against Krumhansl-Schmuckler tonal profiles. Each
//! profile is rotated through the 12 possible roots and scored by cosine
//! similarity; the single best of the 24 candidates wins.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in
//! Perceived Tonal Organization in a Spatial Representation of Musical Keys.
//! *Psychological Review*, 89(4), 334-368.

use crate::analysis::result::Key;
use crate::features::chroma::PITCH_CLASSES;

/// Krumhansl-Schmuckler major profile, rooted at C
pub const MAJOR_PROFILE: [f32; PITCH_CLASSES] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Schmuckler minor profile, rooted at C
pub const MINOR_PROFILE: [f32; PITCH_CLASSES] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Key estimate with confidence
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// Best-matching key, `None` for a zero-energy chroma vector
    pub key: Option<Key>,

    /// Confidence in [0, 1]: cosine similarity rescaled from [-1, 1]
    pub confidence: f32,
}

/// Estimate the musical key of a chroma vector
///
/// Ties keep the first maximum encountered: for each rotation the major
/// profile is scored before the minor one and comparison is strict, so at an
/// exact tie major (and the lower root) wins. This ordering is observable,
/// deterministic behavior and is kept intentionally.
pub fn estimate(chroma: &[f32; PITCH_CLASSES]) -> KeyEstimate {
    if chroma.iter().all(|&v| v <= 0.0) {
        return KeyEstimate {
            key: None,
            confidence: 0.0,
        };
    }

    let mut best_key = Key::Major(0);
    let mut best_score = f32::NEG_INFINITY;

    for shift in 0..PITCH_CLASSES as u32 {
        let major = rotate(&MAJOR_PROFILE, shift as usize);
        let score = cosine_similarity(chroma, &major);
        if score > best_score {
            best_score = score;
            best_key = Key::Major(shift);
        }

        let minor = rotate(&MINOR_PROFILE, shift as usize);
        let score = cosine_similarity(chroma, &minor);
        if score > best_score {
            best_score = score;
            best_key = Key::Minor(shift);
        }
    }

    let confidence = ((best_score + 1.0) / 2.0).clamp(0.0, 1.0);
    log::debug!(
        "Key estimate: {} (score {:.3}, confidence {:.3})",
        best_key.label(),
        best_score,
        confidence
    );

    KeyEstimate {
        key: Some(best_key),
        confidence,
    }
}

/// Rotate a profile so its root moves to pitch class `shift`
///
/// `rotated[i] = profile[(i - shift + 12) mod 12]`
fn rotate(profile: &[f32; PITCH_CLASSES], shift: usize) -> [f32; PITCH_CLASSES] {
    let mut rotated = [0.0f32; PITCH_CLASSES];
    for (i, slot) in rotated.iter_mut().enumerate() {
        *slot = profile[(i + PITCH_CLASSES - shift) % PITCH_CLASSES];
    }
    rotated
}

/// Cosine similarity clamped to [-1, 1]; -1 when either vector has zero norm
fn cosine_similarity(a: &[f32; PITCH_CLASSES], b: &[f32; PITCH_CLASSES]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for i in 0..PITCH_CLASSES {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return -1.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_chroma_has_no_key() {
        let result = estimate(&[0.0; PITCH_CLASSES]);
        assert_eq!(result.key, None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_profile_matches_itself() {
        let mut chroma = [0.0f32; PITCH_CLASSES];
        chroma.copy_from_slice(&MAJOR_PROFILE);
        let result = estimate(&chroma);
        assert_eq!(result.key, Some(Key::Major(0)));
        assert!(result.confidence > 0.99);
    }

    #[test]
    fn test_rotated_profile_matches_rotated_key() {
        for shift in 0..PITCH_CLASSES {
            let chroma = rotate(&MINOR_PROFILE, shift);
            let result = estimate(&chroma);
            assert_eq!(result.key, Some(Key::Minor(shift as u32)));
        }
    }

    #[test]
    fn test_c_major_triad_chroma() {
        // Energy only at C, E, G
        let mut chroma = [0.0f32; PITCH_CLASSES];
        chroma[0] = 1.0;
        chroma[4] = 1.0;
        chroma[7] = 1.0;
        let result = estimate(&chroma);
        assert_eq!(result.key, Some(Key::Major(0)));
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn test_a_minor_triad_chroma() {
        // A, C, E
        let mut chroma = [0.0f32; PITCH_CLASSES];
        chroma[9] = 1.0;
        chroma[0] = 1.0;
        chroma[4] = 1.0;
        let result = estimate(&chroma);
        assert_eq!(result.key, Some(Key::Minor(9)));
    }

    #[test]
    fn test_confidence_bounds() {
        let mut chroma = [0.1f32; PITCH_CLASSES];
        chroma[3] = 0.9;
        let result = estimate(&chroma);
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn test_rotation_formula() {
        let rotated = rotate(&MAJOR_PROFILE, 2);
        // Root weight (index 0 of the profile) moves to pitch class 2 (D)
        assert_eq!(rotated[2], MAJOR_PROFILE[0]);
        assert_eq!(rotated[0], MAJOR_PROFILE[10]);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        let zero = [0.0f32; PITCH_CLASSES];
        let ones = [1.0f32; PITCH_CLASSES];
        assert_eq!(cosine_similarity(&zero, &ones), -1.0);
        assert!((cosine_similarity(&ones, &ones) - 1.0).abs() < 1e-6);
    }
}
