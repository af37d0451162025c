//! S_FRC score and interpretation bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A computed S_FRC coherence score, nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CoherenceScore(f64);

impl CoherenceScore {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// The interpretation band this score falls into.
    pub fn band(&self) -> InterpretationBand {
        InterpretationBand::from_score(self.0)
    }

    /// Score rounded to six decimal places, the precision reported on the
    /// wire.
    pub fn rounded(&self) -> f64 {
        (self.0 * 1_000_000.0).round() / 1_000_000.0
    }
}

impl fmt::Display for CoherenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Named interpretation band for an S_FRC score.
///
/// Boundaries are inclusive on the lower end and exclusive on the upper end;
/// the final band is unbounded above. Classification is total over all reals:
/// scores below zero read as `Low`, anything at or above 0.8 as `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpretationBand {
    /// [0, 0.3)
    Low,
    /// [0.3, 0.6)
    Moderate,
    /// [0.6, 0.8)
    Good,
    /// [0.8, ∞)
    High,
}

impl InterpretationBand {
    /// Lower bound of the Moderate band.
    pub const MODERATE_THRESHOLD: f64 = 0.3;
    /// Lower bound of the Good band.
    pub const GOOD_THRESHOLD: f64 = 0.6;
    /// Lower bound of the High band.
    pub const HIGH_THRESHOLD: f64 = 0.8;

    /// Classify a score. Total: every float maps to a band (non-ordered
    /// values fall through to `Low`).
    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            InterpretationBand::High
        } else if score >= Self::GOOD_THRESHOLD {
            InterpretationBand::Good
        } else if score >= Self::MODERATE_THRESHOLD {
            InterpretationBand::Moderate
        } else {
            InterpretationBand::Low
        }
    }

    /// Short band name as reported on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpretationBand::Low => "Low",
            InterpretationBand::Moderate => "Moderate",
            InterpretationBand::Good => "Good",
            InterpretationBand::High => "High",
        }
    }

    /// Human-readable interpretation of the band.
    pub fn description(&self) -> &'static str {
        match self {
            InterpretationBand::Low => {
                "Low coherence - system fragmented, significant dissonance between levels"
            }
            InterpretationBand::Moderate => {
                "Moderate coherence - partial integration, room for improvement in alignment"
            }
            InterpretationBand::Good => {
                "Good coherence - system operating with healthy integration across levels"
            }
            InterpretationBand::High => {
                "High coherence - excellent integration, optimal functioning"
            }
        }
    }
}

impl fmt::Display for InterpretationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(InterpretationBand::from_score(0.0), InterpretationBand::Low);
        assert_eq!(InterpretationBand::from_score(0.29), InterpretationBand::Low);
        assert_eq!(
            InterpretationBand::from_score(0.3),
            InterpretationBand::Moderate
        );
        assert_eq!(
            InterpretationBand::from_score(0.59),
            InterpretationBand::Moderate
        );
        assert_eq!(InterpretationBand::from_score(0.6), InterpretationBand::Good);
        assert_eq!(InterpretationBand::from_score(0.79), InterpretationBand::Good);
        assert_eq!(InterpretationBand::from_score(0.8), InterpretationBand::High);
        assert_eq!(InterpretationBand::from_score(1.0), InterpretationBand::High);
    }

    #[test]
    fn test_band_total_over_all_reals() {
        assert_eq!(
            InterpretationBand::from_score(-0.5),
            InterpretationBand::Low
        );
        assert_eq!(InterpretationBand::from_score(2.0), InterpretationBand::High);
        assert_eq!(
            InterpretationBand::from_score(f64::NAN),
            InterpretationBand::Low
        );
    }

    #[test]
    fn test_score_rounding() {
        let score = CoherenceScore::new(0.378_248_048_8);
        assert!((score.rounded() - 0.378_248).abs() < 1e-12);
        assert_eq!(score.band(), InterpretationBand::Moderate);
    }

    #[test]
    fn test_band_display() {
        assert_eq!(InterpretationBand::Moderate.to_string(), "Moderate");
        assert!(InterpretationBand::Low.description().starts_with("Low coherence"));
    }
}
