//! The S_FRC aggregation.

use frc_types::{CoherenceScore, InvalidLevelCount, MuLevels, LEVEL_COUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when constructing invalid scoring weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeightError {
    /// A weight or the penalty factor was negative, NaN, or infinite.
    #[error("scoring weights must be finite and non-negative")]
    NonFinite,

    /// All weights were zero, so no weighted mean exists.
    #[error("scoring weights must not sum to zero")]
    ZeroSum,
}

/// Per-level weights and dispersion penalty for the S_FRC aggregation.
///
/// The defaults weight μ-level i by i + 1 and penalize dispersion with
/// λ = 0.5. Custom weights are validated on construction: all eight weights
/// and the penalty factor must be finite and non-negative, and the weights
/// must not all be zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    weights: [f64; LEVEL_COUNT],
    dispersion_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weights: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            dispersion_penalty: 0.5,
        }
    }
}

impl ScoringWeights {
    /// Build custom weights.
    pub fn new(
        weights: [f64; LEVEL_COUNT],
        dispersion_penalty: f64,
    ) -> Result<Self, WeightError> {
        if !dispersion_penalty.is_finite() || dispersion_penalty < 0.0 {
            return Err(WeightError::NonFinite);
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(WeightError::NonFinite);
        }
        if weights.iter().sum::<f64>() == 0.0 {
            return Err(WeightError::ZeroSum);
        }
        Ok(Self {
            weights,
            dispersion_penalty,
        })
    }

    /// The per-level weights, μ0 first.
    pub fn weights(&self) -> &[f64; LEVEL_COUNT] {
        &self.weights
    }

    /// The dispersion penalty factor λ.
    pub fn dispersion_penalty(&self) -> f64 {
        self.dispersion_penalty
    }
}

/// Stateless S_FRC scorer.
///
/// Referentially transparent: identical input always produces an identical
/// score, and scoring has no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    /// Scorer with the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer with custom weights.
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Compute S_FRC for a validated μ-level vector.
    ///
    /// The score is the weighted mean of the levels minus λ times their
    /// population standard deviation, clamped to [0, 1]. For inputs in
    /// [0, 1]^8 the result stays in [0, 1] and is always finite.
    pub fn score(&self, levels: &MuLevels) -> CoherenceScore {
        let weight_sum: f64 = self.weights.weights.iter().sum();
        let weighted_mean = levels
            .iter()
            .zip(self.weights.weights.iter())
            .map(|(mu, w)| mu * w)
            .sum::<f64>()
            / weight_sum;

        let penalty = self.weights.dispersion_penalty * levels.std_dev();

        CoherenceScore::new((weighted_mean - penalty).clamp(0.0, 1.0))
    }
}

/// Compute S_FRC from a raw slice of coherence levels.
///
/// Validates that exactly eight values were supplied, then scores with the
/// default weights. This is the wire-facing contract: anything that is not
/// an 8-element vector is rejected with [`InvalidLevelCount`].
pub fn calculate_s_frc(raw: &[f64]) -> Result<CoherenceScore, InvalidLevelCount> {
    let levels = MuLevels::from_slice(raw)?;
    Ok(Scorer::new().score(&levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use frc_types::InterpretationBand;
    use proptest::prelude::*;

    const SAMPLE: [f64; LEVEL_COUNT] = [0.1, 0.3, 0.5, 0.8, 0.9, 0.7, 0.4, 0.2];

    #[test]
    fn test_sample_vector_scores_moderate() {
        let score = calculate_s_frc(&SAMPLE).unwrap();
        // weighted mean 18.5/36, sigma ~0.271282, penalty 0.5*sigma
        assert!((score.value() - 0.378_248).abs() < 1e-6);
        assert_eq!(score.band(), InterpretationBand::Moderate);
    }

    #[test]
    fn test_deterministic() {
        let first = calculate_s_frc(&SAMPLE).unwrap();
        for _ in 0..10 {
            assert_eq!(calculate_s_frc(&SAMPLE).unwrap(), first);
        }
    }

    #[test]
    fn test_rejects_short_and_long_input() {
        assert_eq!(
            calculate_s_frc(&[0.5; 7]).unwrap_err(),
            InvalidLevelCount { actual: 7 }
        );
        assert_eq!(
            calculate_s_frc(&[0.5; 9]).unwrap_err(),
            InvalidLevelCount { actual: 9 }
        );
        assert_eq!(
            calculate_s_frc(&[]).unwrap_err(),
            InvalidLevelCount { actual: 0 }
        );
    }

    #[test]
    fn test_order_sensitivity() {
        let mut swapped = SAMPLE;
        swapped.swap(0, 4);
        let original = calculate_s_frc(&SAMPLE).unwrap();
        let permuted = calculate_s_frc(&swapped).unwrap();
        // mu0 and mu4 carry different weights, so the score must move
        assert_ne!(original, permuted);
    }

    #[test]
    fn test_aligned_profiles_score_their_value() {
        for value in [0.0, 0.25, 0.5, 0.8, 1.0] {
            let score = calculate_s_frc(&[value; LEVEL_COUNT]).unwrap();
            assert!((score.value() - value).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dispersion_lowers_the_score() {
        let aligned = calculate_s_frc(&[0.5; LEVEL_COUNT]).unwrap();
        // Same weighted mean, maximal spread between adjacent pairs
        let fragmented =
            calculate_s_frc(&[0.9, 0.1, 0.9, 0.1, 0.9, 0.1, 0.9, 0.1]).unwrap();
        assert!(fragmented.value() < aligned.value());
    }

    #[test]
    fn test_weight_validation() {
        assert_eq!(
            ScoringWeights::new([0.0; LEVEL_COUNT], 0.5).unwrap_err(),
            WeightError::ZeroSum
        );
        assert_eq!(
            ScoringWeights::new([1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0], 0.5).unwrap_err(),
            WeightError::NonFinite
        );
        assert_eq!(
            ScoringWeights::new([1.0; LEVEL_COUNT], f64::NAN).unwrap_err(),
            WeightError::NonFinite
        );
    }

    #[test]
    fn test_uniform_weights_are_symmetric() {
        let scorer = Scorer::with_weights(
            ScoringWeights::new([1.0; LEVEL_COUNT], 0.5).unwrap(),
        );
        let mut swapped = SAMPLE;
        swapped.swap(1, 6);
        let a = scorer.score(&MuLevels::new(SAMPLE));
        let b = scorer.score(&MuLevels::new(swapped));
        assert!((a.value() - b.value()).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn property_normalized_input_yields_finite_unit_score(
            levels in proptest::array::uniform8(0.0_f64..=1.0)
        ) {
            let score = calculate_s_frc(&levels).unwrap();
            prop_assert!(score.value().is_finite());
            prop_assert!((0.0..=1.0).contains(&score.value()));
        }

        #[test]
        fn property_scoring_is_deterministic(
            levels in proptest::array::uniform8(0.0_f64..=1.0)
        ) {
            let first = calculate_s_frc(&levels).unwrap();
            let second = calculate_s_frc(&levels).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
