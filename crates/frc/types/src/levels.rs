//! The μ-level vector.
//!
//! A coherence measurement is an ordered sequence of exactly eight values
//! μ0..μ7, each conventionally in [0, 1], describing graduated levels of a
//! hierarchical state. The vector itself does not clamp: callers are expected
//! to supply normalized inputs, and the scorer stays total over finite values.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of μ-levels in a coherence measurement (μ0..μ7).
pub const LEVEL_COUNT: usize = 8;

/// Error returned when a coherence vector does not have exactly eight values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("coherence_levels must have {LEVEL_COUNT} values (mu0 to mu7), got {actual}")]
pub struct InvalidLevelCount {
    /// The length that was actually supplied.
    pub actual: usize,
}

/// Ordered vector of eight μ-level values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct MuLevels([f64; LEVEL_COUNT]);

impl MuLevels {
    /// Wrap a fixed-size array of μ-levels. Infallible: the type carries the
    /// length invariant.
    pub fn new(levels: [f64; LEVEL_COUNT]) -> Self {
        Self(levels)
    }

    /// Build from a slice, rejecting anything that is not exactly eight
    /// values.
    pub fn from_slice(raw: &[f64]) -> Result<Self, InvalidLevelCount> {
        let levels: [f64; LEVEL_COUNT] = raw
            .try_into()
            .map_err(|_| InvalidLevelCount { actual: raw.len() })?;
        Ok(Self(levels))
    }

    /// The μ-levels in order, μ0 first.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterate the levels in order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Arithmetic mean of the eight levels.
    pub fn mean(&self) -> f64 {
        self.0.iter().sum::<f64>() / LEVEL_COUNT as f64
    }

    /// Population standard deviation of the eight levels.
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        let variance = self
            .0
            .iter()
            .map(|mu| {
                let d = mu - mean;
                d * d
            })
            .sum::<f64>()
            / LEVEL_COUNT as f64;
        variance.sqrt()
    }
}

impl TryFrom<Vec<f64>> for MuLevels {
    type Error = InvalidLevelCount;

    fn try_from(raw: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&raw)
    }
}

impl From<MuLevels> for Vec<f64> {
    fn from(levels: MuLevels) -> Self {
        levels.0.to_vec()
    }
}

impl From<[f64; LEVEL_COUNT]> for MuLevels {
    fn from(levels: [f64; LEVEL_COUNT]) -> Self {
        Self(levels)
    }
}

impl fmt::Display for MuLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, mu) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{mu:.3}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_accepts_eight() {
        let levels = MuLevels::from_slice(&[0.1, 0.3, 0.5, 0.8, 0.9, 0.7, 0.4, 0.2]).unwrap();
        assert_eq!(levels.as_slice().len(), LEVEL_COUNT);
    }

    #[test]
    fn test_from_slice_rejects_seven_and_nine() {
        let err = MuLevels::from_slice(&[0.1; 7]).unwrap_err();
        assert_eq!(err, InvalidLevelCount { actual: 7 });

        let err = MuLevels::from_slice(&[0.1; 9]).unwrap_err();
        assert_eq!(err, InvalidLevelCount { actual: 9 });
    }

    #[test]
    fn test_mean_and_std_dev() {
        let flat = MuLevels::new([0.5; LEVEL_COUNT]);
        assert!((flat.mean() - 0.5).abs() < 1e-12);
        assert!(flat.std_dev().abs() < 1e-12);

        let spread = MuLevels::new([0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        assert!((spread.mean() - 0.5).abs() < 1e-12);
        assert!((spread.std_dev() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_serde_rejects_wrong_length() {
        let ok: Result<MuLevels, _> =
            serde_json::from_str("[0.1, 0.3, 0.5, 0.8, 0.9, 0.7, 0.4, 0.2]");
        assert!(ok.is_ok());

        let short: Result<MuLevels, _> = serde_json::from_str("[0.1, 0.2, 0.3]");
        assert!(short.is_err());
    }
}
