//! S_FRC coherence scoring.
//!
//! Maps an ordered vector of eight μ-levels to a single scalar score and
//! classifies it into an interpretation band. The whole crate is pure: no
//! I/O, no randomness, no retained state between calls, so concurrent use
//! needs no synchronization.
//!
//! The aggregation is a position-weighted mean with a dispersion penalty:
//!
//! ```text
//! S_FRC = clamp( Σᵢ wᵢ·μᵢ / Σᵢ wᵢ  −  λ·σ(μ),  0, 1 )
//! ```
//!
//! with default weights wᵢ = i + 1 (deeper μ-levels carry more weight),
//! population standard deviation σ, and λ = 0.5. Aligned level profiles
//! score their common value exactly; fragmented profiles are penalized.
//! Because the weights differ per position, the score is order-sensitive.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod scorer;

pub use frc_types::{CoherenceScore, InterpretationBand, InvalidLevelCount, MuLevels, LEVEL_COUNT};
pub use scorer::{calculate_s_frc, Scorer, ScoringWeights, WeightError};
