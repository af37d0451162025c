//! Shared domain types for the FRC platform.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//! - the 8-element μ-level vector and its validation
//! - the S_FRC score and its interpretation bands
//! - strongly-typed identifiers for users, sessions, and coherence logs
//!
//! No I/O lives here; storage records and wire shapes build on these types.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod ids;
mod levels;
mod score;

pub use ids::{LogId, ProtocolSlug, SessionId, UserId};
pub use levels::{InvalidLevelCount, MuLevels, LEVEL_COUNT};
pub use score::{CoherenceScore, InterpretationBand};
