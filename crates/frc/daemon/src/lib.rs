//! FRC daemon library
//!
//! This module provides the core components for the FRC daemon:
//! - REST API handlers
//! - Session-token bookkeeping with TTL
//! - Server lifecycle management
//! - Configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod tokens;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
pub use tokens::SessionTokenStore;
