//! Session-token bookkeeping.
//!
//! Tokens are opaque UUIDs with a per-token expiry. Unlike a plain
//! process-wide set, every token carries a TTL and can be revoked, and a
//! periodic sweep drops expired entries so the store stays bounded. This is
//! request bookkeeping, not an authentication scheme.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TokenEntry {
    username: String,
    expires_at: Instant,
}

/// Concurrent session-token store with TTL and explicit invalidation.
#[derive(Debug)]
pub struct SessionTokenStore {
    ttl: Duration,
    tokens: DashMap<String, TokenEntry>,
}

impl SessionTokenStore {
    /// Create a store whose tokens live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: DashMap::new(),
        }
    }

    /// Issue a new token for a username.
    pub fn issue(&self, username: &str) -> IssuedToken {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(
            token.clone(),
            TokenEntry {
                username: username.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        IssuedToken {
            token,
            username: username.to_string(),
            expires_at: Utc::now()
                + ChronoDuration::from_std(self.ttl).unwrap_or(ChronoDuration::zero()),
        }
    }

    /// Check whether a token is live. Expired tokens are dropped on sight.
    pub fn verify(&self, token: &str) -> bool {
        let expired = match self.tokens.get(token) {
            Some(entry) => entry.expires_at <= Instant::now(),
            None => return false,
        };
        if expired {
            self.tokens.remove(token);
            return false;
        }
        true
    }

    /// The username a live token was issued to.
    pub fn username(&self, token: &str) -> Option<String> {
        if !self.verify(token) {
            return None;
        }
        self.tokens.get(token).map(|entry| entry.username.clone())
    }

    /// Invalidate a token. Returns whether it was live.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    /// Drop all expired tokens and return how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.tokens.len();
        self.tokens.retain(|_, entry| entry.expires_at > now);
        before - self.tokens.len()
    }

    /// Number of tokens currently held (live or awaiting sweep).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
