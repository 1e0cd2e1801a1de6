//! Sync tokens.
//!
//! A token is an opaque identifier that scopes one client's bookmark set.
//! Generated tokens carry 128 bits from the OS random number generator and
//! are checked against the store before being handed out.

use crate::{error::Result, Error, Token};
use rand::{rngs::OsRng, RngCore};

/// Number of random bytes in a generated token.
pub const TOKEN_BYTES: usize = 16;

/// Longest token accepted from clients.
pub const MAX_TOKEN_LEN: usize = 128;

/// Default number of candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Check that a client-supplied token is well formed.
///
/// Tokens are 1..=128 characters of `[A-Za-z0-9_-]`. This covers generated
/// hex tokens and client-side UUIDs, and keeps tokens safe to use as file
/// names.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(Error::validation("token is required"));
    }
    if token.len() > MAX_TOKEN_LEN {
        return Err(Error::validation(format!(
            "token longer than {} characters",
            MAX_TOKEN_LEN
        )));
    }
    if !token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(Error::validation("token contains invalid characters"));
    }
    Ok(())
}

/// Source of candidate tokens.
pub trait TokenSource: Send + Sync {
    fn next_token(&self) -> Token;
}

/// Hex-encoded random bytes from the OS CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl TokenSource for OsRandomSource {
    fn next_token(&self) -> Token {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Produces tokens that do not collide with existing ones.
pub struct TokenGenerator {
    source: Box<dyn TokenSource>,
    max_attempts: u32,
}

impl TokenGenerator {
    /// Generator backed by the OS random source.
    pub fn new() -> Self {
        Self::with_source(OsRandomSource)
    }

    /// Generator backed by a custom source.
    pub fn with_source(source: impl TokenSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the attempt limit (at least one attempt is always made).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Generate a token for which `exists` returns false.
    ///
    /// The check is best-effort: nothing reserves the token, so two callers
    /// could in theory receive the same fresh token.
    pub fn generate<F>(&self, mut exists: F) -> Result<Token>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.source.next_token();
            if !exists(&candidate)? {
                return Ok(candidate);
            }
            tracing::warn!(attempt, "generated token collided with an existing token");
        }

        Err(Error::Collision {
            attempts: self.max_attempts,
        })
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Fixed(&'static str);

    impl TokenSource for Fixed {
        fn next_token(&self) -> Token {
            self.0.to_string()
        }
    }

    struct Counting(AtomicU32);

    impl TokenSource for Counting {
        fn next_token(&self) -> Token {
            format!("tok{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[test]
    fn generated_token_shape() {
        let token = TokenGenerator::new().generate(|_| Ok(false)).unwrap();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
        assert!(validate_token(&token).is_ok());
    }

    #[test]
    fn generated_tokens_are_distinct() {
        let generator = TokenGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let token = generator.generate(|_| Ok(false)).unwrap();
            assert!(seen.insert(token));
        }
    }

    #[test]
    fn retries_past_collisions() {
        let generator = TokenGenerator::with_source(Counting(AtomicU32::new(0)));
        let taken = ["tok0", "tok1", "tok2"];
        let token = generator.generate(|t| Ok(taken.contains(&t))).unwrap();
        assert_eq!(token, "tok3");
    }

    #[test]
    fn forced_collision_exhausts_attempts() {
        let generator = TokenGenerator::with_source(Fixed("abc"));
        let mut calls = 0;
        let err = generator
            .generate(|_| {
                calls += 1;
                Ok(true)
            })
            .unwrap_err();

        assert!(matches!(err, Error::Collision { attempts: 5 }));
        assert_eq!(calls, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn lookup_errors_propagate() {
        let err = TokenGenerator::new()
            .generate(|_| Err(Error::storage("offline")))
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn token_validation() {
        assert!(validate_token("abc123").is_ok());
        assert!(validate_token("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_token("under_score").is_ok());
        assert!(validate_token("").is_err());
        assert!(validate_token("../etc/passwd").is_err());
        assert!(validate_token("has space").is_err());
        assert!(validate_token(&"a".repeat(MAX_TOKEN_LEN + 1)).is_err());
    }
}
