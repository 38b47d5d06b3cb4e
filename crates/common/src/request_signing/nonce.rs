//! Single-use nonce and millisecond timestamp attached to every signed request.
//!
//! No replay cache is kept on this side; the server rejects a repeated
//! nonce/timestamp pair.

use std::fmt;

use chrono::Utc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    /// Generates a fresh random (UUID v4) nonce.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Nonce {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Nonce {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wall-clock milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_nonces_are_unique() {
        let nonces: HashSet<Nonce> = (0..1000).map(|_| Nonce::generate()).collect();
        assert_eq!(nonces.len(), 1000);
    }

    #[test]
    fn test_nonce_is_uuid_shaped() {
        let nonce = Nonce::generate();
        assert!(Uuid::parse_str(nonce.as_str()).is_ok());
    }

    #[test]
    fn test_timestamp_is_milliseconds() {
        let before = Utc::now().timestamp_millis();
        let ts = Timestamp::now();
        let after = Utc::now().timestamp_millis();

        assert!(ts.as_millis() >= before && ts.as_millis() <= after);
        // Milliseconds since epoch have 13 digits until the year 2286
        assert_eq!(ts.to_string().len(), 13);
    }

    #[test]
    fn test_timestamp_from_millis() {
        let ts = Timestamp::from_millis(1_700_000_000_000);
        assert_eq!(ts.to_string(), "1700000000000");
    }
}
