use std::fmt;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Serializable view of the cache slot for diagnostics. Never carries the token itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub fetched_at: Timestamp,
    pub expires_at: Timestamp,
    pub token_len: usize,
}

/// A bearer token plus the already margin-adjusted instant after which it is unusable.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    access_token: String,
    fetched_at: Timestamp,
    expires_at: Timestamp,
}

impl CachedToken {
    pub fn new(access_token: String, fetched_at: Timestamp, expires_at: Timestamp) -> Self {
        Self {
            access_token,
            fetched_at,
            expires_at,
        }
    }

    /// Returns the raw token value suitable for Authorization headers.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at.as_millisecond()
    }

    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }

    /// Time left before the adjusted expiry, `None` once it has passed.
    pub fn remaining(&self, now: Timestamp) -> Option<SignedDuration> {
        let left = self.expires_at.duration_since(now);
        left.is_positive().then_some(left)
    }

    pub fn to_snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            fetched_at: self.fetched_at,
            expires_at: self.expires_at,
            token_len: self.access_token.len(),
        }
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &format_args!("<{} bytes>", self.access_token.len()))
            .field("fetched_at", &self.fetched_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(valid_for: i64) -> (CachedToken, Timestamp) {
        let now = Timestamp::from_second(1_700_000_000).unwrap();
        let expires_at = now.checked_add(SignedDuration::from_secs(valid_for)).unwrap();
        (CachedToken::new("secret-token".into(), now, expires_at), now)
    }

    #[test]
    fn remaining_is_none_once_expired() {
        let (token, now) = token(30);
        assert_eq!(token.remaining(now), Some(SignedDuration::from_secs(30)));
        let later = now.checked_add(SignedDuration::from_secs(30)).unwrap();
        assert_eq!(token.remaining(later), None);
        assert!(!token.is_valid_at(later));
    }

    #[test]
    fn snapshot_and_debug_hide_token_value() {
        let (token, _) = token(60);
        let json = serde_json::to_string(&token.to_snapshot()).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"token_len\":12"));
        assert!(!format!("{token:?}").contains("secret-token"));
    }

    #[test]
    fn expiry_is_exposed_in_epoch_millis() {
        let (token, _) = token(60);
        assert_eq!(token.expires_at_ms(), 1_700_000_060_000);
    }
}
