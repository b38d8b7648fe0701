use std::time::Duration;

use jiff::{SignedDuration, Timestamp};

use crate::config::DEFAULT_SAFETY_MARGIN_SECS;
use crate::errors::Error;

use super::CachedToken;

/// Decides when a cached token stops being handed out.
#[derive(Clone, Debug)]
pub struct RefreshPolicy {
    /// Subtracted from the issuer's `expires_in` so tokens are replaced before they lapse.
    safety_margin: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SAFETY_MARGIN_SECS))
    }
}

impl RefreshPolicy {
    pub fn new(safety_margin: Duration) -> Self {
        Self { safety_margin }
    }

    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    /// `issued_at + (expires_in - margin)`. When `expires_in <= margin` the result is at
    /// or before `issued_at`, i.e. the token is expired as soon as it is stored.
    pub fn adjusted_expiry(&self, issued_at: Timestamp, expires_in: i64) -> Result<Timestamp, Error> {
        let margin = i64::try_from(self.safety_margin.as_secs()).unwrap_or(i64::MAX);
        let lifetime = SignedDuration::from_secs(expires_in.saturating_sub(margin));
        issued_at.checked_add(lifetime).map_err(|e| {
            Error::MalformedResponse(format!("expires_in {expires_in} out of range: {e}"))
        })
    }

    pub fn is_usable(&self, token: &CachedToken, now: Timestamp) -> bool {
        token.is_valid_at(now)
    }
}
