use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::client::TokenClient;
use crate::config::{Config, ConfigLocation, read_config};
use crate::errors::Error;
use crate::telemetry::refresh::{RefreshOutcome, RefreshTelemetry};

use super::{CachedToken, Clock, RefreshPolicy, SystemClock};

/// Outcome of the most recent fetch. `seq` counts finished attempts so a queued
/// caller can tell that one completed while it waited.
struct LastAttempt {
    seq: u64,
    outcome: Option<Result<CachedToken, Error>>,
}

/// Hands out a currently valid bearer token, fetching a new one only when the cached
/// one is missing or past its adjusted expiry.
///
/// At most one fetch runs at a time. Callers that queue behind an in-flight fetch get
/// its outcome, success or failure; callers arriving after it finished start their own.
/// A failed fetch leaves the previous slot contents untouched.
pub struct TokenCache {
    client: TokenClient,
    policy: RefreshPolicy,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<CachedToken>>,
    last_attempt: Mutex<LastAttempt>,
    finished_attempts: AtomicU64,
}

impl TokenCache {
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        let policy = RefreshPolicy::new(config.safety_margin());
        let client = TokenClient::new(config)?;
        Ok(Self {
            client,
            policy,
            clock,
            slot: RwLock::new(None),
            last_attempt: Mutex::new(LastAttempt {
                seq: 0,
                outcome: None,
            }),
            finished_attempts: AtomicU64::new(0),
        })
    }

    pub async fn from_location(loc: ConfigLocation) -> Result<Self, Error> {
        Self::new(read_config(loc).await?)
    }

    pub fn config(&self) -> &Config {
        self.client.config()
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Current slot contents, valid or not. Never touches the network.
    pub async fn cached(&self) -> Option<CachedToken> {
        self.slot.read().await.clone()
    }

    pub async fn get_access_token(&self) -> Result<String, Error> {
        self.ensure_fresh(false).await
    }

    /// Fetch a new token even if the cached one is still within its window,
    /// e.g. after the API rejected it with 401.
    pub async fn force_refresh(&self) -> Result<String, Error> {
        self.ensure_fresh(true).await
    }

    /// `Bearer <token>` for an outgoing `Authorization` header.
    pub async fn authorization_header(&self) -> Result<String, Error> {
        let token = self.get_access_token().await?;
        Ok(format!("Bearer {token}"))
    }

    async fn ensure_fresh(&self, force_refresh: bool) -> Result<String, Error> {
        let seen = self.finished_attempts.load(Ordering::Acquire);
        if !force_refresh && let Some(token) = self.usable_token().await {
            debug!(expires_at = %token.expires_at(), "token cache hit");
            return Ok(token.access_token().to_string());
        }

        // Only one fetch may be in flight; whoever queued behind it takes its outcome.
        let mut last = self.last_attempt.lock().await;
        if last.seq != seen
            && let Some(outcome) = last.outcome.clone()
        {
            let telemetry = RefreshTelemetry::new("token.refresh.coalesced");
            return match outcome {
                Ok(token) => {
                    telemetry.emit_success(
                        RefreshOutcome::Coalesced,
                        token.expires_at(),
                        token.access_token().len(),
                    );
                    Ok(token.access_token().to_string())
                }
                Err(err) => {
                    telemetry.emit_failure(&err, self.clock.now());
                    Err(err)
                }
            };
        }

        let context = if force_refresh {
            "token.refresh.forced"
        } else {
            "token.refresh"
        };
        let telemetry = RefreshTelemetry::new(context);
        telemetry.emit_start(self.clock.now());
        let outcome = self.fetch().await;
        match &outcome {
            Ok(token) => {
                telemetry.emit_success(
                    RefreshOutcome::Fetched,
                    token.expires_at(),
                    token.access_token().len(),
                );
                if !token.is_valid_at(token.fetched_at()) {
                    warn!(
                        "token lifetime does not exceed the {:?} safety margin; it will be refetched on next use",
                        self.policy.safety_margin()
                    );
                }
                *self.slot.write().await = Some(token.clone());
            }
            Err(err) => telemetry.emit_failure(err, self.clock.now()),
        }

        last.seq += 1;
        last.outcome = Some(outcome.clone());
        self.finished_attempts.store(last.seq, Ordering::Release);
        outcome.map(|token| token.access_token().to_string())
    }

    async fn fetch(&self) -> Result<CachedToken, Error> {
        let issued = self.client.request_token().await?;
        let fetched_at = self.clock.now();
        let expires_at = self.policy.adjusted_expiry(fetched_at, issued.expires_in)?;
        Ok(CachedToken::new(issued.access_token, fetched_at, expires_at))
    }

    async fn usable_token(&self) -> Option<CachedToken> {
        let now = self.clock.now();
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|token| self.policy.is_usable(token, now))
            .cloned()
    }
}
