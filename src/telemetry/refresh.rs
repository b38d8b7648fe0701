use jiff::Timestamp;
use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token was fetched from the token endpoint.
    Fetched,
    /// Another caller's in-flight fetch produced the token.
    Coalesced,
}

/// Structured events for one refresh attempt. Token values are never recorded.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, at: Timestamp) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, outcome: RefreshOutcome, expires_at: Timestamp, token_len: usize) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            expires_at = %expires_at,
            token_len,
            outcome = ?outcome,
            "refresh.success"
        );
    }

    pub fn emit_failure(&self, error: &Error, at: Timestamp) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            kind = %error.kind(),
            error = %error,
            "refresh.failure"
        );
    }
}
