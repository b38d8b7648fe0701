#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use goto_token_cache::{Clock, Config};
use jiff::{SignedDuration, Timestamp};
use wiremock::ResponseTemplate;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn config(server_uri: &str) -> Config {
    Config::from_values("client-id", "client-secret", Some(server_uri.to_string()), None)
}

pub fn token_body(token: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    }))
}

/// Test clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn at(start: Timestamp) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn epoch() -> Timestamp {
        Timestamp::from_second(1_700_000_000).expect("valid timestamp")
    }

    pub fn advance(&self, secs: i64) {
        let mut guard = self.now.lock().expect("clock poisoned");
        *guard = guard
            .checked_add(SignedDuration::from_secs(secs))
            .expect("duration advance overflowed");
    }

    pub fn set_offset(&self, secs_from_epoch: i64) {
        let mut guard = self.now.lock().expect("clock poisoned");
        *guard = Self::epoch()
            .checked_add(SignedDuration::from_secs(secs_from_epoch))
            .expect("offset overflowed");
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().expect("clock poisoned")
    }
}
