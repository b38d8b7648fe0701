//! OAuth client-credentials token cache for the GoTo call-monitoring backend.
//!
//! [`TokenCache::get_access_token`] returns a bearer token for the GoTo APIs, reusing
//! the cached one until 60 seconds before it expires and fetching a new one from
//! `{auth_base_url}/oauth/token` otherwise.

mod client;
pub mod config;
pub mod errors;
pub mod telemetry;
pub mod token;

pub use config::{Config, ConfigLocation, read_config};
pub use errors::{Error, ErrorKind};
pub use token::{CachedToken, Clock, RefreshPolicy, SystemClock, TokenCache, TokenSnapshot};
