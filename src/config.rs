//! read token-endpoint credentials from the environment, a file, or a secret

use std::fmt;
use std::time::Duration;

use aws_config::BehaviorVersion;

use crate::errors::Error;

pub const DEFAULT_AUTH_BASE_URL: &str = "https://authentication.logmeininc.com";
pub const DEFAULT_AUDIENCE: &str = "https://api.getgo.com";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;

pub const ENV_CLIENT_ID: &str = "GOTO_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GOTO_CLIENT_SECRET";
pub const ENV_AUTH_BASE_URL: &str = "GOTO_AUTH_BASE_URL";
pub const ENV_API_AUDIENCE: &str = "GOTO_API_AUDIENCE";
pub const ENV_CONFIG_SECRET_ARN: &str = "GOTO_CONFIG_SECRET_ARN";

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Fixed at 60 s unless set in code with [`Config::with_safety_margin`].
    #[serde(skip_deserializing, default = "default_safety_margin_secs")]
    pub safety_margin_secs: u64,
}

fn default_auth_base_url() -> String {
    DEFAULT_AUTH_BASE_URL.to_string()
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_safety_margin_secs() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_base_url", &self.auth_base_url)
            .field("audience", &self.audience)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("safety_margin_secs", &self.safety_margin_secs)
            .finish()
    }
}

impl Config {
    /// Build a config from explicit values; `None` selects the provider defaults.
    pub fn from_values(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_base_url: Option<String>,
        audience: Option<String>,
    ) -> Self {
        Config {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_base_url: auth_base_url.unwrap_or_else(default_auth_base_url),
            audience: audience.unwrap_or_else(default_audience),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            safety_margin_secs: DEFAULT_SAFETY_MARGIN_SECS,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin_secs = margin.as_secs();
        self
    }

    /// Read `GOTO_*` variables. Empty values count as unset.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &str) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| Error::Config(format!("Missing {name} env var")))
        };
        let config = Config::from_values(
            required(ENV_CLIENT_ID)?,
            required(ENV_CLIENT_SECRET)?,
            var(ENV_AUTH_BASE_URL),
            var(ENV_API_AUDIENCE),
        );
        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }

    /// Client id and secret, or a config error when either is empty.
    pub fn credentials(&self) -> Result<(&str, &str), Error> {
        if self.client_id.is_empty() {
            return Err(Error::Config("client_id is required".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::Config("client_secret is required".to_string()));
        }
        Ok((&self.client_id, &self.client_secret))
    }

    /// `{auth_base_url}/oauth/token`, validated before any network call.
    pub fn token_url(&self) -> Result<reqwest::Url, Error> {
        let base = self.auth_base_url.trim_end_matches('/');
        let url = format!("{base}/oauth/token");
        reqwest::Url::parse(&url).map_err(|e| {
            Error::Config(format!(
                "Invalid auth base URL '{}': {}",
                self.auth_base_url, e
            ))
        })
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.credentials()?;
        self.token_url()?;
        if self.audience.is_empty() {
            return Err(Error::Config("audience must not be empty".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("request timeout must be > 0".to_string()));
        }
        Ok(())
    }
}

pub async fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    let config = match loc {
        ConfigLocation::File(path) => Config::from_file(&path)?,
        ConfigLocation::Env => Config::from_env()?,
        ConfigLocation::Secret => read_config_from_secret().await?,
    };
    Ok(config)
}

async fn read_config_from_secret() -> Result<Config, Error> {
    let secret_arn = std::env::var(ENV_CONFIG_SECRET_ARN)
        .map_err(|_| Error::Config(format!("Missing {ENV_CONFIG_SECRET_ARN} env var")))?;
    let client = aws_sdk_secretsmanager::Client::new(
        &aws_config::load_defaults(BehaviorVersion::latest()).await,
    );
    let resp = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
    let secret = match resp.secret_string() {
        Some(s) => Ok(s),
        None => Err(Error::Config(
            "Failed to get secret string, returned None".to_string(),
        )),
    }?;
    let config: Config = serde_json::from_str(secret)?;
    config.validate()?;
    Ok(config)
}
