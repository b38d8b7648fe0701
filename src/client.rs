use std::sync::Arc;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error};

use crate::config::Config;
use crate::errors::Error;
use crate::token::response::{IssuedToken, parse_token_response};

const USER_AGENT: &str = concat!("goto-token-cache/", env!("CARGO_PKG_VERSION"));

/// Performs the client-credentials grant against `{auth_base_url}/oauth/token`.
#[derive(Clone)]
pub(crate) struct TokenClient {
    http: Client,
    config: Config,
}

impl TokenClient {
    pub(crate) fn new(config: Config) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// One grant request. Config problems surface before anything is sent.
    pub(crate) async fn request_token(&self) -> Result<IssuedToken, Error> {
        let (client_id, client_secret) = self.config.credentials()?;
        let url = self.config.token_url()?;
        let body = form_body(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("audience", self.config.audience.as_str()),
        ]);

        debug!("requesting client-credentials token: url='{}'", url);
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            error!("token request failed: status={} body='{}'", status, body);
            return Err(Error::Status(status, body));
        }
        parse_token_response(&body)
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.config.request_timeout(), Arc::new(err))
        } else {
            Error::from(err)
        }
    }
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
