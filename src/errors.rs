use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

/// Every way acquiring a token can fail. Callers normally treat this as a single
/// "token acquisition failed" outcome; [`Error::kind`] is there for diagnostics.
///
/// Causes are held in `Arc` so one failed fetch can be handed to every caller waiting on it.
#[derive(Clone, Debug)]
pub enum Error {
    /// Reading a configuration file failed.
    Io(Arc<std::io::Error>),
    /// A configuration document (file or secret) was not valid JSON.
    Json(Arc<serde_json::Error>),
    /// Network or transport failure talking to the token endpoint.
    Http(Arc<reqwest::Error>),
    /// The token endpoint answered with a non-success status.
    Status(StatusCode, String),
    /// No response from the token endpoint within the request timeout.
    Timeout(Duration, Arc<reqwest::Error>),
    /// Required configuration missing or invalid.
    Config(String),
    /// The token endpoint answered 2xx but the body lacked the expected fields.
    MalformedResponse(String),
}

/// Coarse error taxonomy used for diagnostics and retry decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    MalformedResponse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::Json(_) | Error::Config(_) => ErrorKind::Configuration,
            Error::Http(_) | Error::Status(..) | Error::Timeout(..) => ErrorKind::Transport,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Only transport failures are worth retrying without operator intervention.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Status an HTTP layer should answer with when it cannot obtain a token.
    pub fn status_hint(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Transport | ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::MalformedResponse => write!(f, "malformed_response"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "failed to read configuration: {err}"),
            Error::Json(err) => write!(f, "invalid configuration document: {err}"),
            Error::Http(err) => write!(f, "token endpoint request failed: {err}"),
            Error::Status(status, body) => {
                write!(f, "token endpoint returned {status}: {body}")
            }
            Error::Timeout(limit, _) => {
                write!(f, "token endpoint did not respond within {limit:?}")
            }
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::MalformedResponse(msg) => write!(f, "unexpected token response: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err.as_ref()),
            Error::Json(err) => Some(err.as_ref()),
            Error::Http(err) | Error::Timeout(_, err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(Arc::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(Arc::new(err))
    }
}
