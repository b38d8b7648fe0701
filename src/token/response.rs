use serde::Deserialize;

use crate::errors::Error;

/// Success body of the client-credentials grant. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// A validated grant result: token plus its lifetime in seconds as reported by the issuer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// Parse a 2xx body. A missing, null, empty or zero field is malformed; the body itself
/// is never echoed back in the error.
pub(crate) fn parse_token_response(body: &str) -> Result<IssuedToken, Error> {
    let resp: TokenResponse = serde_json::from_str(body).map_err(|e| {
        Error::MalformedResponse(format!(
            "body is not a token object ({:?} error at line {} column {})",
            e.classify(),
            e.line(),
            e.column()
        ))
    })?;
    let access_token = match resp.access_token {
        Some(token) if !token.is_empty() => token,
        _ => return Err(Error::MalformedResponse("missing access_token".to_string())),
    };
    let expires_in = match resp.expires_in {
        Some(secs) if secs != 0 => secs,
        _ => return Err(Error::MalformedResponse("missing expires_in".to_string())),
    };
    Ok(IssuedToken {
        access_token,
        expires_in,
    })
}
