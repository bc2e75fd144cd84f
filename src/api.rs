//! Collaborator wire protocol
//!
//! Endpoints, payloads and status interpretation for the authentication and
//! game-state services. Transport lives in `platform::http`; everything here
//! is plain data so it can be tested natively.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::Snapshot;

/// Failures talking to a collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("response did not include a token")]
    MissingToken,
    #[error("not signed in")]
    NotSignedIn,
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// HTTP method used by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Every remote call the game makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    FetchState,
    SaveState,
    ResetState,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "/api/users/login",
            Endpoint::Register => "/api/users/register",
            Endpoint::FetchState => "/api/game/state",
            Endpoint::SaveState => "/api/game/save",
            Endpoint::ResetState => "/api/game/reset",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::FetchState => Method::Get,
            _ => Method::Post,
        }
    }

    /// Whether the request carries `Authorization: Bearer <token>`
    pub fn needs_token(&self) -> bool {
        !matches!(self, Endpoint::Login | Endpoint::Register)
    }

    /// Full URL under `base_url` (trailing slashes tolerated)
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

/// Authorization header value
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Authorization header for a call to `endpoint`, if it takes one. The auth
/// endpoints never carry a token; the game-state endpoints require one.
pub fn authorization(endpoint: Endpoint, token: Option<&str>) -> Result<Option<String>, ApiError> {
    if !endpoint.needs_token() {
        return Ok(None);
    }
    match token {
        Some(token) if !token.is_empty() => Ok(Some(bearer(token))),
        _ => Err(ApiError::NotSignedIn),
    }
}

/// Body of login and register calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Which auth call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            AuthMode::Login => Endpoint::Login,
            AuthMode::Register => Endpoint::Register,
        }
    }

    /// The one status that means success
    pub fn success_status(&self) -> u16 {
        match self {
            AuthMode::Login => 200,
            AuthMode::Register => 201,
        }
    }
}

/// Pull the token out of an auth response. Only the exact success status
/// with a non-empty token counts.
pub fn interpret_auth_response(mode: AuthMode, status: u16, body: &str) -> Result<String, ApiError> {
    if status != mode.success_status() {
        return Err(ApiError::Status(status));
    }
    let response: TokenResponse = serde_json::from_str(body)?;
    match response.token {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ApiError::MissingToken),
    }
}

/// `Ok(None)` means the service has no saved state for this player
pub fn interpret_state_response(status: u16, body: &str) -> Result<Option<Snapshot>, ApiError> {
    if status != 200 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(body)?))
}

/// Save and reset succeed on any 2xx
pub fn interpret_ack_response(status: u16) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(ApiError::Status(status))
    }
}
