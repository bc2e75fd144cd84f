//! Login / registration form
//!
//! Validation runs before any network call; a form that fails validation
//! never reaches the auth service.

use thiserror::Error;

use crate::api::{ApiError, AuthMode, CredentialsPayload};

/// Errors shown inline under the auth form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Please enter both username and password.")]
    MissingCredentials,
    #[error("Please fill in all fields.")]
    MissingRegistrationFields,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Sign-in failed: {0}")]
    Service(#[from] ApiError),
}

/// Current contents of the auth form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
    /// Only used when registering
    pub confirm_password: String,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new(AuthMode::Login)
    }
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            username: String::new(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }

    /// Switch between login and register, clearing every field
    pub fn toggle_mode(&mut self) {
        let mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        *self = Self::new(mode);
    }

    /// Check the fields and build the request body
    pub fn validate(&self) -> Result<CredentialsPayload, AuthError> {
        match self.mode {
            AuthMode::Login => {
                if self.username.is_empty() || self.password.is_empty() {
                    return Err(AuthError::MissingCredentials);
                }
            }
            AuthMode::Register => {
                if self.username.is_empty()
                    || self.password.is_empty()
                    || self.confirm_password.is_empty()
                {
                    return Err(AuthError::MissingRegistrationFields);
                }
                if self.password != self.confirm_password {
                    return Err(AuthError::PasswordMismatch);
                }
            }
        }
        Ok(CredentialsPayload {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    pub fn greeting(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Welcome back, Pilot!",
            AuthMode::Register => "Join the Cosmic Fleet!",
        }
    }
}
