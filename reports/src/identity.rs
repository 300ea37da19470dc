//! Identity service client: login and registration.
//!
//! Issues the [`Session`] a view is mounted with. The token and user id are
//! opaque to the rest of the crate.

use crate::error::ServiceError;
use crate::service::http::{build_client, decode, rejection};
use crate::session::Session;
use crate::types::{Role, UserId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Login form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Registration form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: LoginUser,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginUser {
    user_id: UserId,
    #[serde(default)]
    is_admin: bool,
}

/// Client for the identity endpoints
#[derive(Clone, Debug)]
pub struct IdentityClient {
    client: Client,
    api_url: String,
}

impl IdentityClient {
    /// Create a client with the transport's default timeout
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client with an optional request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the HTTP client cannot be built
    pub fn with_timeout(api_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(timeout)?,
            ..Self::new(api_url)
        })
    }

    /// Exchange credentials for a session
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Rejected`] with the service's message (or
    /// "Login failed") if the credentials are refused
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ServiceError> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.api_url))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, response, "Login failed").await);
        }

        let body: LoginResponse = decode(response).await?;
        let role = if body.user.is_admin {
            Role::Administrator
        } else {
            Role::Submitter
        };
        tracing::info!(user_id = %body.user.user_id, %role, "Logged in");

        Ok(Session::new(body.token, body.user.user_id, role))
    }

    /// Create an account
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Rejected`] with the service's message (or
    /// "Registration failed") if registration is refused
    pub async fn register(&self, registration: &Registration) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(format!("{}/auth/register", self.api_url))
            .json(registration)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(email = %registration.email, "Registered");
            Ok(())
        } else {
            Err(rejection(status, response, "Registration failed").await)
        }
    }
}
