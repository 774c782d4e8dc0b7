//! Identity provider seam: exchanges credentials for a bearer token.
//!
//! `HttpIdentityProvider` speaks a minimal token endpoint:
//! `POST {auth_url}/v1/token` with a `grantType` of `password`, `signup`
//! or `federated`, answering `{ "accessToken": ".." }`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::BearerToken;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Transport failure; carries the underlying client's message verbatim.
    #[error("{0}")]
    Network(String),
    #[error("Identity provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("Unexpected identity provider response: {0}")]
    Decode(String),
}

/// Outcome kind reported by a federated sign-in prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FederatedResultKind {
    Success,
    Cancel,
    Dismiss,
    Error,
}

/// What the federated sign-in prompt handed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedResult {
    #[serde(rename = "type")]
    pub kind: FederatedResultKind,
    /// Provider name, e.g. `google`.
    pub provider: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Something that can turn credentials into a bearer token.
pub trait IdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<BearerToken, IdentityError>;
    fn sign_up(&self, email: &str, password: &str) -> Result<BearerToken, IdentityError>;
    fn exchange(&self, provider: &str, id_token: &str) -> Result<BearerToken, IdentityError>;
}

#[derive(Serialize)]
#[serde(tag = "grantType", rename_all = "camelCase")]
enum TokenGrant<'a> {
    #[serde(rename = "password")]
    Password { email: &'a str, password: &'a str },
    #[serde(rename = "signup")]
    Signup { email: &'a str, password: &'a str },
    #[serde(rename = "federated", rename_all = "camelCase")]
    Federated { provider: &'a str, id_token: &'a str },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(alias = "token")]
    access_token: String,
}

/// Blocking HTTP client for the identity provider's token endpoint.
pub struct HttpIdentityProvider {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpIdentityProvider {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, IdentityError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| IdentityError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_token(&self, grant: &TokenGrant<'_>) -> Result<BearerToken, IdentityError> {
        let url = format!("{}/v1/token", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(grant)
            .send()
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status();
        if matches!(status.as_u16(), 400 | 401 | 403) {
            tracing::debug!(status = status.as_u16(), "Identity provider rejected credentials");
            return Err(IdentityError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(IdentityError::Provider {
                status: status.as_u16(),
                message: crate::api::error::error_message(&body),
            });
        }

        let parsed: TokenResponse = response
            .json()
            .map_err(|e| IdentityError::Decode(e.to_string()))?;
        BearerToken::new(parsed.access_token)
            .ok_or_else(|| IdentityError::Decode("empty access token".into()))
    }
}

impl IdentityProvider for HttpIdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<BearerToken, IdentityError> {
        self.request_token(&TokenGrant::Password { email, password })
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<BearerToken, IdentityError> {
        self.request_token(&TokenGrant::Signup { email, password })
    }

    fn exchange(&self, provider: &str, id_token: &str) -> Result<BearerToken, IdentityError> {
        self.request_token(&TokenGrant::Federated { provider, id_token })
    }
}
