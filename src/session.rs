//! Signed-in context shared by every flow: the credential store plus the API client.
//!
//! The stored token is read right before each authenticated request. A missing
//! token short-circuits with `NotAuthenticated` and no request is issued.

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::credentials::{self, BearerToken, CredentialStore};
use crate::error::ClientError;
use crate::models::User;

pub struct Session<S, T> {
    store: S,
    api: ApiClient<T>,
}

/// Session wired to the real backend and the configured store.
pub type DefaultSession = Session<Box<dyn CredentialStore>, HttpTransport>;

impl DefaultSession {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config.api_url, config.timeout)?;
        Ok(Session::new(
            credentials::open_store(config),
            ApiClient::new(transport),
        ))
    }
}

impl<S: CredentialStore, T: Transport> Session<S, T> {
    pub fn new(store: S, api: ApiClient<T>) -> Self {
        Self { store, api }
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored bearer token, or `NotAuthenticated`.
    pub fn token(&self) -> Result<BearerToken, ClientError> {
        match credentials::load_token(&self.store)? {
            Some(token) => Ok(token),
            None => {
                tracing::warn!("No stored token, skipping authenticated request");
                Err(ClientError::NotAuthenticated)
            }
        }
    }

    pub fn is_signed_in(&self) -> Result<bool, ClientError> {
        Ok(credentials::load_token(&self.store)?.is_some())
    }

    /// Fetch the signed-in user's profile.
    pub fn current_user(&self) -> Result<User, ClientError> {
        let token = self.token()?;
        Ok(self.api.profile(&token)?)
    }
}
