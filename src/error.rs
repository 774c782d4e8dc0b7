//! Client-wide error type.
//!
//! Every flow returns `Result<T, ClientError>`. The variant says what went
//! wrong; `user_message()` says what to show the user.

use crate::api::ApiError;
use crate::auth::IdentityError;
use crate::credentials::CredentialError;
use crate::models::Role;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Identity provider error: {0}")]
    Provider(String),
    #[error("Account role is {actual}, entry point requires {expected}")]
    RoleMismatch { expected: Role, actual: Role },
    #[error("{0}")]
    Validation(String),
}

impl From<IdentityError> for ClientError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => ClientError::InvalidCredentials,
            IdentityError::Network(message) | IdentityError::Provider { message, .. } => {
                ClientError::Provider(message)
            }
            IdentityError::Decode(reason) => {
                ClientError::Provider(format!("Unexpected identity provider response: {reason}"))
            }
        }
    }
}

impl ClientError {
    /// Text suitable for an alert.
    ///
    /// Generic for backend failures; the provider's own text for provider and
    /// network failures during sign-in; an explicit denial for role mismatch.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::NotAuthenticated => "Please sign in to continue.".into(),
            ClientError::Api(ApiError::Unauthorized) => {
                "Your session has expired. Please sign in again.".into()
            }
            ClientError::Api(
                ApiError::Connection(_) | ApiError::Timeout | ApiError::HttpClient(_),
            ) => "Unable to reach the server. Check your connection and try again.".into(),
            ClientError::Api(ApiError::NotFound(_)) => {
                "The requested item could not be found.".into()
            }
            ClientError::Api(_) => "Something went wrong. Please try again.".into(),
            ClientError::Credentials(_) => "Could not access saved sign-in data.".into(),
            ClientError::InvalidCredentials => "Invalid email or password.".into(),
            ClientError::Provider(message) => message.clone(),
            ClientError::RoleMismatch { expected, .. } => format!(
                "Access denied. This account is not registered as a {}.",
                role_noun(*expected)
            ),
            ClientError::Validation(message) => message.clone(),
        }
    }
}

fn role_noun(role: Role) -> &'static str {
    match role {
        Role::Doctor => "doctor",
        Role::Patient => "patient",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_are_generic() {
        let err = ClientError::from(ApiError::Status {
            status: 500,
            message: "MongoServerError: E11000 duplicate key".into(),
        });
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn provider_message_is_raw() {
        let err = ClientError::from(IdentityError::Network("Network request failed".into()));
        assert_eq!(err.user_message(), "Network request failed");
    }

    #[test]
    fn role_mismatch_is_denial() {
        let err = ClientError::RoleMismatch {
            expected: Role::Doctor,
            actual: Role::Patient,
        };
        assert_eq!(
            err.user_message(),
            "Access denied. This account is not registered as a doctor."
        );
        assert!(err.to_string().contains("PATIENT"));
    }

    #[test]
    fn expired_session_message() {
        let err = ClientError::from(ApiError::Unauthorized);
        assert!(err.user_message().contains("expired"));
    }

    #[test]
    fn invalid_credentials_do_not_reveal_cause() {
        let err = ClientError::from(IdentityError::InvalidCredentials);
        assert_eq!(err.user_message(), "Invalid email or password.");
    }
}
