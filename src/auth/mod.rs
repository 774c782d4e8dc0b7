//! Sign-in, registration and sign-out with a role gate.
//!
//! Sign-in order:
//! 1. Identity provider → bearer token (held in memory only)
//! 2. `GET /api/users/profile` with that token
//! 3. Role gate: backend role must equal the entry point's role
//! 4. Only then is the token stored, replacing any previous one
//!
//! A mismatch at step 3 leaves the credential store untouched.

pub mod identity;

pub use identity::{
    FederatedResult, FederatedResultKind, HttpIdentityProvider, IdentityError, IdentityProvider,
};

use crate::api::Transport;
use crate::credentials::{self, BearerToken, CredentialStore};
use crate::error::ClientError;
use crate::models::{RegisterUser, Role, User};
use crate::session::Session;
use crate::shell::Destination;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Result of a sign-in attempt that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated { user: User, destination: Destination },
    /// The federated prompt was cancelled or dismissed. Nothing changed.
    Aborted,
}

/// Registration form as entered.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Validation("Name is required".into()));
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

pub struct AuthFlow<'a, S, T, P> {
    session: &'a Session<S, T>,
    identity: &'a P,
}

impl<'a, S, T, P> AuthFlow<'a, S, T, P>
where
    S: CredentialStore,
    T: Transport,
    P: IdentityProvider,
{
    pub fn new(session: &'a Session<S, T>, identity: &'a P) -> Self {
        Self { session, identity }
    }

    /// Email/password sign-in through the `entry` role's entry point.
    pub fn login_with_password(
        &self,
        entry: Role,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, ClientError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ClientError::Validation("Password is required".into()));
        }
        let token = self.identity.sign_in(email.trim(), password)?;
        self.finish_login(entry, token)
    }

    /// Federated sign-in. Anything but a `success` result aborts silently.
    pub fn login_federated(
        &self,
        entry: Role,
        result: &FederatedResult,
    ) -> Result<LoginOutcome, ClientError> {
        if result.kind != FederatedResultKind::Success {
            tracing::debug!(kind = ?result.kind, provider = %result.provider, "Federated sign-in not completed");
            return Ok(LoginOutcome::Aborted);
        }
        let id_token = result
            .id_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ClientError::Provider("Sign-in provider returned no credential".into()))?;

        let token = self.identity.exchange(&result.provider, id_token)?;
        self.finish_login(entry, token)
    }

    /// Create the identity account and the backend user, then sign in.
    pub fn register(&self, form: &Registration) -> Result<User, ClientError> {
        form.validate()?;
        let token = self.identity.sign_up(form.email.trim(), &form.password)?;
        let body = RegisterUser {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            role: form.role,
        };
        let user = self.session.api().register(&token, &body)?;
        credentials::save_token(self.session.store(), &token)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Registered and signed in");
        Ok(user)
    }

    /// Remove the stored token.
    pub fn logout(&self) -> Result<(), ClientError> {
        credentials::clear_token(self.session.store())?;
        tracing::info!("Signed out");
        Ok(())
    }

    fn finish_login(&self, entry: Role, token: BearerToken) -> Result<LoginOutcome, ClientError> {
        let user = self.session.api().profile(&token)?;
        if user.role != entry {
            tracing::warn!(expected = %entry, actual = %user.role, "Role gate denied sign-in");
            return Err(ClientError::RoleMismatch {
                expected: entry,
                actual: user.role,
            });
        }

        credentials::save_token(self.session.store(), &token)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(LoginOutcome::Authenticated {
            destination: Destination::landing_for(user.role),
            user,
        })
    }
}

fn validate_email(email: &str) -> Result<(), ClientError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ClientError::Validation("Enter a valid email address".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::Method;
    use serde_json::json;

    use crate::api::transport::RecordingTransport;
    use crate::api::ApiClient;
    use crate::credentials::MemoryCredentialStore;

    /// Provider that accepts one password and one federated id token.
    struct FakeProvider {
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl IdentityProvider for FakeProvider {
        fn sign_in(&self, _email: &str, password: &str) -> Result<BearerToken, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match password {
                "right" => Ok(BearerToken::new("fresh-token").unwrap()),
                "offline" => Err(IdentityError::Network("Network request failed".into())),
                _ => Err(IdentityError::InvalidCredentials),
            }
        }

        fn sign_up(&self, _email: &str, _password: &str) -> Result<BearerToken, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BearerToken::new("signup-token").unwrap())
        }

        fn exchange(&self, _provider: &str, id_token: &str) -> Result<BearerToken, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(id_token, "id-tok");
            Ok(BearerToken::new("fed-token").unwrap())
        }
    }

    fn profile(role: &str) -> serde_json::Value {
        json!({"_id": "u1", "name": "Ada", "email": "ada@example.org", "role": role})
    }

    fn session_with_role(role: &str) -> Session<MemoryCredentialStore, RecordingTransport> {
        Session::new(
            MemoryCredentialStore::new(),
            ApiClient::new(RecordingTransport::new().reply(
                Method::GET,
                "/api/users/profile",
                profile(role),
            )),
        )
    }

    fn stored(session: &Session<MemoryCredentialStore, RecordingTransport>) -> Option<String> {
        credentials::load_token(session.store())
            .unwrap()
            .map(|t| t.expose().to_string())
    }

    #[test]
    fn matching_role_stores_token() {
        let session = session_with_role("DOCTOR");
        let provider = FakeProvider::new();
        let flow = AuthFlow::new(&session, &provider);

        let outcome = flow
            .login_with_password(Role::Doctor, "ada@example.org", "right")
            .unwrap();
        match outcome {
            LoginOutcome::Authenticated { user, destination } => {
                assert_eq!(user.role, Role::Doctor);
                assert_eq!(destination, Destination::DoctorHome);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(stored(&session).as_deref(), Some("fresh-token"));
    }

    #[test]
    fn profile_probe_uses_fresh_token() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        AuthFlow::new(&session, &provider)
            .login_with_password(Role::Patient, "ada@example.org", "right")
            .unwrap();
        let calls = session.api().transport().calls();
        assert_eq!(calls[0].token.as_deref(), Some("fresh-token"));
    }

    #[test]
    fn role_mismatch_never_stores_token() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        let flow = AuthFlow::new(&session, &provider);

        let err = flow
            .login_with_password(Role::Doctor, "ada@example.org", "right")
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::RoleMismatch {
                expected: Role::Doctor,
                actual: Role::Patient
            }
        ));
        assert!(stored(&session).is_none());
    }

    #[test]
    fn role_mismatch_keeps_previous_session_untouched() {
        let session = session_with_role("PATIENT");
        credentials::save_token(session.store(), &BearerToken::new("earlier").unwrap()).unwrap();
        let provider = FakeProvider::new();

        let _ = AuthFlow::new(&session, &provider).login_with_password(
            Role::Doctor,
            "ada@example.org",
            "right",
        );
        assert_eq!(stored(&session).as_deref(), Some("earlier"));
    }

    #[test]
    fn successful_login_replaces_prior_token() {
        let session = session_with_role("PATIENT");
        credentials::save_token(session.store(), &BearerToken::new("earlier").unwrap()).unwrap();
        let provider = FakeProvider::new();

        AuthFlow::new(&session, &provider)
            .login_with_password(Role::Patient, "ada@example.org", "right")
            .unwrap();
        assert_eq!(stored(&session).as_deref(), Some("fresh-token"));
    }

    #[test]
    fn invalid_credentials_are_generic() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        let err = AuthFlow::new(&session, &provider)
            .login_with_password(Role::Patient, "ada@example.org", "wrong")
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
        assert_eq!(session.api().transport().call_count(), 0);
    }

    #[test]
    fn network_failure_surfaces_provider_text() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        let err = AuthFlow::new(&session, &provider)
            .login_with_password(Role::Patient, "ada@example.org", "offline")
            .unwrap_err();
        assert_eq!(err.user_message(), "Network request failed");
    }

    #[test]
    fn malformed_email_rejected_before_provider() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        let err = AuthFlow::new(&session, &provider)
            .login_with_password(Role::Patient, "not-an-email", "right")
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn federated_non_success_aborts_silently() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        let flow = AuthFlow::new(&session, &provider);

        for kind in [
            FederatedResultKind::Cancel,
            FederatedResultKind::Dismiss,
            FederatedResultKind::Error,
        ] {
            let result = FederatedResult {
                kind,
                provider: "google".into(),
                id_token: Some("id-tok".into()),
            };
            assert_eq!(flow.login_federated(Role::Patient, &result).unwrap(), LoginOutcome::Aborted);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(stored(&session).is_none());
    }

    #[test]
    fn federated_success_goes_through_role_gate() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        let result = FederatedResult {
            kind: FederatedResultKind::Success,
            provider: "google".into(),
            id_token: Some("id-tok".into()),
        };
        let outcome = AuthFlow::new(&session, &provider)
            .login_federated(Role::Patient, &result)
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated { .. }));
        assert_eq!(stored(&session).as_deref(), Some("fed-token"));
    }

    #[test]
    fn logout_then_profile_fetch_is_skipped() {
        let session = session_with_role("PATIENT");
        let provider = FakeProvider::new();
        let flow = AuthFlow::new(&session, &provider);
        flow.login_with_password(Role::Patient, "ada@example.org", "right")
            .unwrap();
        let before = session.api().transport().call_count();

        flow.logout().unwrap();
        assert!(matches!(
            session.current_user(),
            Err(ClientError::NotAuthenticated)
        ));
        assert_eq!(session.api().transport().call_count(), before);
    }

    #[test]
    fn register_posts_user_and_stores_token() {
        let session = Session::new(
            MemoryCredentialStore::new(),
            ApiClient::new(RecordingTransport::new().reply(
                Method::POST,
                "/api/users/register",
                profile("DOCTOR"),
            )),
        );
        let provider = FakeProvider::new();
        let form = Registration {
            name: " Ada ".into(),
            email: "ada@example.org".into(),
            password: "secret1".into(),
            role: Role::Doctor,
        };
        let user = AuthFlow::new(&session, &provider).register(&form).unwrap();
        assert_eq!(user.role, Role::Doctor);

        let call = &session.api().transport().calls()[0];
        assert_eq!(call.body.as_ref().unwrap()["name"], "Ada");
        assert_eq!(call.body.as_ref().unwrap()["role"], "DOCTOR");
        assert_eq!(stored(&session).as_deref(), Some("signup-token"));
    }

    #[test]
    fn short_password_rejected_at_registration() {
        let form = Registration {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            password: "123".into(),
            role: Role::Patient,
        };
        assert!(matches!(form.validate(), Err(ClientError::Validation(_))));
    }
}
