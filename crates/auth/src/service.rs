//! Login, registration, and password change orchestration.

use std::sync::Arc;

use {
    secrecy::{ExposeSecret, SecretString},
    tracing::{debug, info},
};

use crate::{
    Error, Result,
    password::{hash_password_blocking, verify_password_blocking},
    session::SessionManager,
    store::UserStore,
    types::{Identity, NewUser},
};

/// Minimum length for newly chosen passwords.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A freshly established session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub identity: Identity,
    pub token: String,
}

/// Authentication service over the user store and the session manager.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, sessions: SessionManager) -> Self {
        Self { users, sessions }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown email and wrong password both fail with
    /// [`Error::InvalidCredentials`]. An unknown email still pays for one full password verification, so
    /// response time does not reveal whether the account exists.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SignedIn> {
        if email.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(Error::validation("email and password are required"));
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            verify_password_blocking(password, None).await;
            debug!("login failed: unknown email");
            return Err(Error::InvalidCredentials);
        };

        if !verify_password_blocking(password, Some(user.password_hash.clone())).await {
            debug!(user_id = %user.id, "login failed: wrong password");
            return Err(Error::InvalidCredentials);
        }

        let token = self.sessions.create_session(&user.id).await?;
        info!(user_id = %user.id, "user logged in");
        Ok(SignedIn {
            identity: user.into(),
            token,
        })
    }

    /// Create a user and open a session for it.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &SecretString,
    ) -> Result<SignedIn> {
        let identity = self.create_user(email, name, password).await?;
        let token = self.sessions.create_session(&identity.id).await?;
        Ok(SignedIn { identity, token })
    }

    /// Create a user without opening a session.
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &SecretString,
    ) -> Result<Identity> {
        if email.trim().is_empty() || name.trim().is_empty() || password.expose_secret().is_empty()
        {
            return Err(Error::validation("email, name and password are required"));
        }
        check_new_password(password.expose_secret())?;

        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                name: name.trim().to_string(),
                password_hash: hash_password_blocking(password).await?,
            })
            .await?;
        info!(user_id = %user.id, "user registered");
        Ok(user.into())
    }

    /// Replace the caller's password after checking the current one.
    ///
    /// Existing sessions stay valid.
    pub async fn change_password(
        &self,
        identity: &Identity,
        current: &SecretString,
        new_password: &SecretString,
    ) -> Result<()> {
        check_new_password(new_password.expose_secret())?;

        let Some(user) = self.users.find_by_id(&identity.id).await? else {
            return Err(Error::Unauthenticated);
        };
        if !verify_password_blocking(current, Some(user.password_hash.clone())).await {
            return Err(Error::WrongPassword);
        }

        let hash = hash_password_blocking(new_password).await?;
        self.users.update_password_hash(&user.id, &hash).await?;
        info!(user_id = %user.id, "password changed");
        Ok(())
    }
}

fn check_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::test_support};

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[tokio::test]
    async fn login_with_correct_credentials() {
        let fx = test_support::Fixture::new().await;
        let user = fx.user("alice@example.com", "secret123").await;

        let signed_in = fx
            .service
            .login("alice@example.com", &secret("secret123"))
            .await
            .unwrap();
        assert_eq!(signed_in.identity.id, user.id);
        let resolved = fx
            .service
            .sessions()
            .resolve_identity(&signed_in.token)
            .await
            .unwrap();
        assert_eq!(resolved, signed_in.identity);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let fx = test_support::Fixture::new().await;
        fx.user("alice@example.com", "secret123").await;

        let wrong_pw = fx
            .service
            .login("alice@example.com", &secret("nope"))
            .await
            .unwrap_err();
        let unknown = fx
            .service
            .login("mallory@example.com", &secret("secret123"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_pw, Error::InvalidCredentials));
        assert!(matches!(unknown, Error::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn unknown_email_costs_as_much_as_wrong_password() {
        use std::time::{Duration, Instant};

        let fx = test_support::Fixture::new().await;
        fx.user("alice@example.com", "secret123").await;
        // Build the dummy digest outside the timed section.
        let _ = fx
            .service
            .login("nobody@example.com", &secret("secret123"))
            .await;

        let mut unknown = Duration::MAX;
        let mut wrong = Duration::MAX;
        for _ in 0..3 {
            let start = Instant::now();
            let _ = fx
                .service
                .login("nobody@example.com", &secret("secret123"))
                .await;
            unknown = unknown.min(start.elapsed());

            let start = Instant::now();
            let _ = fx
                .service
                .login("alice@example.com", &secret("wrong-password"))
                .await;
            wrong = wrong.min(start.elapsed());
        }

        assert!(
            unknown * 3 >= wrong,
            "unknown email took {unknown:?}, wrong password took {wrong:?}"
        );
    }

    #[tokio::test]
    async fn missing_fields_fail_before_storage() {
        let service = AuthService::new(
            Arc::new(test_support::FailingStore),
            SessionManager::new(
                Arc::new(test_support::FailingStore),
                Arc::new(test_support::FailingStore),
            ),
        );
        // A storage error would surface if the store were touched.
        for (email, pw) in [("", "secret123"), ("a@example.com", ""), ("   ", "x")] {
            let err = service.login(email, &secret(pw)).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{email:?}/{pw:?}");
        }
    }

    #[tokio::test]
    async fn storage_failure_on_login_is_storage_error() {
        let service = AuthService::new(
            Arc::new(test_support::FailingStore),
            SessionManager::new(
                Arc::new(test_support::FailingStore),
                Arc::new(test_support::FailingStore),
            ),
        );
        let err = service
            .login("alice@example.com", &secret("secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn register_opens_session_and_rejects_duplicates() {
        let fx = test_support::Fixture::new().await;
        let signed_in = fx
            .service
            .register("bob@example.com", "Bob", &secret("longenough"))
            .await
            .unwrap();
        assert_eq!(signed_in.identity.email, "bob@example.com");
        assert!(
            fx.service
                .sessions()
                .resolve_identity(&signed_in.token)
                .await
                .is_some()
        );

        let err = fx
            .service
            .register("bob@example.com", "Bob", &secret("longenough"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmailTaken));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let fx = test_support::Fixture::new().await;
        for (email, name, pw) in [
            ("", "Bob", "longenough"),
            ("bob@example.com", "", "longenough"),
            ("bob@example.com", "Bob", "short"),
        ] {
            let err = fx
                .service
                .register(email, name, &secret(pw))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
    }

    #[tokio::test]
    async fn change_password_requires_current() {
        let fx = test_support::Fixture::new().await;
        let user = fx.user("alice@example.com", "secret123").await;
        let identity = Identity::from(user);

        let err = fx
            .service
            .change_password(&identity, &secret("wrong"), &secret("newsecret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::WrongPassword));

        fx.service
            .change_password(&identity, &secret("secret123"), &secret("newsecret1"))
            .await
            .unwrap();
        assert!(
            fx.service
                .login("alice@example.com", &secret("secret123"))
                .await
                .is_err()
        );
        assert!(
            fx.service
                .login("alice@example.com", &secret("newsecret1"))
                .await
                .is_ok()
        );
    }

    #[test]
    fn secret_debug_is_redacted() {
        let pw = secret("hunter22");
        assert!(!format!("{pw:?}").contains("hunter22"));
    }
}
