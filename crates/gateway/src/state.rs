use std::sync::Arc;

use {
    sqlx::SqlitePool,
    vermieter_auth::{AuthService, SessionManager, SqliteSessionStore, SqliteUserStore},
    vermieter_config::VermieterConfig,
};

/// Cookie attributes that depend on the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Emit `Secure` on the session cookie.
    pub secure: bool,
}

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub cookies: CookiePolicy,
    /// Redirect target for unauthenticated page requests.
    pub login_path: Arc<str>,
}

impl AppState {
    pub fn new(auth: AuthService, config: &VermieterConfig) -> Self {
        Self {
            auth: Arc::new(auth),
            cookies: CookiePolicy {
                secure: config.secure_cookies(),
            },
            login_path: Arc::from(config.auth.login_path.as_str()),
        }
    }

    /// Wire SQLite stores over `pool`. Migrations must already have run.
    pub fn from_pool(pool: SqlitePool, config: &VermieterConfig) -> Self {
        let users = Arc::new(SqliteUserStore::with_pool(pool.clone()));
        let sessions = Arc::new(SqliteSessionStore::with_pool(pool));
        let manager = SessionManager::new(users.clone(), sessions);
        Self::new(AuthService::new(users, manager), config)
    }

    pub fn sessions(&self) -> &SessionManager {
        self.auth.sessions()
    }
}
