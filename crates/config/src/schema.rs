/// Config schema types (server, auth, database).
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VermieterConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

impl VermieterConfig {
    /// Whether session cookies must carry the `Secure` attribute.
    ///
    /// Explicit `auth.secure_cookies` wins; otherwise production mode decides.
    pub fn secure_cookies(&self) -> bool {
        self.auth.secure_cookies.unwrap_or(self.server.production)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 3000.
    pub port: u16,
    /// Production mode (TLS-terminated deployment). Enables secure cookies.
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
            production: false,
        }
    }
}

/// Session cookie and login page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Where unauthenticated page requests are redirected.
    pub login_path: String,
    /// Force the `Secure` cookie attribute on or off. `None` follows
    /// `server.production`.
    pub secure_cookies: Option<bool>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".into(),
            secure_cookies: None,
        }
    }
}

/// SQLite database location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file. Defaults to `<data_dir>/vermieter.db`.
    pub path: Option<PathBuf>,
}
