//! Authentication core for Vermietertools.
//!
//! This crate provides:
//! - `password`: Argon2id hashing and verification
//! - `SessionManager`: session issue, lazy-expiry resolution, and revocation
//! - `AuthService`: login, registration, and password change
//! - `UserStore`/`SessionStore` traits with SQLite implementations
//! - `Identity`/`OwnerScope`: the per-request caller and its ownership filter

pub mod error;
pub mod password;
pub mod service;
pub mod session;
pub mod store;
pub mod store_sqlite;
pub mod types;

#[cfg(test)]
mod test_support;

pub use {
    error::{Error, Result},
    service::{AuthService, MIN_PASSWORD_LEN, SignedIn},
    session::{SESSION_TTL_SECS, SessionManager},
    store::{SessionStore, UserStore},
    store_sqlite::{SqliteSessionStore, SqliteUserStore},
    types::{Identity, NewUser, OwnerScope, Session, User},
};

/// Run database migrations for the `users` and `sessions` tables.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
