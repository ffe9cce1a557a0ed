//! Persistence traits for users and sessions.
//!
//! Implementations must make each call atomic per row; the session manager
//! relies on that plus idempotent deletes instead of transactions.

use async_trait::async_trait;

use crate::{
    Result,
    types::{NewUser, Session, User},
};

/// Credential store: user records keyed by id and by exact email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;
    /// Insert a new user. Fails with [`crate::Error::EmailTaken`] when the email
    /// exists.
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()>;
}

/// Session store: opaque tokens mapping to a user and an expiry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &Session) -> Result<()>;
    async fn find(&self, token: &str) -> Result<Option<Session>>;
    /// Delete every row with `token`. Returns the number removed; zero is not
    /// an error.
    async fn delete(&self, token: &str) -> Result<u64>;
    /// Delete every row whose expiry is at or before `now_ms`.
    async fn delete_expired(&self, now_ms: i64) -> Result<u64>;
}
