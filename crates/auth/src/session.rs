//! Session lifecycle: issue, resolve, revoke.
//!
//! A session moves `CREATED -> VALID -> {EXPIRED | REVOKED}` and never comes
//! back. Expiry is enforced lazily: the read path deletes an expired row the
//! first time it sees one. There is no background sweep; `prune_expired` is
//! an operator tool.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    Result,
    store::{SessionStore, UserStore},
    types::{Identity, Session, now_ms},
};

/// Fixed session lifetime: 7 days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Random bytes per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Issues, validates, and revokes sessions over injected stores.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }

    /// Create a session for `user_id` and return its token.
    pub async fn create_session(&self, user_id: &str) -> Result<String> {
        let now = now_ms();
        let session = Session {
            token: generate_token(),
            user_id: user_id.to_string(),
            expires_at: now + SESSION_TTL_SECS * 1000,
            created_at: now,
        };
        self.sessions.insert(&session).await?;
        debug!(user_id, "session created");
        Ok(session.token)
    }

    /// Resolve `token` to the caller's identity.
    ///
    /// Never fails: unknown, expired, and orphaned sessions yield `None`, and
    /// so does any storage error.
    pub async fn resolve_identity(&self, token: &str) -> Option<Identity> {
        match self.try_resolve(token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "session lookup failed, treating caller as anonymous");
                None
            },
        }
    }

    async fn try_resolve(&self, token: &str) -> Result<Option<Identity>> {
        let Some(session) = self.sessions.find(token).await? else {
            return Ok(None);
        };

        if session.is_expired_at(now_ms()) {
            // A concurrent request may have deleted it already.
            if let Err(e) = self.sessions.delete(token).await {
                warn!(error = %e, "failed to delete expired session");
            } else {
                debug!(user_id = %session.user_id, "expired session purged");
            }
            return Ok(None);
        }

        Ok(self
            .users
            .find_by_id(&session.user_id)
            .await?
            .map(Identity::from))
    }

    /// Revoke every session row carrying `token`. Idempotent.
    pub async fn destroy_session(&self, token: &str) -> Result<()> {
        let removed = self.sessions.delete(token).await?;
        debug!(removed, "session destroyed");
        Ok(())
    }

    /// Delete all expired sessions. Returns the number removed.
    pub async fn prune_expired(&self) -> Result<u64> {
        self.sessions.delete_expired(now_ms()).await
    }
}

fn generate_token() -> String {
    use {base64::Engine, rand::RngCore};

    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
