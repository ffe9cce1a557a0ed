use {
    chrono::Utc,
    serde::{Deserialize, Serialize},
};

/// A stored user record. Never serialized: the password hash stays
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Input for creating a user. `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// A persisted session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    /// Absolute expiry, unix milliseconds.
    pub expires_at: i64,
    /// Creation time, unix milliseconds.
    pub created_at: i64,
}

impl Session {
    /// A session is valid only while its expiry lies strictly in the future.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }
}

/// The resolved caller of a request. Recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl Identity {
    /// Whether a row owned by `owner_id` belongs to this caller.
    pub fn owns(&self, owner_id: &str) -> bool {
        self.id == owner_id
    }

    /// Ownership filter for downstream queries.
    pub fn scope(&self) -> OwnerScope<'_> {
        OwnerScope { owner_id: &self.id }
    }
}

/// Row filter every property, unit, and person query goes through: rows owned
/// by the caller that have not been soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope<'a> {
    pub owner_id: &'a str,
}

impl OwnerScope<'_> {
    /// SQL predicate with one positional parameter for the owner id. Bind
    /// [`OwnerScope::owner_id`] to it.
    pub const PREDICATE: &'static str = "user_id = ? AND is_active = 1";

    /// In-memory equivalent of [`OwnerScope::PREDICATE`].
    pub fn admits(&self, row_owner_id: &str, is_active: bool) -> bool {
        is_active && self.owner_id == row_owner_id
    }
}

pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
