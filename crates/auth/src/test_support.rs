#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use {
    async_trait::async_trait,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
};

use crate::{
    AuthService, Error, Result, SessionManager,
    password::hash_password,
    store::{SessionStore, UserStore},
    store_sqlite::{SqliteSessionStore, SqliteUserStore},
    types::{NewUser, Session, User},
};

/// Single-connection in-memory database with migrations applied.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::run_migrations(&pool).await.unwrap();
    pool
}

pub struct Fixture {
    pub users: Arc<SqliteUserStore>,
    pub sessions: Arc<SqliteSessionStore>,
    pub manager: SessionManager,
    pub service: AuthService,
}

impl Fixture {
    pub async fn new() -> Self {
        let pool = memory_pool().await;
        let users = Arc::new(SqliteUserStore::with_pool(pool.clone()));
        let sessions = Arc::new(SqliteSessionStore::with_pool(pool));
        let manager = SessionManager::new(users.clone(), sessions.clone());
        let service = AuthService::new(users.clone(), manager.clone());
        Self {
            users,
            sessions,
            manager,
            service,
        }
    }

    pub async fn user(&self, email: &str, password: &str) -> User {
        self.users
            .create(NewUser {
                email: email.into(),
                name: "Alice".into(),
                password_hash: hash_password(password).unwrap(),
            })
            .await
            .unwrap()
    }
}

/// A store whose every call fails like an unreachable database.
pub struct FailingStore;

fn unreachable_db<T>() -> Result<T> {
    Err(Error::Storage(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl UserStore for FailingStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        unreachable_db()
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<User>> {
        unreachable_db()
    }

    async fn create(&self, _user: NewUser) -> Result<User> {
        unreachable_db()
    }

    async fn update_password_hash(&self, _id: &str, _password_hash: &str) -> Result<()> {
        unreachable_db()
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn insert(&self, _session: &Session) -> Result<()> {
        unreachable_db()
    }

    async fn find(&self, _token: &str) -> Result<Option<Session>> {
        unreachable_db()
    }

    async fn delete(&self, _token: &str) -> Result<u64> {
        unreachable_db()
    }

    async fn delete_expired(&self, _now_ms: i64) -> Result<u64> {
        unreachable_db()
    }
}
