//! SQLite-backed user and session stores using sqlx.

use {
    async_trait::async_trait,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
};

use crate::{
    Error, Result,
    store::{SessionStore, UserStore},
    types::{NewUser, Session, User},
};

/// Open a pool for `database_url` and run migrations.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    crate::run_migrations(&pool).await?;
    Ok(pool)
}

type UserRow = (String, String, String, String);

fn user_from_row((id, email, name, password_hash): UserRow) -> User {
    User {
        id,
        email,
        name,
        password_hash,
    }
}

/// User records in the `users` table.
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Migrations must already have run on `pool`.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name, password_hash FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(user_from_row))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, name, password_hash FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(user_from_row))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let id = uuid::Uuid::new_v4().to_string();
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(User {
                id,
                email: user.email,
                name: user.name,
                password_hash: user.password_hash,
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Session rows in the `sessions` table.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Migrations must already have run on `pool`.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<Session>> {
        let row: Option<(String, String, i64, i64)> = sqlx::query_as(
            "SELECT token, user_id, expires_at, created_at FROM sessions WHERE token = ? LIMIT 1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(token, user_id, expires_at, created_at)| Session {
            token,
            user_id,
            expires_at,
            created_at,
        }))
    }

    async fn delete(&self, token: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now_ms: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now_ms)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        crate::test_support::memory_pool().await
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            name: "Alice".into(),
            password_hash: "$argon2id$placeholder".into(),
        }
    }

    #[tokio::test]
    async fn user_lookup_is_exact_match() {
        let users = SqliteUserStore::with_pool(pool().await);
        let created = users.create(new_user("alice@example.com")).await.unwrap();

        let found = users.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.as_ref(), Some(&created));
        assert!(
            users
                .find_by_email("Alice@Example.com")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(users.find_by_id(&created.id).await.unwrap(), Some(created));
        assert!(users.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_email_taken() {
        let users = SqliteUserStore::with_pool(pool().await);
        users.create(new_user("alice@example.com")).await.unwrap();
        let err = users
            .create(new_user("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmailTaken));
    }

    #[tokio::test]
    async fn update_password_hash_persists() {
        let users = SqliteUserStore::with_pool(pool().await);
        let user = users.create(new_user("bob@example.com")).await.unwrap();
        users
            .update_password_hash(&user.id, "$argon2id$new")
            .await
            .unwrap();
        let reloaded = users.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "$argon2id$new");
    }

    #[tokio::test]
    async fn session_delete_is_idempotent() {
        let pool = pool().await;
        let users = SqliteUserStore::with_pool(pool.clone());
        let sessions = SqliteSessionStore::with_pool(pool);
        let user = users.create(new_user("carol@example.com")).await.unwrap();

        let session = Session {
            token: "tok".into(),
            user_id: user.id,
            expires_at: 2_000,
            created_at: 1_000,
        };
        sessions.insert(&session).await.unwrap();
        assert_eq!(sessions.find("tok").await.unwrap(), Some(session));

        assert_eq!(sessions.delete("tok").await.unwrap(), 1);
        assert_eq!(sessions.delete("tok").await.unwrap(), 0);
        assert!(sessions.find("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_expired_keeps_live_rows() {
        let pool = pool().await;
        let users = SqliteUserStore::with_pool(pool.clone());
        let sessions = SqliteSessionStore::with_pool(pool);
        let user = users.create(new_user("dave@example.com")).await.unwrap();

        for (token, expires_at) in [("old", 100), ("edge", 500), ("live", 900)] {
            sessions
                .insert(&Session {
                    token: token.into(),
                    user_id: user.id.clone(),
                    expires_at,
                    created_at: 0,
                })
                .await
                .unwrap();
        }

        assert_eq!(sessions.delete_expired(500).await.unwrap(), 2);
        assert!(sessions.find("live").await.unwrap().is_some());
        assert!(sessions.find("edge").await.unwrap().is_none());
    }
}
