//! Password hashing using Argon2id.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! verification reads algorithm, cost, and salt from the digest itself.
//! Digests written under older parameters keep verifying.

use std::sync::LazyLock;

use {
    argon2::{
        Algorithm, Argon2, Params, Version,
        password_hash::{
            PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
        },
    },
    secrecy::{ExposeSecret, SecretString},
    tracing::warn,
};

use crate::error::{Error, Result};

/// Memory cost in KiB (64 MiB).
pub const MEMORY_KIB: u32 = 64 * 1024;
/// Passes over memory.
pub const ITERATIONS: u32 = 5;
/// Lanes.
pub const PARALLELISM: u32 = 1;

/// Digest checked when there is no stored hash to compare against.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| match hash_password("vermieter-dummy-password") {
        Ok(hash) => Some(hash),
        Err(e) => {
            warn!(error = %e, "failed to prepare dummy password digest");
            None
        },
    });

fn hasher() -> Result<Argon2<'static>> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| Error::unexpected(format!("invalid argon2 parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash `password` with a fresh random salt.
///
/// Empty input is rejected rather than hashed.
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(Error::validation("password must not be empty"));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::unexpected(format!("failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verify `password` against a PHC digest.
///
/// Returns `false` for a mismatch and for any digest that does not parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    let Ok(argon2) = hasher() else {
        return false;
    };
    argon2.verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Run a full verification against the dummy digest. Always `false`.
pub fn verify_dummy(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: &SecretString) -> Result<String> {
    let password = SecretString::new(password.expose_secret().clone());
    tokio::task::spawn_blocking(move || hash_password(password.expose_secret()))
        .await
        .map_err(|e| Error::unexpected(format!("password hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking thread pool. With no `hash` the
/// password is checked against the dummy digest and the result is `false`.
pub async fn verify_password_blocking(password: &SecretString, hash: Option<String>) -> bool {
    let password = SecretString::new(password.expose_secret().clone());
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(password.expose_secret(), &hash),
        None => verify_dummy(password.expose_secret()),
    })
    .await
    .unwrap_or(false)
}
