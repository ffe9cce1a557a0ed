use std::path::Path;

use {
    clap::Subcommand,
    secrecy::SecretString,
    vermieter_config::VermieterConfig,
    vermieter_gateway::{AppState, open_database},
};

const PASSWORD_ENV: &str = "VERMIETER_PASSWORD";

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user account. The password is read from `VERMIETER_PASSWORD`
    /// or prompted for.
    Add {
        /// Login email (unique).
        #[arg(long)]
        email: String,
        /// Display name.
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Delete every expired session row.
    Prune,
}

pub async fn handle_user(
    action: UserAction,
    config: &VermieterConfig,
    db_path: &Path,
) -> anyhow::Result<()> {
    let UserAction::Add { email, name } = action;
    let password = read_password(|key| std::env::var(key).ok())?;

    let pool = open_database(db_path).await?;
    let state = AppState::from_pool(pool.clone(), config);
    let result = state
        .auth
        .create_user(&email, &name, &password)
        .await
        .map(|identity| println!("Created user {} <{}>", identity.id, identity.email));

    pool.close().await;
    Ok(result?)
}

/// Initial password from `VERMIETER_PASSWORD`, or an interactive prompt.
///
/// Never taken as a flag, so it stays out of shell history and `ps`.
fn read_password(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<SecretString> {
    if let Some(password) = env(PASSWORD_ENV).filter(|p| !p.is_empty()) {
        return Ok(SecretString::new(password));
    }
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;
    Ok(SecretString::new(password))
}

pub async fn handle_sessions(
    action: SessionAction,
    config: &VermieterConfig,
    db_path: &Path,
) -> anyhow::Result<()> {
    let pool = open_database(db_path).await?;
    let state = AppState::from_pool(pool.clone(), config);

    let result = match action {
        SessionAction::Prune => state
            .sessions()
            .prune_expired()
            .await
            .map(|removed| println!("Removed {removed} expired session(s).")),
    };

    pool.close().await;
    Ok(result?)
}
