use thiserror::Error;

/// Errors produced by the auth core.
///
/// `Validation` and `InvalidCredentials` are expected, user-facing outcomes.
/// `Storage` and `Unexpected` carry details for server-side logs only; the
/// HTTP layer never echoes them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    /// Bad email or password. The message is identical for both cases.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not authenticated")]
    Unauthenticated,

    #[error("current password is incorrect")]
    WrongPassword,

    #[error("email already registered")]
    EmailTaken,

    #[error(transparent)]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{message}")]
    Unexpected { message: String },
}

impl Error {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Whether this error is an expected client-side outcome rather than a
    /// server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidCredentials
                | Self::Unauthenticated
                | Self::WrongPassword
                | Self::EmailTaken
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
