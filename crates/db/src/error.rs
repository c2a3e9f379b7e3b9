use diesel::result::DatabaseErrorKind;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong when reading or writing voting state.
///
/// Storage-specific errors are folded into these variants so that callers
/// never have to look at diesel or SQLite error codes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    /// A concurrent write collided with this one. The operation can be
    /// retried.
    #[error("conflicting concurrent write")]
    Conflict,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict)
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Error::NotFound,
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::SerializationFailure,
                _,
            ) => Error::Conflict,
            diesel::result::Error::DatabaseError(_, ref info)
                if is_busy(info.message()) =>
            {
                Error::Conflict
            }
            other => Error::Storage(Box::new(other)),
        }
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::Storage(Box::new(err))
    }
}

/// SQLite reports lock contention only through the message text.
fn is_busy(message: &str) -> bool {
    message.contains("database is locked")
        || message.contains("database is busy")
}
