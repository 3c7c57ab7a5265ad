use thiserror::Error;

/// Errors raised while building or starting the throttler.
///
/// The request path never fails: a denied request is a normal
/// [`Decision`](crate::algorithms::Decision), not an error.
#[derive(Debug, Error)]
pub enum ThrottlerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<envconfig::Error> for ThrottlerError {
    fn from(err: envconfig::Error) -> Self {
        ThrottlerError::Config(err.to_string())
    }
}

pub type ThrottlerResult<T> = Result<T, ThrottlerError>;
