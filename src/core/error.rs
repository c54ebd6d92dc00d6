use thiserror::Error;

#[derive(Error, Debug)]
pub enum BadgeError {
    #[error("Cart store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid anti-forgery token")]
    InvalidNonce,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, BadgeError>;

impl<T> From<std::sync::PoisonError<T>> for BadgeError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for BadgeError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
