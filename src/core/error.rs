use thiserror::Error;

/// Message shown to the operator when an error carries no readable detail.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Record '{0}' not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl AdminError {
    /// Human-readable message suitable for a notification toast.
    ///
    /// Server errors surface the backend's `detail` text verbatim; everything
    /// else falls back to the display form.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Api { detail, .. } if !detail.trim().is_empty() => detail.clone(),
            AdminError::Api { .. } | AdminError::Transport(_) | AdminError::LockError(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
            AdminError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status for server-reported errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

impl<T> From<std::sync::PoisonError<T>> for AdminError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AdminError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
