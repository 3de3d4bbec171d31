use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown game/group/user/booking
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate membership, game already full, already friends/pending
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Non-creator/non-owner attempting a privileged action, non-friend messaging
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing/malformed fields, rating out of range, self-rating
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Check if error is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    /// Check if error is a forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AppError::Forbidden(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Conflict(_) => 409,
            AppError::Forbidden(_) => 403,
            AppError::Validation(_) => 400,
            _ => 500,
        }
    }
}

/// Store-collaborator error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record with the same key already exists
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// The record to update/delete does not exist
    #[error("Record not found: {0}")]
    Missing(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => AppError::Conflict(msg),
            StoreError::Missing(msg) => AppError::NotFound(msg),
        }
    }
}

/// Convenience function to convert Option<T> to Result<T, AppError>
pub fn option_to_result<T>(opt: Option<T>, error_msg: &str) -> AppResult<T> {
    opt.ok_or_else(|| AppError::NotFound(error_msg.to_string()))
}
