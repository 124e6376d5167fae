use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Record not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),
    #[error("Remote store error: {0}")]
    Remote(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
