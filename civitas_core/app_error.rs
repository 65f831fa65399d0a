use thiserror::Error;

/// Errors for app logic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid catalog definition: {0}")]
    InvalidCatalog(String),
}
