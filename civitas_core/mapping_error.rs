use thiserror::Error;

/// Errors raised while decoding wire records. Decoding never mutates anything,
/// so these are always safe to recover from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Expected {expected} tokens, got {actual}")]
    TokenCount { expected: usize, actual: usize },

    #[error("Invalid {field} token: {token:?}")]
    InvalidToken { field: &'static str, token: String },

    #[error("Unknown building type token: {0:?}")]
    UnknownBuildingType(String),
}
