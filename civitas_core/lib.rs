use thiserror::Error;

pub mod app_error;
pub mod game_error;
pub mod mapping_error;

pub use app_error::AppError;
pub use game_error::GameError;
pub use mapping_error::MappingError;

pub type Result<T, E = ApplicationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for ApplicationError {
    fn from(err: anyhow::Error) -> Self {
        ApplicationError::Unknown(err.to_string())
    }
}
