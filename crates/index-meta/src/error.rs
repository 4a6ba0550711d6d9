use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetaError>;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No index definition registered for entity type: {0}")]
    UnknownEntityType(String),

    #[error("Duplicate index definition for entity type: {0}")]
    DuplicateDefinition(String),
}
