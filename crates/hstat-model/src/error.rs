use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid filter JSON: {0}")]
    FilterJson(#[from] serde_json::Error),
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
