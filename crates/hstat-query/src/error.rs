use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The index rejected or failed a request.
    #[error("search backend error: {0}")]
    Backend(String),

    /// The index kept returning cursors past the configured page bound.
    #[error("term enumeration exceeded {max_pages} pages")]
    PageLimitExceeded { max_pages: usize },

    #[error("term enumeration needs at least one field")]
    NoFields,

    #[error("refusing to run a search without any filter")]
    EmptyFilter,
}

pub type Result<T> = std::result::Result<T, QueryError>;
