use thiserror::Error;

/// Failures surfaced by a [`ResultSet`](crate::ResultSet).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("{0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ComposeError>;
