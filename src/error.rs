use thiserror::Error;

/// Errors raised by the timeline core.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("{0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid period: {0}")]
    InvalidPeriod(String),
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("category '{0}' would become its own ancestor")]
    CircularParent(String),
    #[error("{0}")]
    TimeOutOfRangeLeft(String),
    #[error("{0}")]
    TimeOutOfRangeRight(String),
    #[error("name must not be empty")]
    InvalidName,
}

impl From<std::io::Error> for TimelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TimelineError>;
