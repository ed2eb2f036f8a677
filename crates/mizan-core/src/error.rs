use thiserror::Error;

/// Failures surfaced to API callers. Request handlers flatten these into a
/// message string; internal plumbing uses `anyhow` and converts at the edge.
#[derive(Debug, Error)]
pub enum AssessError {
    #[error("Authentication required")]
    Authentication,

    #[error("Invalid assessment data: {0}")]
    MalformedInput(String),

    #[error("{0}")]
    Persistence(String),

    #[error("Not found")]
    NotFound,

    #[error("Admin access required")]
    Forbidden,
}

impl AssessError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Wrap a store failure, keeping the full context chain in the message.
    pub fn persistence(err: anyhow::Error) -> Self {
        Self::Persistence(format!("{err:#}"))
    }
}

pub type AssessResult<T> = std::result::Result<T, AssessError>;
