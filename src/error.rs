use thiserror::Error;

/// Errors intrinsic to the branch-stack domain.
///
/// Storage and transport failures are carried separately (as `anyhow` errors
/// or [`crate::client::ClientError`]); these are the cases a caller can fix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StackError {
    /// The caller supplied input that violates an operation's contract,
    /// e.g. duplicate identifiers passed to a reorder.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),
}

impl StackError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
