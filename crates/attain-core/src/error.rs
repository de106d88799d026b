use thiserror::Error;

/// Error kinds surfaced by the store and input boundary.
///
/// `Validation` and `Referential` are operator-recoverable: the offending
/// input is rejected and previously committed state is untouched. `Store`
/// aborts the current operation only.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("referential: {0}")]
    Referential(String),

    #[error("store: {0}")]
    Store(#[from] rusqlite::Error),
}

impl MatrixError {
    pub fn validation(msg: impl Into<String>) -> Self {
        MatrixError::Validation(msg.into())
    }

    pub fn referential(msg: impl Into<String>) -> Self {
        MatrixError::Referential(msg.into())
    }

    /// True for errors the input boundary reports and retries rather than
    /// aborting the operation.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MatrixError::Validation(_) | MatrixError::Referential(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;
