//! Core error taxonomy
//!
//! Every public operation of the platform returns a typed failure from this
//! module. The four domain kinds correspond to the stable machine-readable
//! outcomes callers can branch on; `Storage` carries infrastructure faults
//! (I/O, corrupt objects) with their full context chain.

use thiserror::Error;

/// Typed failure of a core operation
///
/// - `NotFound`: repository, branch, commit, blob, file or pull request absent
/// - `Conflict`: duplicate name, re-fork, double merge, stale head swap
/// - `Forbidden`: permission check failed, protected-branch delete
/// - `Validation`: missing required field, invalid enum value
/// - `Storage`: underlying persistence fault, never a domain outcome
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Error::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Stable machine-readable kind, independent of the human message
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Forbidden(_) => "forbidden",
            Error::Validation(_) => "validation",
            Error::Storage(_) => "storage",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable_across_messages() {
        assert_eq!(Error::not_found("branch x").kind(), "not_found");
        assert_eq!(Error::not_found("commit y").kind(), "not_found");
        assert_eq!(Error::conflict("dup").kind(), "conflict");
        assert_eq!(Error::forbidden("nope").kind(), "forbidden");
        assert_eq!(Error::validation("empty").kind(), "validation");
    }

    #[test]
    fn test_storage_preserves_context_chain() {
        let err: Error = anyhow::anyhow!("root cause")
            .context("while reading object")
            .into();
        assert_eq!(err.kind(), "storage");
        assert!(err.to_string().contains("while reading object"));
    }
}
