#![forbid(unsafe_code)]

//! Errors reported by [`HistoryManager`](crate::HistoryManager).

use std::fmt;

use crate::codec::CodecError;

/// Result alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur while building or driving a history.
///
/// Rejected values are not errors: `push` and `merge` report `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The codec refused the value type when the manager was built.
    UnsupportedType {
        type_name: &'static str,
        reason: CodecError,
    },
    /// Merge requested while the cursor is not at the latest snapshot.
    InvalidOperationAtState { cursor: usize },
    /// Redo requested with no history at all.
    EmptyHistory,
    /// Encoding or decoding a snapshot failed.
    Serialization(CodecError),
    /// The configuration failed validation.
    InvalidConfig(Vec<String>),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { type_name, reason } => {
                write!(f, "type {type_name} is not snapshot-capable: {reason}")
            }
            Self::InvalidOperationAtState { cursor } => write!(
                f,
                "merge requires the latest snapshot to be current (cursor at {cursor})"
            ),
            Self::EmptyHistory => f.write_str("no history to redo"),
            Self::Serialization(e) => write!(f, "snapshot {e}"),
            Self::InvalidConfig(errors) => {
                write!(f, "invalid history config: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnsupportedType { reason, .. } => Some(reason),
            Self::Serialization(e) => Some(e),
            Self::InvalidOperationAtState { .. } | Self::EmptyHistory | Self::InvalidConfig(_) => {
                None
            }
        }
    }
}

impl From<CodecError> for HistoryError {
    fn from(e: CodecError) -> Self {
        Self::Serialization(e)
    }
}
