#![forbid(unsafe_code)]

//! Snapshot codecs.
//!
//! A [`SnapshotCodec`] is the capability that lets a value type live inside a
//! [`HistoryManager`](crate::HistoryManager): it turns a value into an owned
//! byte payload and back. Decoding always builds a brand new value, so a
//! materialized snapshot never aliases the stored one or the caller's live
//! object.
//!
//! [`JsonCodec`] covers every `T: Serialize + DeserializeOwned` through
//! `serde_json`. Types without those impls cannot instantiate a default
//! history at all. Custom codecs can additionally refuse a type at run time
//! through [`SnapshotCodec::check_supported`], which the manager probes
//! once during construction.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Which side of the codec failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecErrorKind {
    /// The value could not be encoded.
    Encode,
    /// The payload could not be decoded.
    Decode,
    /// The codec does not support the value type at all.
    Unsupported,
}

impl fmt::Display for CodecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => f.write_str("encode"),
            Self::Decode => f.write_str("decode"),
            Self::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// Error produced by a [`SnapshotCodec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    kind: CodecErrorKind,
    message: String,
}

impl CodecError {
    /// Create an error of the given kind.
    #[must_use]
    pub fn new(kind: CodecErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Encoding failed.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::new(CodecErrorKind::Encode, message)
    }

    /// Decoding failed.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(CodecErrorKind::Decode, message)
    }

    /// The value type is not supported by the codec.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(CodecErrorKind::Unsupported, message)
    }

    #[must_use]
    pub fn kind(&self) -> CodecErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for CodecError {}

/// Encode/decode pair that gives a value type snapshot support.
///
/// Implementations must satisfy `decode(encode(v)) == v` for every accepted
/// value, and every `decode` call must return an independently owned value.
pub trait SnapshotCodec<T> {
    /// Encode `value` into an owned payload.
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode a fresh value from `payload`.
    fn decode(&self, payload: &[u8]) -> Result<T, CodecError>;

    /// Whether an encoded payload represents an acceptable value.
    ///
    /// Payloads rejected here are not recorded; push and merge report
    /// `false` instead.
    fn accepts(&self, payload: &[u8]) -> bool {
        let _ = payload;
        true
    }

    /// Probe whether this codec can handle `T` at all.
    ///
    /// Called once when a history manager is built.
    fn check_supported(&self) -> Result<(), CodecError> {
        Ok(())
    }
}

/// JSON codec backed by `serde_json`.
///
/// A value that encodes to `null` (`None`, `()`, unit structs) carries no
/// state worth recording and is rejected by [`SnapshotCodec::accepts`].
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonCodec<{}>", type_name::<T>())
    }
}

impl<T> SnapshotCodec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::encode(e.to_string()))
    }

    fn decode(&self, payload: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(payload).map_err(|e| CodecError::decode(e.to_string()))
    }

    fn accepts(&self, payload: &[u8]) -> bool {
        payload != b"null"
    }
}
