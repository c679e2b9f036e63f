#![forbid(unsafe_code)]

//! Immutable encoded captures of a value.
//!
//! A [`Snapshot`] owns the payload produced by a [`SnapshotCodec`] together
//! with a label and its creation time. It never holds a reference to the
//! value it was captured from, and it offers no way to mutate the payload.
//! Every [`materialize`](Snapshot::materialize) call decodes a new value.

use std::fmt;
use std::marker::PhantomData;

use web_time::SystemTime;

use crate::codec::{CodecError, SnapshotCodec};

/// An encoded capture of a `T` at one point in time.
pub struct Snapshot<T> {
    payload: Box<[u8]>,
    label: String,
    created_at: SystemTime,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Snapshot<T> {
    /// Encode `value` with `codec` into a new snapshot.
    pub fn capture<C>(codec: &C, value: &T, label: impl Into<String>) -> Result<Self, CodecError>
    where
        C: SnapshotCodec<T> + ?Sized,
    {
        let payload = codec.encode(value)?;
        Ok(Self::from_payload(payload, label))
    }

    /// Wrap an already-encoded payload.
    pub(crate) fn from_payload(payload: Vec<u8>, label: impl Into<String>) -> Self {
        Self {
            payload: payload.into_boxed_slice(),
            label: label.into(),
            created_at: SystemTime::now(),
            _marker: PhantomData,
        }
    }

    /// Decode a fresh, caller-owned value from this snapshot.
    pub fn materialize<C>(&self, codec: &C) -> Result<T, CodecError>
    where
        C: SnapshotCodec<T> + ?Sized,
    {
        codec.decode(&self.payload)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wall-clock time the snapshot was captured.
    #[must_use]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// The encoded payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Bytes retained by this snapshot (payload plus label).
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.payload.len() + self.label.len()
    }
}

impl<T> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("label", &self.label)
            .field("payload_len", &self.payload.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}
