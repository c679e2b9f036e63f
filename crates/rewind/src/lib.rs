#![forbid(unsafe_code)]

//! Rewind
//!
//! Bounded snapshot history for serializable state. Every change to a live
//! value is recorded as an encoded [`Snapshot`]; a [`HistoryManager`] keeps
//! those snapshots newest first, moves a cursor through them for undo and
//! redo, collapses recent entries with merge, and evicts the oldest entries
//! beyond its capacity.
//!
//! # Key Components
//!
//! - [`HistoryManager`] - Cursor-addressed snapshot history
//! - [`Snapshot`] - Immutable encoded capture with label and timestamp
//! - [`HistoryDescriptor`] - Position of a stored snapshot relative to the cursor
//! - [`SnapshotCodec`] / [`JsonCodec`] - The encode/decode capability a type needs
//! - [`HistoryConfig`] - Retention settings
//!
//! # Quick Start
//!
//! ```
//! use rewind::{HistoryConfig, HistoryManager};
//!
//! let mut history = HistoryManager::<Vec<String>>::with_config(HistoryConfig::new(3))?;
//! let mut clips = vec!["intro".to_string()];
//! history.push(&clips, "Add intro")?;
//!
//! clips.push("outro".to_string());
//! history.push(&clips, "Add outro")?;
//!
//! let previous = history.undo(1)?;
//! assert_eq!(previous, Some(vec!["intro".to_string()]));
//! assert_eq!(history.redo(1)?, clips);
//! # Ok::<(), rewind::HistoryError>(())
//! ```
//!
//! # Isolation
//!
//! Snapshots never reference the caller's value. Each push encodes, and each
//! read ([`current`](HistoryManager::current), [`undo`](HistoryManager::undo),
//! [`redo`](HistoryManager::redo)) decodes a new value owned by the caller.
//!
//! # Concurrency
//!
//! Operations are synchronous and take `&mut self`. Share a manager across
//! threads behind a single lock around the whole push/undo/redo/merge
//! surface.

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod history;
pub mod snapshot;

pub use codec::{CodecError, CodecErrorKind, JsonCodec, SnapshotCodec};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::HistoryConfig;
pub use descriptor::{HistoryDescriptor, Position};
pub use error::{HistoryError, HistoryResult};
pub use history::HistoryManager;
pub use snapshot::Snapshot;
