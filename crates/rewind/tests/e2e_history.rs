#![forbid(unsafe_code)]

//! End-to-end tests for snapshot history over structured state.
//!
//! Validates:
//! - 100 sequential edits with full undo and full redo
//! - Deterministic random undo/redo/push interleaving against a model
//! - Remove + add collapsed into a single "move" entry via merge
//! - Retention window behavior with a small capacity
//! - Snapshot isolation from the live value
//! - JSONL structured logging for each operation

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rewind::{HistoryConfig, HistoryError, HistoryManager, Position};
use serde::{Deserialize, Serialize};
use web_time::Instant;

// ============================================================================
// JSONL log entry
// ============================================================================

#[derive(Debug, Serialize)]
struct LogEntry {
    event: &'static str,
    operation: &'static str,
    step: u32,
    snapshot_count: u32,
    cursor: Option<usize>,
    state_hash: String,
    expected_hash: String,
    #[serde(rename = "match")]
    is_match: bool,
    op_time_ns: u64,
}

fn hash_state<T: Hash>(state: &T) -> String {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn assert_jsonl_parseable(entries: &[LogEntry]) {
    for entry in entries {
        let json = serde_json::to_string(entry).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["event"], entry.event);
    }
}

// ============================================================================
// Editor state model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct EditorState {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
    metadata: BTreeMap<String, String>,
}

impl EditorState {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            cursor_line: 0,
            cursor_col: 0,
            metadata: BTreeMap::new(),
        }
    }

    fn insert_line(&mut self, idx: usize, text: String) {
        let pos = idx.min(self.lines.len());
        self.lines.insert(pos, text);
        self.cursor_line = pos;
        self.cursor_col = 0;
    }

    fn delete_line(&mut self, idx: usize) {
        if !self.lines.is_empty() {
            let pos = idx.min(self.lines.len() - 1);
            self.lines.remove(pos);
            self.cursor_line = self.cursor_line.min(self.lines.len().saturating_sub(1));
        }
    }

    fn append_to_line(&mut self, idx: usize, text: &str) {
        if self.lines.is_empty() {
            return;
        }
        let pos = idx.min(self.lines.len() - 1);
        self.lines[pos].push_str(text);
        self.cursor_col = self.lines[pos].len();
    }

    fn set_metadata(&mut self, key: String, value: String) {
        self.metadata.insert(key, value);
    }
}

// ============================================================================
// Timeline state model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Clip {
    id: u32,
    name: String,
    start: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct TimelineState {
    tracks: Vec<Vec<Clip>>,
    selected: Option<u32>,
}

impl TimelineState {
    fn with_tracks(n: usize) -> Self {
        Self {
            tracks: vec![Vec::new(); n],
            selected: None,
        }
    }

    fn add(&mut self, track: usize, clip: Clip) {
        self.tracks[track].push(clip);
    }

    fn remove(&mut self, track: usize, id: u32) -> Option<Clip> {
        let pos = self.tracks[track].iter().position(|c| c.id == id)?;
        Some(self.tracks[track].remove(pos))
    }
}

// ============================================================================
// Test 1: Editor — 100 edits, full undo, full redo
// ============================================================================

#[test]
fn e2e_editor_100_edits_undo_redo() {
    let mut state = EditorState::new();
    let mut history = HistoryManager::with_config(HistoryConfig::new(200)).unwrap();
    let mut expected_hashes = Vec::new();
    let mut log_entries = Vec::new();

    assert!(history.push(&state, "open").unwrap());
    expected_hashes.push(hash_state(&state));

    for i in 0..100u32 {
        let start = Instant::now();

        match i % 4 {
            0 => state.insert_line(i as usize, format!("Line {i}: content")),
            1 => state.append_to_line(i as usize, &format!(" appended_{i}")),
            2 => state.set_metadata(format!("key_{i}"), format!("val_{i}")),
            3 => {
                if !state.lines.is_empty() {
                    state.delete_line(i as usize % state.lines.len())
                }
            }
            _ => unreachable!(),
        }

        history.push(&state, format!("edit {i}")).unwrap();
        let state_hash = hash_state(&state);
        expected_hashes.push(state_hash.clone());

        log_entries.push(LogEntry {
            event: "snapshot_undo_redo",
            operation: "edit",
            step: i,
            snapshot_count: history.len() as u32,
            cursor: history.cursor(),
            state_hash: state_hash.clone(),
            expected_hash: state_hash,
            is_match: true,
            op_time_ns: start.elapsed().as_nanos() as u64,
        });
    }

    for i in (0..100u32).rev() {
        let start = Instant::now();
        let restored = history.undo(1).unwrap().expect("history is not empty");
        let elapsed = start.elapsed().as_nanos() as u64;

        let state_hash = hash_state(&restored);
        let expected = &expected_hashes[i as usize];
        let is_match = &state_hash == expected;

        log_entries.push(LogEntry {
            event: "snapshot_undo_redo",
            operation: "undo",
            step: i,
            snapshot_count: history.len() as u32,
            cursor: history.cursor(),
            state_hash,
            expected_hash: expected.clone(),
            is_match,
            op_time_ns: elapsed,
        });

        assert!(is_match, "undo step {i}: state hash mismatch");
    }

    assert!(!history.can_undo());
    assert_eq!(history.current_label(), Some("open"));

    for i in 1..=100u32 {
        let start = Instant::now();
        let restored = history.redo(1).unwrap();
        let elapsed = start.elapsed().as_nanos() as u64;

        let state_hash = hash_state(&restored);
        let expected = &expected_hashes[i as usize];
        let is_match = &state_hash == expected;

        log_entries.push(LogEntry {
            event: "snapshot_undo_redo",
            operation: "redo",
            step: i,
            snapshot_count: history.len() as u32,
            cursor: history.cursor(),
            state_hash,
            expected_hash: expected.clone(),
            is_match,
            op_time_ns: elapsed,
        });

        assert!(is_match, "redo step {i}: state hash mismatch");
    }

    assert_eq!(history.current().unwrap(), Some(state));
    assert_jsonl_parseable(&log_entries);
    assert!(log_entries.iter().all(|e| e.is_match));
}

// ============================================================================
// Test 2: Random interleaving against a reference model
// ============================================================================

/// Plain newest-first reference of what the history should hold.
struct Model {
    values: Vec<EditorState>,
    cursor: Option<usize>,
    capacity: usize,
}

impl Model {
    fn push(&mut self, v: EditorState) {
        if let Some(c) = self.cursor {
            self.values.drain(..c);
        }
        self.values.insert(0, v);
        self.values.truncate(self.capacity);
        self.cursor = Some(0);
    }

    fn undo(&mut self) {
        if let Some(c) = self.cursor {
            if c + 1 < self.values.len() {
                self.cursor = Some(c + 1);
            }
        }
    }

    fn redo(&mut self) {
        if let Some(c) = self.cursor {
            self.cursor = Some(c.saturating_sub(1));
        }
    }

    fn current(&self) -> Option<&EditorState> {
        self.cursor.map(|c| &self.values[c])
    }
}

#[test]
fn e2e_random_interleaving_matches_model() {
    let capacity = 12;
    let mut state = EditorState::new();
    let mut history = HistoryManager::with_config(HistoryConfig::new(capacity)).unwrap();
    let mut model = Model {
        values: Vec::new(),
        cursor: None,
        capacity,
    };
    let mut log_entries = Vec::new();

    // Deterministic "random" interleaving using simple LCG
    let mut rng_state: u64 = 12345;

    for step in 0..400u32 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let start = Instant::now();

        let operation = match (rng_state >> 33) % 5 {
            0 | 1 => {
                if let Some(restored) = history.current().unwrap() {
                    state = restored;
                }
                state.insert_line(step as usize, format!("step {step}"));
                history.push(&state, format!("step {step}")).unwrap();
                model.push(state.clone());
                "push"
            }
            2 | 3 => {
                history.undo(1).unwrap();
                model.undo();
                "undo"
            }
            _ => {
                match history.redo(1) {
                    Ok(_) => {}
                    Err(HistoryError::EmptyHistory) => assert!(model.cursor.is_none()),
                    Err(e) => panic!("unexpected redo error: {e}"),
                }
                model.redo();
                "redo"
            }
        };

        let actual = history.current().unwrap();
        let expected = model.current().cloned();
        let is_match = actual == expected;

        log_entries.push(LogEntry {
            event: "snapshot_interleave",
            operation,
            step,
            snapshot_count: history.len() as u32,
            cursor: history.cursor(),
            state_hash: hash_state(&actual),
            expected_hash: hash_state(&expected),
            is_match,
            op_time_ns: start.elapsed().as_nanos() as u64,
        });

        assert!(is_match, "{operation} at step {step} diverged from model");
        assert_eq!(history.cursor(), model.cursor);
        assert_eq!(history.len(), model.values.len());
    }

    assert_jsonl_parseable(&log_entries);
}

// ============================================================================
// Test 3: Remove + add collapsed into one "move" entry
// ============================================================================

#[test]
fn e2e_timeline_move_is_single_entry() {
    let mut timeline = TimelineState::with_tracks(2);
    let mut history = HistoryManager::new();

    timeline.add(
        0,
        Clip {
            id: 1,
            name: "intro".into(),
            start: 0,
        },
    );
    history.push(&timeline, "Add intro").unwrap();
    let before_move = timeline.clone();

    // A drag records a remove and then an add...
    let mut clip = timeline.remove(0, 1).unwrap();
    history.push(&timeline, "Remove intro").unwrap();
    clip.start = 48_000;
    timeline.add(1, clip);
    history.push(&timeline, "Add intro").unwrap();

    // ...which the caller collapses into a single move.
    assert!(history.merge(&timeline, "Move intro", 2).unwrap());

    assert_eq!(history.labels(), vec!["Move intro", "Add intro"]);
    assert_eq!(history.current().unwrap(), Some(timeline.clone()));
    assert_eq!(history.undo(1).unwrap(), Some(before_move));
    assert_eq!(history.redo(1).unwrap(), timeline);
}

#[test]
fn e2e_merge_refused_while_viewing_history() {
    let mut timeline = TimelineState::with_tracks(1);
    let mut history = HistoryManager::new();

    for id in 0..3 {
        timeline.add(
            0,
            Clip {
                id,
                name: format!("clip {id}"),
                start: u64::from(id) * 100,
            },
        );
        history.push(&timeline, format!("Add clip {id}")).unwrap();
    }
    history.undo(1).unwrap();

    let err = history.merge(&timeline, "Move", 2).unwrap_err();
    assert_eq!(err, HistoryError::InvalidOperationAtState { cursor: 1 });
    assert_eq!(history.len(), 3);
    assert_eq!(history.cursor(), Some(1));
    assert_eq!(history.current_label(), Some("Add clip 1"));
}

// ============================================================================
// Test 4: Retention window with capacity 3
// ============================================================================

#[test]
fn e2e_capacity_three_window() {
    let mut history = HistoryManager::with_config(HistoryConfig::new(3)).unwrap();
    for (v, label) in [("v1", "a"), ("v2", "b"), ("v3", "c"), ("v4", "d")] {
        assert!(history.push(&v.to_string(), label).unwrap());
    }

    assert_eq!(history.labels(), vec!["d", "c", "b"]);
    assert_eq!(history.current().unwrap().as_deref(), Some("v4"));
    assert_eq!(history.undo(1).unwrap().as_deref(), Some("v3"));
    assert_eq!(history.undo(1).unwrap().as_deref(), Some("v2"));
    assert!(!history.can_undo());
    assert_eq!(history.redo(1).unwrap(), "v3");

    let positions: Vec<Position> = history.describe().iter().map(|d| d.position()).collect();
    assert_eq!(
        positions,
        vec![Position::Past, Position::Current, Position::Future]
    );
}

// ============================================================================
// Test 5: Snapshot isolation
// ============================================================================

#[test]
fn e2e_live_value_mutation_is_isolated() {
    let mut timeline = TimelineState::with_tracks(1);
    let mut history = HistoryManager::new();

    history.push(&timeline, "Empty").unwrap();
    timeline.add(
        0,
        Clip {
            id: 7,
            name: "b-roll".into(),
            start: 10,
        },
    );
    timeline.selected = Some(7);

    let stored = history.current().unwrap().unwrap();
    assert!(stored.tracks[0].is_empty());
    assert_eq!(stored.selected, None);

    let mut first = history.current().unwrap().unwrap();
    first.tracks[0].push(Clip {
        id: 9,
        name: "scratch".into(),
        start: 0,
    });
    let second = history.current().unwrap().unwrap();
    assert_eq!(second, TimelineState::with_tracks(1));
}
