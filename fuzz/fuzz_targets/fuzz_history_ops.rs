#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind::{HistoryConfig, HistoryError, HistoryManager};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(Option<u16>),
    Merge(Option<u16>, u8),
    Undo(u8),
    Redo(u8),
    Trim,
    SetCapacity(u8),
    Clear(Option<u8>),
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let capacity = usize::from(input.capacity).max(1);
    let Ok(mut history) = HistoryManager::<Option<u16>>::with_config(HistoryConfig::new(capacity))
    else {
        return;
    };

    for op in &input.ops {
        let len_before = history.len();
        let cursor_before = history.cursor();

        match op {
            Op::Push(v) => {
                let recorded = history.push(v, "push").unwrap();
                // `None` encodes to null and is never recorded.
                assert_eq!(recorded, v.is_some());
                if recorded {
                    assert_eq!(history.cursor(), Some(0));
                    assert_eq!(history.current().unwrap(), Some(*v));
                } else {
                    assert_eq!(history.len(), len_before);
                    assert_eq!(history.cursor(), cursor_before);
                }
            }
            Op::Merge(v, n) => match history.merge(v, "merge", usize::from(*n)) {
                Ok(true) => assert_eq!(history.current().unwrap(), Some(*v)),
                Ok(false) => assert_eq!(history.len(), len_before),
                Err(HistoryError::InvalidOperationAtState { cursor }) => {
                    assert_eq!(Some(cursor), cursor_before);
                    assert!(cursor > 0);
                    assert_eq!(history.len(), len_before);
                }
                Err(e) => panic!("unexpected merge error: {e}"),
            },
            Op::Undo(steps) => {
                let value = history.undo(usize::from(*steps)).unwrap();
                assert_eq!(value.is_some(), !history.is_empty());
            }
            Op::Redo(steps) => match history.redo(usize::from(*steps)) {
                Ok(_) => assert!(!history.is_empty()),
                Err(HistoryError::EmptyHistory) => assert!(history.is_empty()),
                Err(e) => panic!("unexpected redo error: {e}"),
            },
            Op::Trim => {
                history.trim_future_on_current();
                assert!(!history.can_redo());
            }
            Op::SetCapacity(n) => history.set_capacity(usize::from(*n)),
            Op::Clear(n) => history.clear(n.map(usize::from)),
        }

        // Post-conditions that must always hold:
        assert!(history.len() <= history.capacity(), "capacity exceeded");
        assert_eq!(history.cursor().is_none(), history.is_empty());
        if let Some(c) = history.cursor() {
            assert!(c < history.len(), "cursor OOB");
        }
        assert_eq!(history.describe().len(), history.len());
    }
});
