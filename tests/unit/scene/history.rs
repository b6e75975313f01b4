use super::*;

#[test]
fn starts_before_any_entry() {
    let mut h: History<Vec<u32>> = History::new();
    assert_eq!(h.cursor(), None);
    assert!(h.is_empty());
    assert!(h.undo().is_none());
    assert!(h.redo().is_none());
    assert!(!h.can_undo());
    assert!(!h.can_redo());
}

#[test]
fn undo_and_redo_walk_the_log() {
    let mut h = History::new();
    let mut state: Vec<u32> = Vec::new();
    h.record(&state);
    for i in 1..=3 {
        state.push(i);
        h.record(&state);
    }
    assert_eq!(h.len(), 4);
    assert_eq!(h.cursor(), Some(3));

    assert_eq!(h.undo(), Some(vec![1, 2]));
    assert_eq!(h.undo(), Some(vec![1]));
    assert_eq!(h.undo(), Some(vec![]));
    assert_eq!(h.undo(), None);
    assert_eq!(h.cursor(), Some(0));

    assert_eq!(h.redo(), Some(vec![1]));
    assert_eq!(h.redo(), Some(vec![1, 2]));
    assert_eq!(h.redo(), Some(vec![1, 2, 3]));
    assert_eq!(h.redo(), None);
    assert_eq!(h.current(), Some(&vec![1, 2, 3]));
}

#[test]
fn record_after_undo_discards_redo_branch() {
    let mut h = History::new();
    h.record(&vec![0u32]);
    h.record(&vec![0, 1]);
    h.record(&vec![0, 1, 2]);
    h.undo();
    h.undo();
    assert!(h.can_redo());

    h.record(&vec![0, 9]);
    assert!(!h.can_redo());
    assert_eq!(h.len(), 2);
    assert_eq!(h.redo(), None);
    assert_eq!(h.undo(), Some(vec![0]));
}

#[test]
fn stored_entries_are_independent_copies() {
    let mut h = History::new();
    let mut state = vec![String::from("a")];
    h.record(&state);
    state[0].push('!');
    h.record(&state);
    assert_eq!(h.undo(), Some(vec![String::from("a")]));
}
