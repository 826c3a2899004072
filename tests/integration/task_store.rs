//! Integration tests for the task list store.
//!
//! Covers the list scenarios end to end: status cycling over custom
//! palettes, capacity, reorder acceptance and rejection, selection-mode
//! deletes and the single edit-focus rule, as seen through snapshots and
//! subscriber events.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use dotasks::tasks::{Change, StoreLimits, TaskError, TaskListStore};
use dotasks_proto::task::{Task, TaskId};
use parking_lot::Mutex;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Creates a store with the default limits holding the given `(id, text,
/// status)` records.
fn make_store(tasks: &[(&str, &str, u32)]) -> TaskListStore {
    make_store_with(StoreLimits::default(), tasks)
}

fn make_store_with(limits: StoreLimits, tasks: &[(&str, &str, u32)]) -> TaskListStore {
    let mut store = TaskListStore::new(limits);
    store.hydrate(
        tasks
            .iter()
            .map(|(id, text, status)| Task::with_fields(*id, *text, *status))
            .collect(),
    );
    store
}

/// Records every change the store reports.
fn record(store: &mut TaskListStore) -> Arc<Mutex<Vec<Change>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    store.subscribe(move |event| sink.lock().push(event.change.clone()));
    log
}

fn ids(store: &TaskListStore) -> Vec<&str> {
    store.tasks().iter().map(|t| t.id.as_str()).collect()
}

fn id(s: &str) -> TaskId {
    TaskId::from(s)
}

// ===========================================================================
// Status
// ===========================================================================

#[test]
fn four_color_palette_cycles_back_to_start() {
    let mut store = make_store_with(StoreLimits::new(50, 100, 4), &[("1", "Buy milk", 0)]);
    for _ in 0..4 {
        store.cycle_status(&id("1")).unwrap();
    }
    assert_eq!(store.tasks()[0], Task::with_fields("1", "Buy milk", 0));
}

#[test]
fn cycling_touches_only_the_target() {
    let mut store = make_store(&[("1", "a", 0), ("2", "b", 3)]);
    store.cycle_status(&id("2")).unwrap();
    assert_eq!(store.tasks()[0].status, 0);
    assert_eq!(store.tasks()[1].status, 4);
}

// ===========================================================================
// Capacity
// ===========================================================================

#[test]
fn add_at_fifty_is_a_noop() {
    let records: Vec<(String, u32)> = (0..50).map(|i| (i.to_string(), 0)).collect();
    let refs: Vec<(&str, &str, u32)> = records.iter().map(|(i, s)| (i.as_str(), "", *s)).collect();
    let mut store = make_store(&refs);
    let log = record(&mut store);

    assert_eq!(store.len(), 50);
    assert!(!store.snapshot().can_add);
    assert!(store.add_task().is_none());
    assert_eq!(store.len(), 50);
    assert!(log.lock().is_empty());
}

#[test]
fn add_until_full_then_delete_reopens() {
    let mut store = TaskListStore::new(StoreLimits::new(3, 100, 5));
    let added: Vec<TaskId> = std::iter::from_fn(|| store.add_task()).collect();
    assert_eq!(added.len(), 3);

    store.enter_selection_mode();
    store.toggle_select(&added[1]).unwrap();
    store.delete_selected();
    assert!(store.can_add());
    assert!(store.add_task().is_some());
}

// ===========================================================================
// Reorder
// ===========================================================================

#[test]
fn reorder_swaps_two_tasks() {
    let mut store = make_store(&[("1", "", 0), ("2", "", 0)]);
    let log = record(&mut store);
    store.reorder(&[id("2"), id("1")]).unwrap();
    assert_eq!(ids(&store), vec!["2", "1"]);
    assert_eq!(*log.lock(), vec![Change::Reordered]);
}

#[test]
fn reorder_with_absent_id_is_rejected() {
    let mut store = make_store(&[("1", "", 0), ("2", "", 0)]);
    let log = record(&mut store);
    let err = store.reorder(&[id("1"), id("3")]).unwrap_err();
    assert!(matches!(err, TaskError::OrderMismatch(_)));
    assert_eq!(ids(&store), vec!["1", "2"]);
    assert!(log.lock().is_empty());
}

#[test]
fn reorder_keeps_task_contents() {
    let mut store = make_store(&[("1", "one", 1), ("2", "two", 2), ("3", "three", 3)]);
    store.reorder(&[id("3"), id("1"), id("2")]).unwrap();
    assert_eq!(
        store.tasks(),
        &[
            Task::with_fields("3", "three", 3),
            Task::with_fields("1", "one", 1),
            Task::with_fields("2", "two", 2),
        ]
    );
}

// ===========================================================================
// Selection and delete
// ===========================================================================

#[test]
fn delete_selected_leaves_no_trace() {
    let mut store = make_store(&[("1", "a", 0), ("2", "b", 0), ("3", "c", 0)]);
    store.enter_selection_mode();
    store.toggle_select(&id("1")).unwrap();
    store.toggle_select(&id("3")).unwrap();
    let removed = store.delete_selected();

    let snapshot = store.snapshot();
    assert!(snapshot.selected.is_empty());
    assert!(!snapshot.selection_mode);
    for gone in &removed {
        assert!(snapshot.position(gone).is_none());
    }
    assert_eq!(ids(&store), vec!["2"]);
}

#[test]
fn delete_emits_one_persisting_change() {
    let mut store = make_store(&[("1", "a", 0), ("2", "b", 0)]);
    store.enter_selection_mode();
    store.toggle_select(&id("2")).unwrap();
    let log = record(&mut store);
    store.delete_selected();
    let changes = log.lock().clone();
    assert_eq!(changes, vec![Change::TasksDeleted(vec![id("2")])]);
    assert!(changes[0].persists());
}

#[test]
fn selection_and_editing_are_exclusive() {
    let mut store = make_store(&[("1", "a", 0)]);
    store.start_editing(&id("1")).unwrap();
    store.enter_selection_mode();
    assert!(store.editing().is_none());
    assert_eq!(
        store.start_editing(&id("1")),
        Err(TaskError::SelectionActive)
    );
    store.exit_selection_mode();
    store.start_editing(&id("1")).unwrap();
    assert!(!store.selection_mode());
}

// ===========================================================================
// Edit focus
// ===========================================================================

#[test]
fn only_one_task_in_edit_focus() {
    let mut store = make_store(&[("a", "", 0), ("b", "", 0)]);
    let log = record(&mut store);
    store.start_editing(&id("a")).unwrap();
    store.start_editing(&id("b")).unwrap();

    let snapshot = store.snapshot();
    assert!(!snapshot.is_editing(&id("a")));
    assert!(snapshot.is_editing(&id("b")));
    assert_eq!(
        *log.lock(),
        vec![
            Change::EditingStarted(id("a")),
            Change::EditingEnded(id("a")),
            Change::EditingStarted(id("b")),
        ]
    );
}

#[test]
fn add_takes_focus_from_current_edit() {
    let mut store = make_store(&[("a", "", 0)]);
    store.start_editing(&id("a")).unwrap();
    let new_id = store.add_task().unwrap();
    assert_eq!(store.editing(), Some(&new_id));
    assert_eq!(store.tasks().last().unwrap().id, new_id);
}

#[test]
fn text_edits_do_not_persist_but_ending_does() {
    let mut store = make_store(&[("a", "", 0)]);
    let log = record(&mut store);
    store.start_editing(&id("a")).unwrap();
    store.set_task_text(&id("a"), "B").unwrap();
    store.set_task_text(&id("a"), "Bu").unwrap();
    store.end_editing();

    let persisting: Vec<Change> = log.lock().iter().filter(|c| c.persists()).cloned().collect();
    assert_eq!(persisting, vec![Change::EditingEnded(id("a"))]);
}

#[test]
fn hydrate_normalizes_stored_records() {
    let store = make_store(&[("1", "a", 9), ("1", "dup", 0), ("2", "b", 5)]);
    assert_eq!(
        store.tasks(),
        &[Task::with_fields("1", "a", 4), Task::with_fields("2", "b", 0)]
    );
}
