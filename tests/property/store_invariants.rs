//! Property-based tests for task list store invariants.
//!
//! Uses proptest to verify:
//! 1. Any sequence of operations keeps ids unique, statuses inside the
//!    palette, the list within capacity and at most one task in edit focus.
//! 2. Cycling a task palette-size times restores its status.
//! 3. Hydrating from a saved document reproduces the list exactly.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;

use dotasks::tasks::{StoreLimits, TaskListStore};
use dotasks_proto::codec;
use dotasks_proto::task::{Task, TaskId};
use proptest::prelude::*;

/// A store operation; task arguments are positions modulo the list length.
#[derive(Debug, Clone)]
enum Op {
    Add,
    SetText(usize, String),
    Cycle(usize),
    ToggleMode,
    ToggleSelect(usize),
    DeleteSelected,
    StartEditing(usize),
    EndEditing,
    Rotate(usize),
    Unknown,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        2 => (any::<usize>(), "\\PC{0,120}").prop_map(|(i, t)| Op::SetText(i, t)),
        3 => any::<usize>().prop_map(Op::Cycle),
        1 => Just(Op::ToggleMode),
        2 => any::<usize>().prop_map(Op::ToggleSelect),
        1 => Just(Op::DeleteSelected),
        2 => any::<usize>().prop_map(Op::StartEditing),
        1 => Just(Op::EndEditing),
        1 => any::<usize>().prop_map(Op::Rotate),
        1 => Just(Op::Unknown),
    ]
}

fn arb_task() -> impl Strategy<Value = Task> {
    ("[0-9a-f]{1,12}", "\\PC{0,100}", 0u32..5).prop_map(|(id, text, status)| Task {
        id: TaskId::from(id),
        text,
        status,
    })
}

fn pick(store: &TaskListStore, i: usize) -> Option<TaskId> {
    if store.is_empty() {
        None
    } else {
        Some(store.tasks()[i % store.len()].id.clone())
    }
}

fn apply(store: &mut TaskListStore, op: Op) {
    match op {
        Op::Add => {
            store.add_task();
        }
        Op::SetText(i, text) => {
            if let Some(id) = pick(store, i) {
                store.set_task_text(&id, &text).unwrap();
            }
        }
        Op::Cycle(i) => {
            if let Some(id) = pick(store, i) {
                store.cycle_status(&id).unwrap();
            }
        }
        Op::ToggleMode => {
            store.toggle_selection_mode();
        }
        Op::ToggleSelect(i) => {
            if let Some(id) = pick(store, i) {
                let _ = store.toggle_select(&id);
            }
        }
        Op::DeleteSelected => {
            store.delete_selected();
        }
        Op::StartEditing(i) => {
            if let Some(id) = pick(store, i) {
                let _ = store.start_editing(&id);
            }
        }
        Op::EndEditing => {
            store.end_editing();
        }
        Op::Rotate(n) => {
            let mut order: Vec<TaskId> = store.tasks().iter().map(|t| t.id.clone()).collect();
            if !order.is_empty() {
                let k = n % order.len();
                order.rotate_left(k);
            }
            store.reorder(&order).unwrap();
        }
        Op::Unknown => {
            let ghost = TaskId::from("no-such-task");
            let before = store.snapshot();
            assert!(store.cycle_status(&ghost).is_err());
            assert!(store.set_task_text(&ghost, "x").is_err());
            assert_eq!(store.snapshot(), before);
        }
    }
}

fn check_invariants(store: &TaskListStore, limits: StoreLimits) -> Result<(), TestCaseError> {
    let snapshot = store.snapshot();
    let ids: HashSet<&TaskId> = snapshot.tasks.iter().map(|t| &t.id).collect();
    prop_assert_eq!(ids.len(), snapshot.tasks.len(), "duplicate ids");
    prop_assert!(snapshot.tasks.len() <= limits.max_tasks());
    for task in &snapshot.tasks {
        prop_assert!(task.status < limits.palette_size());
        prop_assert!(task.text.chars().count() <= limits.max_text_chars());
    }
    for id in &snapshot.selected {
        prop_assert!(ids.contains(id), "selected id not in list");
    }
    if let Some(editing) = &snapshot.editing {
        prop_assert!(ids.contains(editing), "edit focus on missing task");
        prop_assert!(!snapshot.selection_mode, "editing during selection mode");
    }
    if !snapshot.selection_mode {
        prop_assert!(snapshot.selected.is_empty());
    }
    Ok(())
}

proptest! {
    #[test]
    fn operations_preserve_invariants(
        max_tasks in 1usize..12,
        palette in 1u32..8,
        ops in prop::collection::vec(arb_op(), 0..120),
    ) {
        let limits = StoreLimits::new(max_tasks, 100, palette);
        let mut store = TaskListStore::new(limits);
        for op in ops {
            apply(&mut store, op);
            check_invariants(&store, limits)?;
        }
    }

    #[test]
    fn cycling_palette_size_times_is_identity(
        palette in 1u32..10,
        start in 0u32..10,
    ) {
        let mut store = TaskListStore::new(StoreLimits::new(50, 100, palette));
        store.hydrate(vec![Task::with_fields("1", "x", start)]);
        let original = store.tasks()[0].status;
        for _ in 0..palette {
            store.cycle_status(&TaskId::from("1")).unwrap();
        }
        prop_assert_eq!(store.tasks()[0].status, original);
    }

    #[test]
    fn hydrate_from_saved_document_round_trips(
        tasks in prop::collection::vec(arb_task(), 0..50),
        selected in prop::collection::vec(any::<usize>(), 0..5),
    ) {
        let mut store = TaskListStore::default();
        store.hydrate(tasks);
        store.enter_selection_mode();
        for i in selected {
            if let Some(id) = pick(&store, i) {
                let _ = store.toggle_select(&id);
            }
        }

        let bytes = codec::encode(&store.snapshot().to_document()).unwrap();
        let mut reloaded = TaskListStore::default();
        reloaded.hydrate(codec::decode(&bytes).unwrap().tasks);

        prop_assert_eq!(reloaded.tasks(), store.tasks());
        prop_assert!(reloaded.selected().is_empty());
        prop_assert!(!reloaded.selection_mode());
    }
}
