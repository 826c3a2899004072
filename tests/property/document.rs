//! Property-based tests for the task document codec.
//!
//! Uses proptest to verify:
//! 1. Any task list survives encode → decode with order intact.
//! 2. Random bytes never cause a panic in `decode` (returns `Err` gracefully).
//! 3. Extra per-session fields on stored records never reach the output.

use dotasks_proto::codec::{self, CodecError};
use dotasks_proto::task::{Task, TaskDocument, TaskId};
use proptest::prelude::*;

/// Strategy for ids in both the legacy timestamp form and the UUID form.
fn arb_task_id() -> impl Strategy<Value = TaskId> {
    prop_oneof![
        (1_000_000_000_000u64..2_000_000_000_000).prop_map(|n| TaskId::from(n.to_string())),
        any::<u128>().prop_map(|n| TaskId::from(uuid::Uuid::from_u128(n).to_string())),
    ]
}

/// Strategy for a single task with arbitrary text.
fn arb_task() -> impl Strategy<Value = Task> {
    (arb_task_id(), "\\PC{0,100}", 0u32..5).prop_map(|(id, text, status)| Task {
        id,
        text,
        status,
    })
}

proptest! {
    #[test]
    fn document_round_trips(tasks in prop::collection::vec(arb_task(), 0..50)) {
        let doc = TaskDocument::new(tasks);
        let bytes = codec::encode(&doc).unwrap();
        let decoded = codec::decode(&bytes).unwrap();
        prop_assert_eq!(decoded, doc);
    }

    #[test]
    fn decode_random_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = codec::decode(&bytes);
    }

    #[test]
    fn selected_flag_is_dropped(task in arb_task(), selected in any::<bool>()) {
        let json = format!(
            r#"{{"tasks":[{{"id":{},"text":{},"status":{},"selected":{}}}]}}"#,
            serde_json::to_string(&task.id).unwrap(),
            serde_json::to_string(&task.text).unwrap(),
            task.status,
            selected,
        );
        let doc = codec::decode(json.as_bytes()).unwrap();
        prop_assert_eq!(&doc.tasks[0], &task);
        let out = String::from_utf8(codec::encode(&doc).unwrap()).unwrap();
        prop_assert!(!out.contains("\"selected\""));
    }

    #[test]
    fn whitespace_only_is_empty(ws in "[ \t\r\n]{0,16}") {
        prop_assert!(matches!(codec::decode(ws.as_bytes()), Err(CodecError::Empty)));
    }
}
