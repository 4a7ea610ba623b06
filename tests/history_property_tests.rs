// history_property_tests.rs - 取り消し・やり直しの性質テスト

use mfatext::{DocumentBuffer, Edit};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum EditSeed {
    Insert { at: usize, text: String },
    Delete { at: usize, len: usize },
    Replace { at: usize, len: usize, text: String },
}

fn edit_seed() -> impl Strategy<Value = EditSeed> {
    prop_oneof![
        (any::<usize>(), "[a-zé あ\n]{1,6}").prop_map(|(at, text)| EditSeed::Insert { at, text }),
        (any::<usize>(), 1usize..5).prop_map(|(at, len)| EditSeed::Delete { at, len }),
        (any::<usize>(), 0usize..4, "[A-Z]{0,4}")
            .prop_map(|(at, len, text)| EditSeed::Replace { at, len, text }),
    ]
}

/// 現在の内容に収まる編集へ変換（空のバッファへの削除は挿入にする）
fn concretize(seed: &EditSeed, len: usize) -> Edit {
    match seed {
        EditSeed::Insert { at, text } => Edit::insert(at % (len + 1), text.clone()),
        EditSeed::Delete { at, len: count } => {
            if len == 0 {
                return Edit::insert(0, "x");
            }
            let start = at % len;
            Edit::delete(start, (start + count).min(len))
        }
        EditSeed::Replace { at, len: count, text } => {
            let start = at % (len + 1);
            Edit::replace(start, (start + count).min(len), text.clone())
        }
    }
}

fn apply_all(buffer: &mut DocumentBuffer, seeds: &[EditSeed]) -> usize {
    let mut applied = 0;
    for seed in seeds {
        let edit = concretize(seed, buffer.len_chars());
        let before = buffer.revision();
        buffer.apply_edit(edit).expect("edit within bounds");
        if buffer.revision() != before {
            applied += 1;
        }
    }
    applied
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn undo_restores_initial_content(
        initial in "[a-z ]{0,12}",
        seeds in prop::collection::vec(edit_seed(), 1..12),
    ) {
        let mut buffer = DocumentBuffer::from_str(&initial);
        let applied = apply_all(&mut buffer, &seeds);

        for _ in 0..applied {
            prop_assert!(buffer.undo().unwrap());
        }
        prop_assert_eq!(buffer.content(), initial.as_str());
        prop_assert!(!buffer.can_undo());
        prop_assert!(!buffer.is_modified());
    }

    #[test]
    fn redo_after_undo_restores_undone_content(
        initial in "[a-z ]{0,12}",
        seeds in prop::collection::vec(edit_seed(), 1..12),
        undo_count in 1usize..12,
    ) {
        let mut buffer = DocumentBuffer::from_str(&initial);
        let applied = apply_all(&mut buffer, &seeds);
        let edited = buffer.content().to_string();

        let undone = undo_count.min(applied);
        for _ in 0..undone {
            buffer.undo().unwrap();
        }
        for _ in 0..undone {
            prop_assert!(buffer.redo().unwrap());
        }
        prop_assert_eq!(buffer.content(), edited.as_str());
        prop_assert!(!buffer.can_redo());
    }

    #[test]
    fn edit_after_undo_clears_redo(
        initial in "[a-z ]{1,12}",
        seeds in prop::collection::vec(edit_seed(), 1..8),
        next in edit_seed(),
    ) {
        let mut buffer = DocumentBuffer::from_str(&initial);
        let applied = apply_all(&mut buffer, &seeds);
        prop_assume!(applied > 0);

        buffer.undo().unwrap();
        prop_assert!(buffer.can_redo());

        let edit = concretize(&next, buffer.len_chars());
        let before = buffer.revision();
        buffer.apply_edit(edit).unwrap();
        prop_assume!(buffer.revision() != before);
        prop_assert!(!buffer.can_redo());
        prop_assert!(!buffer.redo().unwrap());
    }
}
