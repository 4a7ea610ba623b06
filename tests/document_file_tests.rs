// document_file_tests.rs - ファイル読み書きの統合テスト

use mfatext::buffer::{BufferEvent, BufferEventKind, ChangeOrigin};
use mfatext::error::{FileError, MfaError};
use mfatext::file::Encoding;
use mfatext::{DocumentBuffer, Edit};
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::tempdir;

#[test]
fn test_save_without_path_fails_and_keeps_modified() {
    let mut buffer = DocumentBuffer::from_str("");
    buffer.apply_edit(Edit::insert(0, "draft")).unwrap();
    assert!(buffer.is_modified());

    let result = buffer.save(None, Encoding::Utf8);
    assert_eq!(result, Err(MfaError::NoPath));
    assert!(buffer.is_modified());
    assert_eq!(buffer.content(), "draft");
}

#[test]
fn test_load_resets_history_and_modified() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("notes.txt");
    fs::write(&path, "from disk").unwrap();

    let mut buffer = DocumentBuffer::from_str("");
    buffer.apply_edit(Edit::insert(0, "scratch")).unwrap();
    buffer.load(&path).unwrap();

    assert_eq!(buffer.content(), "from disk");
    assert!(!buffer.can_undo());
    assert!(!buffer.can_redo());
    assert!(!buffer.is_modified());
    assert_eq!(buffer.file_path(), Some(path.as_path()));
}

#[test]
fn test_missing_file_leaves_buffer_untouched() {
    let temp_dir = tempdir().unwrap();
    let mut buffer = DocumentBuffer::from_str("keep me");
    buffer.apply_edit(Edit::insert(7, "!")).unwrap();

    let result = buffer.load(&temp_dir.path().join("missing.txt"));
    assert!(matches!(
        result,
        Err(MfaError::File(FileError::NotFound { .. }))
    ));
    assert_eq!(buffer.content(), "keep me!");
    assert!(buffer.is_modified());
    assert!(buffer.can_undo());
}

#[test]
fn test_save_then_undo_marks_modified_again() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("doc.txt");

    let mut buffer = DocumentBuffer::from_str("");
    buffer.apply_edit(Edit::insert(0, "one")).unwrap();
    buffer.save(Some(&path), Encoding::Utf8).unwrap();
    assert!(!buffer.is_modified());
    assert_eq!(fs::read_to_string(&path).unwrap(), "one");

    buffer.undo().unwrap();
    assert!(buffer.is_modified());
    buffer.redo().unwrap();
    assert!(!buffer.is_modified());
}

#[test]
fn test_save_as_moves_file_path() {
    let temp_dir = tempdir().unwrap();
    let first = temp_dir.path().join("first.txt");
    let second = temp_dir.path().join("second.txt");
    fs::write(&first, "content").unwrap();
    fs::write(&second, "will be overwritten").unwrap();

    let mut buffer = DocumentBuffer::from_str("");
    buffer.load(&first).unwrap();
    buffer.save(Some(&second), Encoding::Utf8).unwrap();

    assert_eq!(buffer.file_path(), Some(second.as_path()));
    assert_eq!(fs::read_to_string(&second).unwrap(), "content");
}

#[test]
fn test_latin1_round_trip() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("latin1.txt");
    fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();

    let mut buffer = DocumentBuffer::from_str("");
    buffer.load(&path).unwrap();
    assert_eq!(buffer.content(), "café");
    assert_eq!(buffer.encoding(), Encoding::Latin1);

    buffer.apply_edit(Edit::insert(4, "s")).unwrap();
    buffer.save(None, buffer.encoding()).unwrap();
    assert_eq!(fs::read(&path).unwrap(), vec![b'c', b'a', b'f', 0xE9, b's']);
}

#[test]
fn test_strict_utf8_load_reports_decode_error() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("bytes.bin");
    fs::write(&path, [0xFF, 0xFE, 0x41]).unwrap();

    let mut buffer = DocumentBuffer::from_str("before");
    let result = buffer.load_as(&path, Encoding::Utf8);
    assert!(matches!(result, Err(MfaError::File(FileError::Decode { .. }))));
    assert_eq!(buffer.content(), "before");
}

#[test]
fn test_failed_save_keeps_state() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("out.txt");

    let mut buffer = DocumentBuffer::from_str("");
    buffer.apply_edit(Edit::insert(0, "日本語")).unwrap();

    // Latin-1 で表せない文字は保存できない
    let result = buffer.save(Some(&path), Encoding::Latin1);
    assert!(matches!(
        result,
        Err(MfaError::File(FileError::WriteFailed { .. }))
    ));
    assert!(buffer.is_modified());
    assert_eq!(buffer.file_path(), None);
    assert!(!path.exists());
}

#[test]
fn test_listeners_see_settled_state() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("events.txt");
    fs::write(&path, "abc").unwrap();

    let events: Rc<RefCell<Vec<BufferEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);

    let mut buffer = DocumentBuffer::from_str("");
    buffer.add_listener(Box::new(move |event: &BufferEvent| {
        sink.borrow_mut().push(event.clone())
    }));

    buffer.load(&path).unwrap();
    buffer.apply_edit(Edit::delete(0, 1)).unwrap();
    buffer.save(None, Encoding::Utf8).unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, BufferEventKind::Changed(ChangeOrigin::Load));
    assert!(!events[0].state.can_undo);
    assert_eq!(events[1].kind, BufferEventKind::Changed(ChangeOrigin::Edit));
    assert!(events[1].state.is_modified);
    assert!(events[1].state.can_undo);
    assert_eq!(events[2].kind, BufferEventKind::Saved(path.clone()));
    assert!(!events[2].state.is_modified);
}
