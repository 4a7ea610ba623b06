//! ドキュメントバッファ
//!
//! テキストバッファ・ケイパビリティの上に、ファイルとの対応付け、
//! 変更フラグ、undo/redo 履歴、外部変更の検出をまとめる。
//! 内容の変更と履歴の更新は1ステップで行い、リスナーへの通知は両方が
//! 確定した後にだけ発行する。

use super::history::{AtomicEdit, HistoryCommandKind, HistoryEntry, HistoryStack};
use super::notifier::{ChangeListener, ChangeNotifier, ListenerId};
use super::text::{slice_chars, PlainTextBuffer, TextBuffer};
use crate::error::{EditError, FileError, MfaError, Result};
use crate::file::{self, Encoding, FileMonitor, LoadedText, NullFileMonitor};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 編集要求（位置は文字インデックス）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert { position: usize, text: String },
    Delete { start: usize, end: usize },
    Replace { start: usize, end: usize, text: String },
}

impl Edit {
    pub fn insert(position: usize, text: impl Into<String>) -> Self {
        Edit::Insert {
            position,
            text: text.into(),
        }
    }

    pub fn delete(start: usize, end: usize) -> Self {
        Edit::Delete { start, end }
    }

    pub fn replace(start: usize, end: usize, text: impl Into<String>) -> Self {
        Edit::Replace {
            start,
            end,
            text: text.into(),
        }
    }
}

/// 内容変更の発生源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    Edit,
    Undo,
    Redo,
    Load,
}

/// 通知時点のバッファ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferState {
    pub is_modified: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEventKind {
    /// 内容が変わった
    Changed(ChangeOrigin),
    /// 保存された
    Saved(PathBuf),
    /// ディスク上のファイルが外部で更新された
    ExternallyModified(PathBuf),
}

/// バッファ変更イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEvent {
    pub kind: BufferEventKind,
    pub revision: u64,
    pub state: BufferState,
}

/// トランザクション内の編集ハンドル
///
/// 適用した操作を記録し、失敗時には逆順に巻き戻す。
pub struct EditTransaction<'a> {
    text: &'a mut dyn TextBuffer,
    applied: Vec<AtomicEdit>,
}

impl<'a> EditTransaction<'a> {
    fn new(text: &'a mut dyn TextBuffer) -> Self {
        Self {
            text,
            applied: Vec::new(),
        }
    }

    /// 編集を適用
    pub fn apply(&mut self, edit: Edit) -> Result<()> {
        match edit {
            Edit::Insert { position, text } => self.insert(position, text),
            Edit::Delete { start, end } => self.delete(start, end),
            Edit::Replace { start, end, text } => {
                self.check_range(start, end)?;
                self.delete(start, end)?;
                self.insert(start, text)
            }
        }
    }

    pub fn text(&self) -> &str {
        self.text.text()
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn select_range(&mut self, start: usize, end: usize) {
        self.text.select_range(start, end);
    }

    pub fn place_cursor(&mut self, position: usize) {
        self.text.place_cursor(position);
    }

    fn insert(&mut self, position: usize, text: String) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.text.insert(position, &text)?;
        self.applied.push(AtomicEdit::Insert { position, text });
        Ok(())
    }

    fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        let removed = self.text.delete(start, end)?;
        self.applied.push(AtomicEdit::Delete {
            position: start,
            text: removed,
        });
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Err(EditError::InvalidRange { start, end }.into());
        }
        let len = self.text.len_chars();
        if end > len {
            return Err(EditError::OutOfBounds { position: end, len }.into());
        }
        Ok(())
    }

    fn rollback(&mut self) {
        while let Some(op) = self.applied.pop() {
            if let Err(e) = op.inverse().apply_to(&mut *self.text) {
                log::error!("Failed to roll back edit {:?}: {}", op, e);
            }
        }
    }
}

/// ドキュメントバッファ
pub struct DocumentBuffer {
    text: Box<dyn TextBuffer>,
    monitor: Box<dyn FileMonitor>,
    file_path: Option<PathBuf>,
    encoding: Encoding,
    last_known_mtime: Option<SystemTime>,
    history: HistoryStack,
    revision: u64,
    io_in_flight: bool,
    notifier: ChangeNotifier<BufferEvent>,
}

impl DocumentBuffer {
    /// 空のドキュメントを作成
    pub fn new(text: Box<dyn TextBuffer>, monitor: Box<dyn FileMonitor>) -> Self {
        Self {
            text,
            monitor,
            file_path: None,
            encoding: Encoding::default(),
            last_known_mtime: None,
            history: HistoryStack::new(),
            revision: 0,
            io_in_flight: false,
            notifier: ChangeNotifier::new(),
        }
    }

    /// ファイルと関連付けないプレーンなドキュメント
    pub fn from_str(content: &str) -> Self {
        Self::new(
            Box::new(PlainTextBuffer::from_str(content)),
            Box::new(NullFileMonitor::new()),
        )
    }

    pub fn content(&self) -> &str {
        self.text.text()
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// 読み込み時に検出された（または最後に保存した）エンコーディング
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_modified(&self) -> bool {
        self.text.modified()
    }

    pub fn can_undo(&self) -> bool {
        match self.text.native_history_ref() {
            Some(native) => native.can_undo(),
            None => self.history.can_undo(),
        }
    }

    pub fn can_redo(&self) -> bool {
        match self.text.native_history_ref() {
            Some(native) => native.can_redo(),
            None => self.history.can_redo(),
        }
    }

    /// 内容が変わるたびに増える番号
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> BufferState {
        BufferState {
            is_modified: self.is_modified(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.text.language()
    }

    pub fn last_known_mtime(&self) -> Option<SystemTime> {
        self.last_known_mtime
    }

    pub fn cursor(&self) -> usize {
        self.text.cursor()
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.text.selection()
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection()
            .map(|(start, end)| slice_chars(self.text.text(), start, end))
    }

    pub fn select_range(&mut self, start: usize, end: usize) {
        self.text.select_range(start, end);
    }

    pub fn place_cursor(&mut self, position: usize) {
        self.text.place_cursor(position);
    }

    /// リスナーを追加
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener<BufferEvent>>) -> ListenerId {
        self.notifier.add_listener(listener)
    }

    /// リスナーを削除
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.notifier.listener_count()
    }

    /// ファイルを読み込む（エンコーディング自動判定）
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.load_with(path, file::load_text)
    }

    /// 指定エンコーディングで厳密に読み込む
    pub fn load_as(&mut self, path: &Path, encoding: Encoding) -> Result<()> {
        self.load_with(path, |p| file::load_text_as(p, encoding))
    }

    fn load_with<F>(&mut self, path: &Path, read: F) -> Result<()>
    where
        F: FnOnce(&Path) -> crate::error::file::Result<LoadedText>,
    {
        self.begin_io(path)?;
        let result = read(path);
        self.io_in_flight = false;
        let LoadedText { text, encoding } = result?;

        let mtime = match file::modified_time(path) {
            Ok(mtime) => Some(mtime),
            Err(e) => {
                log::warn!("Could not read mtime of {}: {}", path.display(), e);
                None
            }
        };

        self.text.set_text(&text);
        self.text.place_cursor(0);
        match self.text.native_history() {
            Some(native) => native.clear(),
            None => self.history.clear(),
        }
        self.text.set_modified(false);

        self.file_path = Some(path.to_path_buf());
        self.encoding = encoding;
        self.last_known_mtime = mtime;
        self.rearm_monitor(path);

        log::info!("Loaded {} ({})", path.display(), encoding.label());
        self.revision += 1;
        self.emit(BufferEventKind::Changed(ChangeOrigin::Load));
        Ok(())
    }

    /// 保存（`path` 省略時は現在のパス）
    ///
    /// 失敗時は変更フラグもパスも変えない。履歴は保持する。
    pub fn save(&mut self, path: Option<&Path>, encoding: Encoding) -> Result<()> {
        let target = match path.or(self.file_path.as_deref()) {
            Some(target) => target.to_path_buf(),
            None => return Err(MfaError::NoPath),
        };

        self.begin_io(&target)?;
        let result = file::save_text(&target, self.text.text(), encoding);
        self.io_in_flight = false;
        result?;

        match file::modified_time(&target) {
            Ok(mtime) => self.last_known_mtime = Some(mtime),
            Err(e) => log::warn!("Could not read mtime of {}: {}", target.display(), e),
        }

        self.history.mark_clean();
        self.text.set_modified(false);
        self.encoding = encoding;

        if self.file_path.as_deref() != Some(target.as_path()) {
            self.rearm_monitor(&target);
            self.file_path = Some(target.clone());
        }

        log::info!("Saved {} ({})", target.display(), encoding.label());
        self.emit(BufferEventKind::Saved(target));
        Ok(())
    }

    /// 単一の編集を適用
    pub fn apply_edit(&mut self, edit: Edit) -> Result<()> {
        self.transact(|tx| tx.apply(edit))
    }

    /// 種別付きで単一の編集を適用（連続入力の結合に使う）
    pub fn apply_edit_as(&mut self, kind: HistoryCommandKind, edit: Edit) -> Result<()> {
        self.transact_as(kind, |tx| tx.apply(edit))
    }

    /// 複数の編集を1つの履歴エントリとして適用
    ///
    /// クロージャがエラーを返した場合は内容を元に戻し、履歴も通知も残さない。
    pub fn transact<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut EditTransaction<'_>) -> Result<T>,
    {
        self.transact_as(HistoryCommandKind::Other, f)
    }

    pub fn transact_as<T, F>(&mut self, kind: HistoryCommandKind, f: F) -> Result<T>
    where
        F: FnOnce(&mut EditTransaction<'_>) -> Result<T>,
    {
        if self.io_in_flight {
            return Err(self.busy_error());
        }

        let cursor_before = self.text.cursor();
        if let Some(native) = self.text.native_history() {
            native.begin_user_action();
        }

        let mut tx = EditTransaction::new(&mut *self.text);
        let result = f(&mut tx);
        if result.is_err() {
            tx.rollback();
        }
        let operations = std::mem::take(&mut tx.applied);

        let native = match self.text.native_history() {
            Some(native) => {
                native.end_user_action();
                true
            }
            None => false,
        };

        let value = result?;
        if operations.is_empty() {
            return Ok(value);
        }

        if native {
            self.text.set_modified(true);
        } else {
            let cursor_after = self.text.cursor();
            self.history
                .push(HistoryEntry::new(kind, operations, cursor_before, cursor_after));
            self.sync_modified();
        }

        self.revision += 1;
        self.emit(BufferEventKind::Changed(ChangeOrigin::Edit));
        Ok(value)
    }

    /// 取り消し。履歴が空なら何もせず `false`
    pub fn undo(&mut self) -> Result<bool> {
        if let Some(native) = self.text.native_history() {
            if !native.undo() {
                return Ok(false);
            }
            self.text.set_modified(true);
        } else {
            let Some(entry) = self.history.take_for_undo() else {
                return Ok(false);
            };
            if let Err(e) = entry.revert(&mut *self.text) {
                self.history.push_without_clearing(entry);
                return Err(e);
            }
            self.history.push_redo(entry);
            self.sync_modified();
        }

        self.revision += 1;
        self.emit(BufferEventKind::Changed(ChangeOrigin::Undo));
        Ok(true)
    }

    /// やり直し。履歴が空なら何もせず `false`
    pub fn redo(&mut self) -> Result<bool> {
        if let Some(native) = self.text.native_history() {
            if !native.redo() {
                return Ok(false);
            }
            self.text.set_modified(true);
        } else {
            let Some(entry) = self.history.take_for_redo() else {
                return Ok(false);
            };
            if let Err(e) = entry.reapply(&mut *self.text) {
                self.history.push_redo(entry);
                return Err(e);
            }
            self.history.push_without_clearing(entry);
            self.sync_modified();
        }

        self.revision += 1;
        self.emit(BufferEventKind::Changed(ChangeOrigin::Redo));
        Ok(true)
    }

    /// 監視からの通知が溜まっていれば外部変更を確認する
    pub fn poll_external_change(&mut self) -> Option<PathBuf> {
        if self.monitor.take_pending() {
            self.on_external_change()
        } else {
            None
        }
    }

    /// ディスク上の更新時刻が既知の時刻より新しければ外部変更として通知する
    ///
    /// 自分の保存による通知はここで弾かれる。再読み込みはしない。
    pub fn on_external_change(&mut self) -> Option<PathBuf> {
        let path = self.file_path.clone()?;
        let mtime = match file::modified_time(&path) {
            Ok(mtime) => mtime,
            Err(e) => {
                log::debug!("Ignoring change notice for {}: {}", path.display(), e);
                return None;
            }
        };

        if self.last_known_mtime.is_some_and(|known| mtime <= known) {
            return None;
        }

        self.last_known_mtime = Some(mtime);
        log::info!("{} changed on disk", path.display());
        self.emit(BufferEventKind::ExternallyModified(path.clone()));
        Some(path)
    }

    /// 監視購読とリスナーを解放
    pub fn cleanup(&mut self) {
        self.monitor.unwatch();
        self.notifier.clear();
    }

    fn begin_io(&mut self, path: &Path) -> Result<()> {
        if self.io_in_flight {
            return Err(FileError::Busy {
                path: path.display().to_string(),
            }
            .into());
        }
        self.io_in_flight = true;
        Ok(())
    }

    fn busy_error(&self) -> MfaError {
        FileError::Busy {
            path: self
                .file_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
        .into()
    }

    fn rearm_monitor(&mut self, path: &Path) {
        if let Err(e) = self.monitor.watch(path) {
            log::warn!("Could not monitor {}: {}", path.display(), e);
        }
    }

    fn sync_modified(&mut self) {
        let modified = !self.history.is_clean();
        self.text.set_modified(modified);
    }

    fn emit(&mut self, kind: BufferEventKind) {
        let event = BufferEvent {
            kind,
            revision: self.revision,
            state: self.state(),
        };
        self.notifier.notify(&event);
    }
}

impl Drop for DocumentBuffer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl std::fmt::Debug for DocumentBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBuffer")
            .field("file_path", &self.file_path)
            .field("encoding", &self.encoding)
            .field("revision", &self.revision)
            .field("modified", &self.is_modified())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::text::NativeHistory;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn record_events(buffer: &mut DocumentBuffer) -> Rc<RefCell<Vec<BufferEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        buffer.add_listener(Box::new(move |event: &BufferEvent| {
            sink.borrow_mut().push(event.clone())
        }));
        events
    }

    #[test]
    fn edit_then_undo_restores_content() {
        let mut buffer = DocumentBuffer::from_str("hello");
        buffer.apply_edit(Edit::insert(5, " world")).unwrap();
        buffer.apply_edit(Edit::delete(0, 1)).unwrap();
        assert_eq!(buffer.content(), "ello world");
        assert!(buffer.is_modified());

        assert!(buffer.undo().unwrap());
        assert!(buffer.undo().unwrap());
        assert_eq!(buffer.content(), "hello");
        assert!(!buffer.is_modified());
        assert!(!buffer.undo().unwrap());
    }

    #[test]
    fn redo_restores_undone_edit() {
        let mut buffer = DocumentBuffer::from_str("abc");
        buffer.apply_edit(Edit::replace(1, 2, "XYZ")).unwrap();
        buffer.undo().unwrap();
        assert_eq!(buffer.content(), "abc");
        assert!(buffer.can_redo());

        buffer.redo().unwrap();
        assert_eq!(buffer.content(), "aXYZc");
        assert!(!buffer.can_redo());
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let mut buffer = DocumentBuffer::from_str("abc");
        let events = record_events(&mut buffer);

        let result = buffer.transact(|tx| {
            tx.apply(Edit::insert(0, "zz"))?;
            tx.apply(Edit::delete(10, 12))
        });

        assert!(matches!(result, Err(MfaError::Edit(_))));
        assert_eq!(buffer.content(), "abc");
        assert!(!buffer.can_undo());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn listeners_see_settled_state() {
        let mut buffer = DocumentBuffer::from_str("");
        let events = record_events(&mut buffer);

        buffer.apply_edit(Edit::insert(0, "x")).unwrap();
        buffer.undo().unwrap();

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, BufferEventKind::Changed(ChangeOrigin::Edit));
        assert!(events[0].state.can_undo && events[0].state.is_modified);
        assert_eq!(events[1].kind, BufferEventKind::Changed(ChangeOrigin::Undo));
        assert!(events[1].state.can_redo && !events[1].state.can_undo);
        assert!(events[1].revision > events[0].revision);
    }

    #[test]
    fn empty_edit_is_not_recorded() {
        let mut buffer = DocumentBuffer::from_str("abc");
        buffer.apply_edit(Edit::insert(1, "")).unwrap();
        buffer.apply_edit(Edit::delete(2, 2)).unwrap();
        assert!(!buffer.can_undo());
        assert_eq!(buffer.revision(), 0);
    }

    #[test]
    fn save_without_path_fails() {
        let mut buffer = DocumentBuffer::from_str("");
        buffer.apply_edit(Edit::insert(0, "draft")).unwrap();

        let result = buffer.save(None, Encoding::Utf8);
        assert_eq!(result, Err(MfaError::NoPath));
        assert!(buffer.is_modified());
    }

    #[test]
    fn load_resets_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "on disk").unwrap();

        let mut buffer = DocumentBuffer::from_str("");
        buffer.apply_edit(Edit::insert(0, "scratch")).unwrap();
        buffer.load(&path).unwrap();

        assert_eq!(buffer.content(), "on disk");
        assert!(!buffer.can_undo());
        assert!(!buffer.can_redo());
        assert!(!buffer.is_modified());
        assert_eq!(buffer.file_path(), Some(path.as_path()));
    }

    #[test]
    fn failed_load_keeps_buffer() {
        let dir = tempdir().unwrap();
        let mut buffer = DocumentBuffer::from_str("keep me");
        buffer.apply_edit(Edit::insert(0, "> ")).unwrap();

        let result = buffer.load(&dir.path().join("missing.txt"));
        assert!(matches!(
            result,
            Err(MfaError::File(FileError::NotFound { .. }))
        ));
        assert_eq!(buffer.content(), "> keep me");
        assert!(buffer.can_undo());
    }

    #[test]
    fn save_keeps_history_and_clears_modified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut buffer = DocumentBuffer::from_str("");
        buffer.apply_edit(Edit::insert(0, "text")).unwrap();
        buffer.save(Some(&path), Encoding::Utf8).unwrap();

        assert!(!buffer.is_modified());
        assert!(buffer.can_undo());
        assert_eq!(buffer.file_path(), Some(path.as_path()));

        buffer.undo().unwrap();
        assert!(buffer.is_modified());
        buffer.redo().unwrap();
        assert!(!buffer.is_modified());
    }

    #[test]
    fn external_change_requires_newer_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watched.txt");
        std::fs::write(&path, "v1").unwrap();

        let mut buffer = DocumentBuffer::from_str("");
        buffer.load(&path).unwrap();
        assert_eq!(buffer.on_external_change(), None);

        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        let newer = buffer.last_known_mtime().unwrap() + std::time::Duration::from_secs(5);
        file.set_modified(newer).unwrap();

        assert_eq!(buffer.on_external_change(), Some(path.clone()));
        assert_eq!(buffer.on_external_change(), None);
    }

    #[test]
    fn cleanup_releases_listeners() {
        let mut buffer = DocumentBuffer::from_str("");
        let _events = record_events(&mut buffer);
        assert_eq!(buffer.listener_count(), 1);
        buffer.cleanup();
        assert_eq!(buffer.listener_count(), 0);
    }

    /// ウィジェット側に履歴を持つバッファ
    #[derive(Default)]
    struct NativeUndoBuffer {
        inner: PlainTextBuffer,
        snapshots: Vec<String>,
        redo: Vec<String>,
        depth: usize,
    }

    impl TextBuffer for NativeUndoBuffer {
        fn text(&self) -> &str {
            self.inner.text()
        }
        fn set_text(&mut self, text: &str) {
            self.inner.set_text(text)
        }
        fn len_chars(&self) -> usize {
            self.inner.len_chars()
        }
        fn insert(&mut self, position: usize, text: &str) -> Result<()> {
            if self.depth == 0 {
                self.snapshots.push(self.inner.text().to_string());
            }
            self.inner.insert(position, text)
        }
        fn delete(&mut self, start: usize, end: usize) -> Result<String> {
            if self.depth == 0 {
                self.snapshots.push(self.inner.text().to_string());
            }
            self.inner.delete(start, end)
        }
        fn modified(&self) -> bool {
            self.inner.modified()
        }
        fn set_modified(&mut self, modified: bool) {
            self.inner.set_modified(modified)
        }
        fn cursor(&self) -> usize {
            self.inner.cursor()
        }
        fn selection(&self) -> Option<(usize, usize)> {
            self.inner.selection()
        }
        fn select_range(&mut self, start: usize, end: usize) {
            self.inner.select_range(start, end)
        }
        fn place_cursor(&mut self, position: usize) {
            self.inner.place_cursor(position)
        }
        fn native_history(&mut self) -> Option<&mut dyn NativeHistory> {
            Some(self)
        }
        fn native_history_ref(&self) -> Option<&dyn NativeHistory> {
            Some(self)
        }
    }

    impl NativeHistory for NativeUndoBuffer {
        fn can_undo(&self) -> bool {
            !self.snapshots.is_empty()
        }
        fn can_redo(&self) -> bool {
            !self.redo.is_empty()
        }
        fn undo(&mut self) -> bool {
            let Some(previous) = self.snapshots.pop() else {
                return false;
            };
            self.redo.push(self.inner.text().to_string());
            self.inner.set_text(&previous);
            true
        }
        fn redo(&mut self) -> bool {
            let Some(next) = self.redo.pop() else {
                return false;
            };
            self.snapshots.push(self.inner.text().to_string());
            self.inner.set_text(&next);
            true
        }
        fn begin_user_action(&mut self) {
            self.snapshots.push(self.inner.text().to_string());
            self.redo.clear();
            self.depth += 1;
        }
        fn end_user_action(&mut self) {
            self.depth -= 1;
        }
        fn clear(&mut self) {
            self.snapshots.clear();
            self.redo.clear();
        }
    }

    #[test]
    fn native_history_is_used_when_available() {
        let mut buffer = DocumentBuffer::new(
            Box::new(NativeUndoBuffer::default()),
            Box::new(NullFileMonitor::new()),
        );
        buffer.apply_edit(Edit::insert(0, "abc")).unwrap();
        buffer.apply_edit(Edit::replace(0, 1, "X")).unwrap();
        assert_eq!(buffer.content(), "Xbc");

        assert!(buffer.undo().unwrap());
        assert_eq!(buffer.content(), "abc");
        assert!(buffer.can_redo());
        assert!(buffer.redo().unwrap());
        assert_eq!(buffer.content(), "Xbc");
    }
}
