//! エディタセッション
//!
//! 1ウィンドウ分の調整役。UI からの要求を DocumentBuffer と SearchEngine の
//! 操作へ変換し、結果を表示状態とトースト通知としてシェルへ返す。
//!
//! バッファと検索エンジンは常に組で作り直す。リスナーはバッファごとに1つだけ
//! 登録し、差し替え時に解除する。リスナーはイベントをキューへ積むだけで、
//! 各操作の最後にまとめて処理する。

use super::display::{document_name, DisplayState};
use super::factory::BufferFactory;
use super::shell::{ConfirmRequest, ConfirmResponse, WindowShell};
use super::state::{CloseIntent, SaveAsPurpose, SessionState};
use crate::buffer::{
    BufferEvent, BufferEventKind, DocumentBuffer, Edit, HistoryCommandKind, ListenerId,
};
use crate::config::EditorConfig;
use crate::error::{ErrorDisplay, MfaError, Result};
use crate::file::Encoding;
use crate::search::{SearchEngine, SearchEvent, SearchHit, SearchOptions};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum SessionEvent {
    Buffer(BufferEvent),
    Search(SearchEvent),
}

type EventQueue = Rc<RefCell<VecDeque<SessionEvent>>>;

/// 表示中のバッファと、それに対応する検索エンジン
struct ActiveDocument {
    buffer: DocumentBuffer,
    search: SearchEngine,
    listener: ListenerId,
}

impl ActiveDocument {
    /// 有効なマッチを置換して次へ進む。無効なら置換せず検索し直す
    fn replace_and_advance(&mut self, replacement: &str) -> Result<Option<SearchHit>> {
        if !self.search.is_active() {
            return Ok(None);
        }

        let selection = self.buffer.selection();
        let current = self
            .search
            .last_match()
            .filter(|span| selection == Some((span.start, span.end)));

        match current {
            Some(span) => {
                match self
                    .search
                    .replace(&mut self.buffer, span.start, span.end, replacement)
                {
                    Ok(_) => {}
                    Err(MfaError::Search(e)) => log::debug!("Replace skipped: {}", e),
                    Err(e) => return Err(e),
                }
            }
            None => log::debug!("No current match to replace, searching again"),
        }

        Ok(self.search.find_next(&mut self.buffer, None))
    }

    fn delete_backward(&mut self) -> Result<()> {
        if let Some((start, end)) = self.buffer.selection() {
            return self.buffer.apply_edit(Edit::delete(start, end));
        }
        let cursor = self.buffer.cursor();
        if cursor == 0 {
            return Ok(());
        }
        self.buffer
            .apply_edit_as(HistoryCommandKind::DeleteBackward, Edit::delete(cursor - 1, cursor))
    }

    fn insert_text(&mut self, text: &str) -> Result<()> {
        match self.buffer.selection() {
            Some((start, end)) => self.buffer.apply_edit(Edit::replace(start, end, text)),
            None => {
                let cursor = self.buffer.cursor();
                self.buffer
                    .apply_edit_as(HistoryCommandKind::InsertChar, Edit::insert(cursor, text))
            }
        }
    }
}

/// エディタセッション
pub struct EditorSession<S: WindowShell> {
    shell: S,
    config: EditorConfig,
    factory: BufferFactory,
    default_encoding: Encoding,
    state: SessionState,
    active: Option<ActiveDocument>,
    query: String,
    search_options: SearchOptions,
    replacement: String,
    pending_save_as: Option<SaveAsPurpose>,
    events: EventQueue,
    displayed: Option<DisplayState>,
}

impl<S: WindowShell> EditorSession<S> {
    /// バッファを持たない状態で作成
    pub fn new(shell: S, config: EditorConfig, factory: BufferFactory) -> Result<Self> {
        let default_encoding = config.encoding()?;
        let search_options = SearchOptions {
            case_sensitive: config.search.case_sensitive,
            wrap_around: config.search.wrap_around,
        };
        Ok(Self {
            shell,
            config,
            factory,
            default_encoding,
            state: SessionState::Empty,
            active: None,
            query: String::new(),
            search_options,
            replacement: String::new(),
            pending_save_as: None,
            events: Rc::new(RefCell::new(VecDeque::new())),
            displayed: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    pub fn document(&self) -> Option<&DocumentBuffer> {
        self.active.as_ref().map(|active| &active.buffer)
    }

    pub fn search(&self) -> Option<&SearchEngine> {
        self.active.as_ref().map(|active| &active.search)
    }

    pub fn search_options(&self) -> SearchOptions {
        self.search_options
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// 保存先の選択を待っているか
    pub fn is_awaiting_save_path(&self) -> bool {
        self.pending_save_as.is_some()
    }

    /// 現在のバッファから計算した表示状態
    pub fn display(&self) -> DisplayState {
        match &self.active {
            Some(active) => DisplayState::from_buffer(&active.buffer),
            None => DisplayState::empty(),
        }
    }

    /// ウィンドウ構築時に呼ぶ。空のバッファ、または `path` を読み込んだバッファを表示する
    ///
    /// 読み込みに失敗した場合はエラーを表示し、空のバッファで編集を始める。
    pub fn start(&mut self, path: Option<&Path>) -> Result<()> {
        if self.state != SessionState::Empty {
            return Err(self.invalid_state("start"));
        }

        let mut result = Ok(());
        let buffer = match path {
            Some(path) => {
                let mut buffer = self.factory.create(Some(path));
                match buffer.load(path) {
                    Ok(()) => {
                        self.toast_file_event("File loaded");
                        buffer
                    }
                    Err(e) => {
                        result = Err(e);
                        self.factory.create(None)
                    }
                }
            }
            None => self.factory.create(None),
        };

        self.install(buffer);
        self.state = SessionState::Editing;
        log::info!("Session started");
        self.finish("open file", result)
    }

    /// 新規ドキュメント（未保存なら確認）
    pub fn request_new(&mut self) -> Result<()> {
        self.begin_intent(CloseIntent::New, "new document")
    }

    /// ファイルを開く（未保存なら確認、その後ファイル選択を要求）
    pub fn request_open(&mut self) -> Result<()> {
        self.begin_intent(CloseIntent::Open, "open file")
    }

    /// ウィンドウを閉じる（未保存なら確認）
    pub fn request_close(&mut self) -> Result<()> {
        match self.state {
            SessionState::Closed => Ok(()),
            SessionState::Empty => {
                self.close_now();
                Ok(())
            }
            _ => self.begin_intent(CloseIntent::Close, "close window"),
        }
    }

    /// ファイル選択の応答。新しいバッファへ読み込み、成功したら差し替える
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        if !self.state.is_editing() {
            return Err(self.invalid_state("open file"));
        }

        let mut buffer = self.factory.create(Some(path));
        if let Err(e) = buffer.load(path) {
            return self.finish("open file", Err(e));
        }

        self.install(buffer);
        self.toast_file_event("File loaded");
        self.finish("open file", Ok(()))
    }

    /// 上書き保存。パスが無ければ保存先の選択を要求する
    pub fn save(&mut self) -> Result<()> {
        let has_path = self.editing_buffer("save")?.file_path().is_some();
        if !has_path {
            self.ask_save_path(SaveAsPurpose::Plain);
            return Ok(());
        }
        let result = self.save_to(None);
        self.finish("save file", result)
    }

    /// 「名前を付けて保存」の保存先選択を要求
    pub fn request_save_as(&mut self) -> Result<()> {
        self.editing_buffer("save as")?;
        self.ask_save_path(SaveAsPurpose::Plain);
        Ok(())
    }

    /// 保存先選択の応答（または直接の「名前を付けて保存」）
    ///
    /// 既存ファイルは確認なしで上書きする。
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        match self.pending_save_as {
            Some(SaveAsPurpose::Resume(intent)) => {
                self.pending_save_as = None;
                match self.save_to(Some(path)) {
                    Ok(()) => self.proceed(intent),
                    Err(e) => {
                        self.state = SessionState::Editing;
                        self.finish("save file", Err(e))
                    }
                }
            }
            Some(SaveAsPurpose::Plain) | None => {
                self.editing_buffer("save as")?;
                self.pending_save_as = None;
                let result = self.save_to(Some(path));
                self.finish("save file", result)
            }
        }
    }

    /// 保存先選択がキャンセルされた
    pub fn cancel_save_as(&mut self) {
        if let Some(SaveAsPurpose::Resume(intent)) = self.pending_save_as.take() {
            log::debug!("Save cancelled, abandoning {:?}", intent);
            self.state = SessionState::Editing;
        }
        self.flush();
    }

    /// 未保存確認ダイアログの応答
    pub fn respond(&mut self, response: ConfirmResponse) -> Result<()> {
        let Some(intent) = self.state.pending_intent() else {
            return Err(self.invalid_state("respond"));
        };
        if let Some(SaveAsPurpose::Resume(_)) = self.pending_save_as {
            return Err(self.invalid_state("respond"));
        }

        match response {
            ConfirmResponse::Cancel => {
                self.state = SessionState::Editing;
                self.flush();
                Ok(())
            }
            ConfirmResponse::Discard => self.proceed(intent),
            ConfirmResponse::Save => {
                let has_path = self
                    .document()
                    .is_some_and(|buffer| buffer.file_path().is_some());
                if !has_path {
                    self.ask_save_path(SaveAsPurpose::Resume(intent));
                    return Ok(());
                }
                match self.save_to(None) {
                    Ok(()) => self.proceed(intent),
                    Err(e) => {
                        self.state = SessionState::Editing;
                        self.finish("save file", Err(e))
                    }
                }
            }
        }
    }

    /// カーソル位置（選択があれば置き換え）に入力
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        let result = self.active_mut("insert text")?.insert_text(text);
        self.finish("insert text", result)
    }

    /// 選択範囲、またはカーソル直前の1文字を削除
    pub fn delete_backward(&mut self) -> Result<()> {
        let result = self.active_mut("delete")?.delete_backward();
        self.finish("delete", result)
    }

    /// 選択範囲を削除（選択が無ければ何もしない）
    pub fn delete_selection(&mut self) -> Result<()> {
        let active = self.active_mut("delete selection")?;
        let result = match active.buffer.selection() {
            Some((start, end)) => active.buffer.apply_edit(Edit::delete(start, end)),
            None => Ok(()),
        };
        self.finish("delete selection", result)
    }

    pub fn place_cursor(&mut self, position: usize) -> Result<()> {
        self.active_mut("move cursor")?.buffer.place_cursor(position);
        Ok(())
    }

    pub fn select_range(&mut self, start: usize, end: usize) -> Result<()> {
        self.active_mut("select")?.buffer.select_range(start, end);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        let result = self.active_mut("undo")?.buffer.undo().map(|_| ());
        self.finish("undo", result)
    }

    pub fn redo(&mut self) -> Result<()> {
        let result = self.active_mut("redo")?.buffer.redo().map(|_| ());
        self.finish("redo", result)
    }

    /// 検索クエリを設定
    pub fn set_search(&mut self, pattern: &str, case_sensitive: bool, wrap_around: bool) {
        self.query = pattern.to_string();
        self.search_options = SearchOptions {
            case_sensitive,
            wrap_around,
        };
        if let Some(active) = self.active.as_mut() {
            active.search.set_pattern(pattern, case_sensitive, wrap_around);
        }
        self.flush();
    }

    /// 置換文字列を設定
    pub fn set_replacement(&mut self, replacement: &str) {
        self.replacement = replacement.to_string();
    }

    pub fn find_next(&mut self) -> Result<Option<SearchHit>> {
        let active = self.active_mut("find next")?;
        let hit = active.search.find_next(&mut active.buffer, None);
        self.flush();
        Ok(hit)
    }

    pub fn find_previous(&mut self) -> Result<Option<SearchHit>> {
        let active = self.active_mut("find previous")?;
        let hit = active.search.find_previous(&mut active.buffer, None);
        self.flush();
        Ok(hit)
    }

    /// 現在のマッチを置換し、次のマッチへ進む
    pub fn replace_current(&mut self) -> Result<Option<SearchHit>> {
        let replacement = self.replacement.clone();
        let result = self.active_mut("replace")?.replace_and_advance(&replacement);
        self.finish("replace", result)
    }

    /// すべて置換し、件数を返す
    pub fn replace_all(&mut self) -> Result<usize> {
        let replacement = self.replacement.clone();
        let active = self.active_mut("replace all")?;
        if !active.search.is_active() {
            return Ok(0);
        }
        let result = active.search.replace_all(&mut active.buffer, &replacement);
        self.finish("replace all", result)
    }

    /// アイドル時の処理。ファイル監視の通知を確認する
    pub fn process_idle(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.buffer.poll_external_change();
        }
        self.flush();
    }

    /// 外部のファイル監視から変更通知を受けた
    pub fn notify_external_change(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.buffer.on_external_change();
        }
        self.flush();
    }

    fn begin_intent(&mut self, intent: CloseIntent, operation: &str) -> Result<()> {
        let buffer = self.editing_buffer(operation)?;
        let modified = buffer.is_modified();
        let name = document_name(buffer.file_path());

        // 応答の無い「名前を付けて保存」は新しい操作で取り下げる
        if self.pending_save_as.take().is_some() {
            log::debug!("Dropping pending save-as before {:?}", intent);
        }
        if !modified {
            return self.proceed(intent);
        }

        log::debug!("Unsaved changes to {}, asking before {:?}", name, intent);
        self.state = SessionState::AwaitingCloseConfirmation(intent);
        self.shell.confirm(&ConfirmRequest::unsaved_changes(&name));
        Ok(())
    }

    fn proceed(&mut self, intent: CloseIntent) -> Result<()> {
        self.state = SessionState::Editing;
        match intent {
            CloseIntent::New => {
                let buffer = self.factory.create(None);
                self.install(buffer);
                log::info!("Created new document");
            }
            CloseIntent::Open => self.shell.choose_open_path(),
            CloseIntent::Close => self.close_now(),
        }
        self.flush();
        Ok(())
    }

    fn close_now(&mut self) {
        self.release_active();
        self.state = SessionState::Closed;
        log::info!("Session closed");
        self.shell.close();
    }

    fn ask_save_path(&mut self, purpose: SaveAsPurpose) {
        let name = document_name(self.document().and_then(DocumentBuffer::file_path));
        self.pending_save_as = Some(purpose);
        self.shell.choose_save_path(&name);
    }

    /// 保存のみ行う（状態遷移と報告は呼び出し側）
    fn save_to(&mut self, path: Option<&Path>) -> Result<()> {
        let default_encoding = self.default_encoding;
        let Some(active) = self.active.as_mut() else {
            return Err(MfaError::NoPath);
        };
        let encoding = save_encoding(&active.buffer, default_encoding);
        active.buffer.save(path, encoding)?;
        self.toast_file_event("File saved");
        Ok(())
    }

    fn install(&mut self, mut buffer: DocumentBuffer) {
        self.release_active();

        let queue = Rc::clone(&self.events);
        let listener = buffer.add_listener(Box::new(move |event: &BufferEvent| {
            queue
                .borrow_mut()
                .push_back(SessionEvent::Buffer(event.clone()))
        }));

        let mut search = SearchEngine::new(self.search_options);
        search.set_pattern(
            &self.query,
            self.search_options.case_sensitive,
            self.search_options.wrap_around,
        );
        let queue = Rc::clone(&self.events);
        search.add_listener(Box::new(move |event: &SearchEvent| {
            queue
                .borrow_mut()
                .push_back(SessionEvent::Search(event.clone()))
        }));

        self.active = Some(ActiveDocument {
            buffer,
            search,
            listener,
        });
    }

    fn release_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.buffer.remove_listener(active.listener);
            active.buffer.cleanup();
        }
        self.events.borrow_mut().clear();
    }

    fn editing_buffer(&self, operation: &str) -> Result<&DocumentBuffer> {
        match (&self.active, self.state) {
            (Some(active), SessionState::Editing) => Ok(&active.buffer),
            _ => Err(self.invalid_state(operation)),
        }
    }

    fn active_mut(&mut self, operation: &str) -> Result<&mut ActiveDocument> {
        if self.state != SessionState::Editing {
            return Err(self.invalid_state(operation));
        }
        let state = self.state;
        self.active
            .as_mut()
            .ok_or_else(|| MfaError::InvalidState {
                state: state.to_string(),
                operation: operation.to_string(),
            })
    }

    fn invalid_state(&self, operation: &str) -> MfaError {
        MfaError::InvalidState {
            state: self.state.to_string(),
            operation: operation.to_string(),
        }
    }

    /// 操作の締めくくり。エラーを報告し、溜まったイベントを処理する
    fn finish<T>(&mut self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.report_error(operation, e);
        }
        self.flush();
        result
    }

    fn report_error(&mut self, operation: &str, error: &MfaError) {
        if let MfaError::InvalidState { .. } = error {
            log::warn!("{}", error);
            return;
        }
        let display = ErrorDisplay::new(operation, error);
        if display.is_silent() {
            log::debug!("{}", display.message);
        } else {
            log::error!("{}", display.message);
            self.shell.show_error(&display.message);
        }
    }

    fn toast_file_event(&mut self, message: &str) {
        let duration = self.config.notifications.file_event();
        self.shell.notify_transient(message, duration);
    }

    fn flush(&mut self) {
        let events: Vec<SessionEvent> = self.events.borrow_mut().drain(..).collect();
        for event in events {
            match event {
                SessionEvent::Buffer(BufferEvent {
                    kind: BufferEventKind::ExternallyModified(path),
                    ..
                }) => {
                    let message = format!(
                        "{} was changed outside the editor",
                        document_name(Some(&path))
                    );
                    self.toast_file_event(&message);
                }
                SessionEvent::Search(SearchEvent::MatchChanged(Some(hit))) if hit.wrapped => {
                    let duration = self.config.notifications.search_wrapped();
                    self.shell.notify_transient("Search wrapped", duration);
                }
                SessionEvent::Search(SearchEvent::ReplacedAll(count)) => {
                    let message = format!("Replace all completed ({} replaced)", count);
                    self.toast_file_event(&message);
                }
                _ => {}
            }
        }
        self.refresh_display();
    }

    fn refresh_display(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        let display = self.display();
        if self.displayed.as_ref() != Some(&display) {
            self.shell.update_display(&display);
            self.displayed = Some(display);
        }
    }
}

/// 保存に使うエンコーディング
///
/// 読み込んだファイルは元のエンコーディングを保つ。内容を表現できなければ
/// 既定のエンコーディング、それも無理なら UTF-8 にする。
fn save_encoding(buffer: &DocumentBuffer, default_encoding: Encoding) -> Encoding {
    let preferred = if buffer.file_path().is_some() {
        buffer.encoding()
    } else {
        default_encoding
    };
    let text = buffer.content();
    [preferred, default_encoding]
        .into_iter()
        .find(|encoding| encoding.can_encode(text))
        .unwrap_or(Encoding::Utf8)
}

impl<S: WindowShell> Drop for EditorSession<S> {
    fn drop(&mut self) {
        self.release_active();
    }
}
