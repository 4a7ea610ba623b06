//! 行指向のコンソールフロントエンド
//!
//! 標準入出力の上でウィンドウシェルを実装する。`:` で始まる行はコマンド、
//! それ以外の行はそのままバッファへ入力される。

use crate::config::EditorConfig;
use crate::error::Result;
use crate::file::expand_path;
use crate::search::SearchHit;
use crate::session::{
    BufferFactory, ConfirmRequest, ConfirmResponse, DisplayState, EditorSession, WindowShell,
};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const HELP: &str = "\
Commands:
  :new                 new document
  :open [PATH]         open a file
  :save                save
  :saveas [PATH]       save under a new name
  :find [TEXT]         find next (sets the pattern when TEXT is given)
  :prev                find previous
  :replace [TEXT]      replace the current match and go to the next one
  :replaceall [TEXT]   replace every match
  :undo / :redo
  :back                delete the selection or the previous character
  :case / :wrap        toggle case sensitivity / wraparound
  :print               show the document
  :quit                close
Any other line is inserted at the cursor.";

/// 応答待ちの入力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Confirm,
    OpenPath,
    SavePath,
}

/// コンソール上のウィンドウシェル
pub struct ConsoleShell<W: Write> {
    out: W,
    prompt: Option<Prompt>,
    closed: bool,
}

impl<W: Write> ConsoleShell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            prompt: None,
            closed: false,
        }
    }

    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn take_prompt(&mut self) -> Option<Prompt> {
        self.prompt.take()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            log::warn!("Console write failed: {}", e);
        }
    }
}

impl<W: Write> WindowShell for ConsoleShell<W> {
    fn confirm(&mut self, request: &ConfirmRequest) {
        let options: Vec<&str> = request.options.iter().map(|o| o.id()).collect();
        self.line(&format!(
            "{}: {} [{}]",
            request.title,
            request.message,
            options.join("/")
        ));
        self.prompt = Some(Prompt::Confirm);
    }

    fn notify_transient(&mut self, message: &str, _duration: Duration) {
        self.line(&format!("-- {}", message));
    }

    fn show_error(&mut self, message: &str) {
        self.line(&format!("Error: {}", message));
    }

    fn update_display(&mut self, display: &DisplayState) {
        self.line(&format!("== {}", display.window_title));
    }

    fn choose_open_path(&mut self) {
        self.prompt = Some(Prompt::OpenPath);
    }

    fn choose_save_path(&mut self, suggested_name: &str) {
        self.prompt = Some(Prompt::SavePath);
        self.line(&format!("Save as (e.g. {}), empty line cancels:", suggested_name));
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// コンソールアプリケーション
pub struct ConsoleApplication<W: Write> {
    session: EditorSession<ConsoleShell<W>>,
    queued_path: Option<PathBuf>,
}

impl<W: Write> ConsoleApplication<W> {
    pub fn new(out: W, config: EditorConfig, factory: BufferFactory) -> Result<Self> {
        let session = EditorSession::new(ConsoleShell::new(out), config, factory)?;
        Ok(Self {
            session,
            queued_path: None,
        })
    }

    pub fn session(&self) -> &EditorSession<ConsoleShell<W>> {
        &self.session
    }

    /// 最初のドキュメントを表示する（読み込み失敗はシェルに表示済み）
    pub fn start(&mut self, path: Option<&Path>) {
        if let Err(e) = self.session.start(path) {
            log::debug!("Initial load failed: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        !self.session.shell().is_closed()
    }

    /// 入力が尽きるか、ウィンドウが閉じるまで処理する
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            self.handle_line(&line);
            if !self.is_running() {
                break;
            }
        }
        Ok(())
    }

    /// 1行を処理する
    pub fn handle_line(&mut self, line: &str) {
        self.session.process_idle();

        match self.session.shell().prompt() {
            Some(Prompt::Confirm) => self.answer_confirm(line),
            Some(Prompt::OpenPath) => {
                self.session.shell_mut().take_prompt();
                if !line.trim().is_empty() {
                    self.open_path(line);
                }
            }
            Some(Prompt::SavePath) => {
                self.session.shell_mut().take_prompt();
                if line.trim().is_empty() {
                    self.session.cancel_save_as();
                } else {
                    self.save_path(line);
                }
            }
            None => self.command(line),
        }

        self.answer_queued_prompt();
    }

    fn answer_confirm(&mut self, line: &str) {
        let Some(response) = ConfirmResponse::from_id(line) else {
            self.print("Please answer save, discard or cancel");
            return;
        };
        self.session.shell_mut().take_prompt();
        if let Err(e) = self.session.respond(response) {
            log::debug!("respond: {}", e);
        }
    }

    /// コマンドで指定済みのパスでファイル選択に答える
    fn answer_queued_prompt(&mut self) {
        let Some(prompt) = self.session.shell().prompt() else {
            return;
        };
        match prompt {
            Prompt::Confirm => {}
            Prompt::OpenPath => match self.queued_path.take() {
                Some(path) => {
                    self.session.shell_mut().take_prompt();
                    log_failure("open file", self.session.open_file(&path));
                }
                None => self.print("Open file:"),
            },
            Prompt::SavePath => {
                if let Some(path) = self.queued_path.take() {
                    self.session.shell_mut().take_prompt();
                    log_failure("save as", self.session.save_as(&path));
                }
            }
        }
    }

    fn command(&mut self, line: &str) {
        let Some(command_line) = line.strip_prefix(':') else {
            let text = format!("{}\n", line);
            log_failure("insert", self.session.insert_text(&text));
            return;
        };

        let (command, argument) = match command_line.split_once(' ') {
            Some((command, argument)) => (command, Some(argument)),
            None => (command_line, None),
        };

        match command {
            "new" => log_failure("new", self.session.request_new()),
            "open" => {
                let path = argument.and_then(|arg| self.expand(arg));
                self.queued_path = path;
                log_failure("open", self.session.request_open());
            }
            "save" => log_failure("save", self.session.save()),
            "saveas" => {
                let path = argument.and_then(|arg| self.expand(arg));
                self.queued_path = path;
                log_failure("save as", self.session.request_save_as());
            }
            "find" => {
                if let Some(pattern) = argument {
                    let options = self.session.search_options();
                    self.session
                        .set_search(pattern, options.case_sensitive, options.wrap_around);
                }
                let result = self.session.find_next();
                self.report_hit(result);
            }
            "prev" => {
                let result = self.session.find_previous();
                self.report_hit(result);
            }
            "replace" => {
                if let Some(replacement) = argument {
                    self.session.set_replacement(replacement);
                }
                let result = self.session.replace_current();
                self.report_hit(result);
            }
            "replaceall" => {
                if let Some(replacement) = argument {
                    self.session.set_replacement(replacement);
                }
                if let Err(e) = self.session.replace_all() {
                    log::debug!("replace all: {}", e);
                }
            }
            "undo" => log_failure("undo", self.session.undo()),
            "redo" => log_failure("redo", self.session.redo()),
            "back" => log_failure("delete", self.session.delete_backward()),
            "case" => {
                let options = self.session.search_options();
                let pattern = self.query();
                self.session
                    .set_search(&pattern, !options.case_sensitive, options.wrap_around);
                self.print(&format!(
                    "Case sensitive: {}",
                    on_off(!options.case_sensitive)
                ));
            }
            "wrap" => {
                let options = self.session.search_options();
                let pattern = self.query();
                self.session
                    .set_search(&pattern, options.case_sensitive, !options.wrap_around);
                self.print(&format!("Wrap around: {}", on_off(!options.wrap_around)));
            }
            "print" => self.print_document(),
            "quit" | "q" => log_failure("close", self.session.request_close()),
            "help" => self.print(HELP),
            other => self.print(&format!("Unknown command :{} (try :help)", other)),
        }
    }

    fn query(&self) -> String {
        self.session
            .search()
            .map(|search| search.pattern().to_string())
            .unwrap_or_default()
    }

    fn open_path(&mut self, raw: &str) {
        if let Some(path) = self.expand(raw) {
            log_failure("open file", self.session.open_file(&path));
        }
    }

    fn save_path(&mut self, raw: &str) {
        match self.expand(raw) {
            Some(path) => log_failure("save as", self.session.save_as(&path)),
            None => self.session.cancel_save_as(),
        }
    }

    fn expand(&mut self, raw: &str) -> Option<PathBuf> {
        match expand_path(raw) {
            Ok(path) => Some(path),
            Err(e) => {
                self.print(&format!("Error: {}", e));
                None
            }
        }
    }

    fn report_hit(&mut self, result: Result<Option<SearchHit>>) {
        match result {
            Ok(Some(hit)) => {
                let total = match (self.session.search(), self.session.document()) {
                    (Some(search), Some(document)) => search.count_matches(document),
                    _ => 0,
                };
                self.print(&format!(
                    "Match at {}..{} ({} in document)",
                    hit.span.start, hit.span.end, total
                ))
            }
            Ok(None) => {
                if self.session.search().is_some_and(|search| search.is_active()) {
                    self.print("Not found");
                }
            }
            Err(e) => log::debug!("search: {}", e),
        }
    }

    fn print_document(&mut self) {
        let Some(document) = self.session.document() else {
            return;
        };
        let text = document.content().to_string();
        let cursor = document.cursor();
        for line in text.lines() {
            self.print(&format!("| {}", line));
        }
        self.print(&format!("(cursor at {})", cursor));
    }

    fn print(&mut self, text: &str) {
        self.session.shell_mut().line(text);
    }
}

/// 失敗はセッションがシェルへ報告済みなので、ここではログのみ
fn log_failure(operation: &str, result: Result<()>) {
    if let Err(e) = result {
        log::debug!("{} failed: {}", operation, e);
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn app() -> ConsoleApplication<Vec<u8>> {
        let factory = BufferFactory {
            syntax_highlighting: false,
            watch_files: false,
        };
        let mut app =
            ConsoleApplication::new(Vec::new(), EditorConfig::default(), factory).unwrap();
        app.start(None);
        app
    }

    fn output(app: &ConsoleApplication<Vec<u8>>) -> String {
        String::from_utf8_lossy(app.session().shell().output()).into_owned()
    }

    #[test]
    fn typed_lines_become_content() {
        let mut app = app();
        app.handle_line("hello");
        app.handle_line("world");
        assert_eq!(app.session().document().unwrap().content(), "hello\nworld\n");
        assert!(output(&app).contains("== * Untitled - MfaText"));
    }

    #[test]
    fn saveas_with_argument_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut app = app();
        app.handle_line("content");
        app.handle_line(&format!(":saveas {}", path.display()));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content\n");
        assert!(output(&app).contains("-- File saved"));
        assert!(!app.session().document().unwrap().is_modified());
    }

    #[test]
    fn quit_with_changes_asks_first() {
        let mut app = app();
        app.handle_line("draft");
        app.handle_line(":quit");
        assert!(app.is_running());
        assert!(output(&app).contains("Unsaved Changes"));

        app.handle_line("maybe");
        assert!(app.is_running());
        app.handle_line("discard");
        assert!(!app.is_running());
    }

    #[test]
    fn save_on_untitled_prompts_for_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prompted.txt");
        let mut app = app();
        app.handle_line("x");
        app.handle_line(":save");
        assert_eq!(app.session().shell().prompt(), Some(Prompt::SavePath));

        app.handle_line(&path.display().to_string());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn find_and_replace_commands() {
        let mut app = app();
        app.handle_line("one two one");
        app.handle_line(":find ONE");
        assert!(output(&app).contains("Match at 0..3"));

        app.handle_line(":replaceall 1");
        assert_eq!(app.session().document().unwrap().content(), "1 two 1\n");
        assert!(output(&app).contains("Replace all completed (2 replaced)"));

        app.handle_line(":undo");
        assert_eq!(app.session().document().unwrap().content(), "one two one\n");
    }

    #[test]
    fn run_stops_after_quit() {
        let mut app = app();
        let input = b"first\n:quit\ndiscard\nnever typed\n" as &[u8];
        app.run(input).unwrap();
        assert!(!app.is_running());
    }
}
