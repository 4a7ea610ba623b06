//! テキストバッファ・ケイパビリティ
//!
//! ウィジェット側が提供する記憶領域の抽象。位置はすべて文字インデックス。
//! プレーン版と構文対応版の2実装を持ち、コアはトレイト越しにのみ扱う。

use crate::error::{EditError, Result};
use std::path::Path;

/// ウィジェットが独自に持つ取り消し履歴
///
/// これを提供するバッファでは、コア側の履歴ログは使われない。
pub trait NativeHistory {
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
    /// 取り消しを実行し、内容が変わったかを返す
    fn undo(&mut self) -> bool;
    /// やり直しを実行し、内容が変わったかを返す
    fn redo(&mut self) -> bool;
    /// 以降の編集を1つの操作としてまとめ始める
    fn begin_user_action(&mut self) {}
    fn end_user_action(&mut self) {}
    /// 履歴を破棄（読み込み直後など）
    fn clear(&mut self);
}

/// テキストバッファのインターフェース
pub trait TextBuffer {
    /// 全内容
    fn text(&self) -> &str;

    /// 内容を丸ごと置き換える（カーソルは先頭へ）
    fn set_text(&mut self, text: &str);

    /// 文字数
    fn len_chars(&self) -> usize;

    /// `position` に挿入
    fn insert(&mut self, position: usize, text: &str) -> Result<()>;

    /// `start..end` を削除し、削除した文字列を返す
    fn delete(&mut self, start: usize, end: usize) -> Result<String>;

    /// 変更フラグ
    fn modified(&self) -> bool;
    fn set_modified(&mut self, modified: bool);

    /// カーソル位置
    fn cursor(&self) -> usize;

    /// 選択範囲（`start < end`）。選択が無ければ `None`
    fn selection(&self) -> Option<(usize, usize)>;

    /// 範囲を選択し、カーソルを `end` に置く
    fn select_range(&mut self, start: usize, end: usize);

    /// 選択を解除してカーソルを移動
    fn place_cursor(&mut self, position: usize);

    /// 構文ハイライト用の言語名
    fn language(&self) -> Option<&str> {
        None
    }

    /// ウィジェット独自の取り消し履歴
    fn native_history(&mut self) -> Option<&mut dyn NativeHistory> {
        None
    }

    fn native_history_ref(&self) -> Option<&dyn NativeHistory> {
        None
    }
}

/// 両実装が共有する記憶領域
#[derive(Debug, Clone, Default)]
struct TextStore {
    text: String,
    len_chars: usize,
    anchor: usize,
    cursor: usize,
    modified: bool,
}

impl TextStore {
    fn from_str(text: &str) -> Self {
        Self {
            text: text.to_string(),
            len_chars: text.chars().count(),
            ..Self::default()
        }
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.len_chars = text.chars().count();
        self.anchor = 0;
        self.cursor = 0;
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        char_to_byte_index(&self.text, char_pos)
    }

    fn insert(&mut self, position: usize, text: &str) -> Result<()> {
        if position > self.len_chars {
            return Err(EditError::OutOfBounds {
                position,
                len: self.len_chars,
            }
            .into());
        }
        if text.is_empty() {
            return Ok(());
        }

        let byte_idx = self.byte_index(position);
        self.text.insert_str(byte_idx, text);
        let inserted = text.chars().count();
        self.len_chars += inserted;

        // 挿入位置以降のマークは後ろへずれる
        for mark in [&mut self.anchor, &mut self.cursor] {
            if *mark >= position {
                *mark += inserted;
            }
        }
        Ok(())
    }

    fn delete(&mut self, start: usize, end: usize) -> Result<String> {
        if start > end {
            return Err(EditError::InvalidRange { start, end }.into());
        }
        if end > self.len_chars {
            return Err(EditError::OutOfBounds {
                position: end,
                len: self.len_chars,
            }
            .into());
        }

        let start_byte = self.byte_index(start);
        let end_byte = self.byte_index(end);
        let removed: String = self.text.drain(start_byte..end_byte).collect();
        let count = end - start;
        self.len_chars -= count;

        for mark in [&mut self.anchor, &mut self.cursor] {
            if *mark >= end {
                *mark -= count;
            } else if *mark > start {
                *mark = start;
            }
        }
        Ok(removed)
    }

    fn selection(&self) -> Option<(usize, usize)> {
        if self.anchor == self.cursor {
            None
        } else {
            Some((self.anchor.min(self.cursor), self.anchor.max(self.cursor)))
        }
    }

    fn select_range(&mut self, start: usize, end: usize) {
        self.anchor = start.min(self.len_chars);
        self.cursor = end.min(self.len_chars);
    }

    fn place_cursor(&mut self, position: usize) {
        let position = position.min(self.len_chars);
        self.anchor = position;
        self.cursor = position;
    }
}

macro_rules! delegate_text_buffer {
    () => {
        fn text(&self) -> &str {
            &self.store.text
        }

        fn set_text(&mut self, text: &str) {
            self.store.set_text(text);
        }

        fn len_chars(&self) -> usize {
            self.store.len_chars
        }

        fn insert(&mut self, position: usize, text: &str) -> Result<()> {
            self.store.insert(position, text)
        }

        fn delete(&mut self, start: usize, end: usize) -> Result<String> {
            self.store.delete(start, end)
        }

        fn modified(&self) -> bool {
            self.store.modified
        }

        fn set_modified(&mut self, modified: bool) {
            self.store.modified = modified;
        }

        fn cursor(&self) -> usize {
            self.store.cursor
        }

        fn selection(&self) -> Option<(usize, usize)> {
            self.store.selection()
        }

        fn select_range(&mut self, start: usize, end: usize) {
            self.store.select_range(start, end);
        }

        fn place_cursor(&mut self, position: usize) {
            self.store.place_cursor(position);
        }
    };
}

/// 構文ハイライトなしのバッファ
#[derive(Debug, Clone, Default)]
pub struct PlainTextBuffer {
    store: TextStore,
}

impl PlainTextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(text: &str) -> Self {
        Self {
            store: TextStore::from_str(text),
        }
    }
}

impl TextBuffer for PlainTextBuffer {
    delegate_text_buffer!();
}

/// 構文ハイライト対応のバッファ
///
/// 言語はファイル名の拡張子から推定する。ハイライト自体はウィジェット側の仕事。
#[derive(Debug, Clone, Default)]
pub struct SourceTextBuffer {
    store: TextStore,
    language: Option<&'static str>,
}

impl SourceTextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// パスから言語を推定して作成
    pub fn for_path(path: Option<&Path>) -> Self {
        Self {
            store: TextStore::default(),
            language: path.and_then(guess_language),
        }
    }
}

impl TextBuffer for SourceTextBuffer {
    delegate_text_buffer!();

    fn language(&self) -> Option<&str> {
        self.language
    }
}

/// 拡張子から言語名を推定
pub fn guess_language(path: &Path) -> Option<&'static str> {
    let file_name = path.file_name()?.to_str()?;
    match file_name {
        "Makefile" | "makefile" | "GNUmakefile" => return Some("makefile"),
        "Dockerfile" => return Some("dockerfile"),
        _ => {}
    }

    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let language = match extension.as_str() {
        "rs" => "rust",
        "py" | "pyw" => "python",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "json" => "json",
        "toml" => "toml",
        "yml" | "yaml" => "yaml",
        "md" | "markdown" => "markdown",
        "html" | "htm" => "html",
        "css" => "css",
        "sh" | "bash" => "sh",
        "xml" => "xml",
        "go" => "go",
        "java" => "java",
        _ => return None,
    };
    Some(language)
}

/// 文字インデックスをバイトインデックスへ変換（末尾を超えたら長さ）
pub fn char_to_byte_index(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// 文字インデックス範囲で部分文字列を取り出す
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let start_byte = char_to_byte_index(text, start);
    let end_byte = char_to_byte_index(text, end);
    &text[start_byte..end_byte.max(start_byte)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_use_char_offsets() {
        let mut buffer = PlainTextBuffer::from_str("あいう");
        buffer.insert(1, "X").unwrap();
        assert_eq!(buffer.text(), "あXいう");
        assert_eq!(buffer.len_chars(), 4);

        let removed = buffer.delete(1, 3).unwrap();
        assert_eq!(removed, "Xい");
        assert_eq!(buffer.text(), "あう");
    }

    #[test]
    fn out_of_bounds_insert_is_rejected() {
        let mut buffer = PlainTextBuffer::from_str("abc");
        assert!(buffer.insert(4, "x").is_err());
        assert!(buffer.delete(2, 5).is_err());
        assert!(buffer.delete(2, 1).is_err());
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn marks_follow_edits() {
        let mut buffer = PlainTextBuffer::from_str("hello world");
        buffer.select_range(6, 11);
        buffer.insert(0, ">> ").unwrap();
        assert_eq!(buffer.selection(), Some((9, 14)));

        buffer.delete(0, 10).unwrap();
        assert_eq!(buffer.selection(), Some((0, 4)));
    }

    #[test]
    fn typing_at_cursor_moves_cursor() {
        let mut buffer = PlainTextBuffer::from_str("ab");
        buffer.place_cursor(1);
        buffer.insert(1, "xy").unwrap();
        assert_eq!(buffer.cursor(), 3);
        assert_eq!(buffer.selection(), None);
    }

    #[test]
    fn source_buffer_guesses_language() {
        let buffer = SourceTextBuffer::for_path(Some(Path::new("/tmp/main.rs")));
        assert_eq!(buffer.language(), Some("rust"));

        let unknown = SourceTextBuffer::for_path(Some(Path::new("notes.unknown")));
        assert_eq!(unknown.language(), None);

        assert_eq!(guess_language(Path::new("Makefile")), Some("makefile"));
    }

    #[test]
    fn slice_chars_handles_multibyte() {
        assert_eq!(slice_chars("héllo", 1, 3), "él");
        assert_eq!(slice_chars("abc", 2, 10), "c");
    }
}
