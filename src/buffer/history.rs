//! 編集履歴（undo/redo）
//!
//! 線形履歴のみを扱う。新しい編集は redo スタックを破棄する。

use super::text::TextBuffer;
use crate::error::Result;

/// コマンド種別（履歴の結合判定用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommandKind {
    InsertChar,
    DeleteBackward,
    Other,
}

/// 履歴操作の最小単位（位置は文字インデックス）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicEdit {
    Insert { position: usize, text: String },
    Delete { position: usize, text: String },
}

impl AtomicEdit {
    /// 逆操作
    pub fn inverse(&self) -> AtomicEdit {
        match self {
            AtomicEdit::Insert { position, text } => AtomicEdit::Delete {
                position: *position,
                text: text.clone(),
            },
            AtomicEdit::Delete { position, text } => AtomicEdit::Insert {
                position: *position,
                text: text.clone(),
            },
        }
    }

    /// バッファへ適用
    pub fn apply_to(&self, buffer: &mut dyn TextBuffer) -> Result<()> {
        match self {
            AtomicEdit::Insert { position, text } => buffer.insert(*position, text),
            AtomicEdit::Delete { position, text } => {
                let end = *position + text.chars().count();
                buffer.delete(*position, end).map(|_| ())
            }
        }
    }
}

/// 履歴エントリ
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub command_kind: HistoryCommandKind,
    pub operations: Vec<AtomicEdit>,
    pub cursor_before: usize,
    pub cursor_after: usize,
}

impl HistoryEntry {
    pub fn new(
        command_kind: HistoryCommandKind,
        operations: Vec<AtomicEdit>,
        cursor_before: usize,
        cursor_after: usize,
    ) -> Self {
        Self {
            sequence: 0,
            command_kind,
            operations,
            cursor_before,
            cursor_after,
        }
    }

    /// 取り消し（操作を逆順に逆適用）
    pub fn revert(&self, buffer: &mut dyn TextBuffer) -> Result<()> {
        for op in self.operations.iter().rev() {
            op.inverse().apply_to(buffer)?;
        }
        buffer.place_cursor(self.cursor_before);
        Ok(())
    }

    /// やり直し
    pub fn reapply(&self, buffer: &mut dyn TextBuffer) -> Result<()> {
        for op in &self.operations {
            op.apply_to(buffer)?;
        }
        buffer.place_cursor(self.cursor_after);
        Ok(())
    }

    fn try_merge_with(&self, other: &HistoryEntry) -> bool {
        match (self.command_kind, other.command_kind) {
            (HistoryCommandKind::InsertChar, HistoryCommandKind::InsertChar) => {
                can_merge_insert(self, other)
            }
            (HistoryCommandKind::DeleteBackward, HistoryCommandKind::DeleteBackward) => {
                can_merge_delete(self, other)
            }
            _ => false,
        }
    }

    fn merge_with(&mut self, other: HistoryEntry) {
        let (Some(prev_op), Some(other_op)) =
            (self.operations.first_mut(), other.operations.into_iter().next())
        else {
            return;
        };

        match (prev_op, other_op) {
            (
                AtomicEdit::Insert {
                    text: prev_text, ..
                },
                AtomicEdit::Insert {
                    text: other_text, ..
                },
            ) => prev_text.push_str(&other_text),
            (
                AtomicEdit::Delete {
                    position: prev_pos,
                    text: prev_text,
                },
                AtomicEdit::Delete {
                    position: other_pos,
                    text: mut other_text,
                },
            ) => {
                *prev_pos = other_pos;
                other_text.push_str(prev_text);
                *prev_text = other_text;
            }
            _ => return,
        }
        self.cursor_after = other.cursor_after;
    }
}

fn single_op(entry: &HistoryEntry) -> Option<&AtomicEdit> {
    match entry.operations.as_slice() {
        [op] => Some(op),
        _ => None,
    }
}

fn can_merge_insert(prev: &HistoryEntry, new: &HistoryEntry) -> bool {
    match (single_op(prev), single_op(new)) {
        (
            Some(AtomicEdit::Insert {
                position: prev_pos,
                text: prev_text,
            }),
            Some(AtomicEdit::Insert {
                position: new_pos,
                text: new_text,
            }),
        ) => {
            is_word_text(prev_text)
                && is_word_text(new_text)
                && *new_pos == prev_pos + prev_text.chars().count()
        }
        _ => false,
    }
}

fn can_merge_delete(prev: &HistoryEntry, new: &HistoryEntry) -> bool {
    match (single_op(prev), single_op(new)) {
        (
            Some(AtomicEdit::Delete {
                position: prev_pos,
                text: prev_text,
            }),
            Some(AtomicEdit::Delete {
                position: new_pos,
                text: new_text,
            }),
        ) => {
            is_word_text(prev_text)
                && is_word_text(new_text)
                && new_pos + new_text.chars().count() == *prev_pos
        }
        _ => false,
    }
}

fn is_word_text(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// 編集履歴スタック
///
/// 保存時点（クリーンポイント）を記録し、変更フラグの判定に使う。
/// クリーンポイントは保存時の undo 先頭エントリの番号で表す。
#[derive(Debug, Clone)]
pub struct HistoryStack {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    next_sequence: u64,
    /// `None` はクリーン状態へもう戻れないことを示す
    clean_point: Option<Option<u64>>,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            next_sequence: 1,
            clean_point: Some(None),
        }
    }
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// 新しい編集を記録（redo は破棄）
    pub fn push(&mut self, mut entry: HistoryEntry) {
        // クリーンポイントが redo 側にあれば、もう到達できない
        if let Some(Some(clean)) = self.clean_point {
            if self.redo.iter().any(|e| e.sequence == clean) {
                self.clean_point = None;
            }
        }
        self.redo.clear();

        let top_is_clean = self.clean_point == Some(self.top_sequence());
        if let Some(last) = self.undo.last_mut() {
            if !top_is_clean && last.try_merge_with(&entry) {
                last.merge_with(entry);
                return;
            }
        }

        entry.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.undo.push(entry);
    }

    pub fn take_for_undo(&mut self) -> Option<HistoryEntry> {
        self.undo.pop()
    }

    pub fn push_redo(&mut self, entry: HistoryEntry) {
        self.redo.push(entry);
    }

    pub fn take_for_redo(&mut self) -> Option<HistoryEntry> {
        self.redo.pop()
    }

    /// redo を破棄せずに undo へ戻す
    pub fn push_without_clearing(&mut self, entry: HistoryEntry) {
        self.undo.push(entry);
    }

    /// 現在の状態を保存済みとして記録
    pub fn mark_clean(&mut self) {
        self.clean_point = Some(self.top_sequence());
    }

    /// 現在の状態が保存時点と一致するか
    pub fn is_clean(&self) -> bool {
        self.clean_point == Some(self.top_sequence())
    }

    /// 履歴を破棄し、現在の状態をクリーンとする
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.clean_point = Some(None);
    }

    fn top_sequence(&self) -> Option<u64> {
        self.undo.last().map(|e| e.sequence)
    }
}
