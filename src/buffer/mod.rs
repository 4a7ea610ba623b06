//! バッファ管理
//!
//! テキストバッファ・ケイパビリティ、編集履歴、変更通知、ドキュメントバッファ

pub mod document;
pub mod history;
pub mod notifier;
pub mod text;

pub use document::{
    BufferEvent, BufferEventKind, BufferState, ChangeOrigin, DocumentBuffer, Edit, EditTransaction,
};
pub use history::{AtomicEdit, HistoryCommandKind, HistoryEntry, HistoryStack};
pub use notifier::{ChangeListener, ChangeNotifier, ListenerId};
pub use text::{NativeHistory, PlainTextBuffer, SourceTextBuffer, TextBuffer};
