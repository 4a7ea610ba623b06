//! 表示状態
//!
//! タイトルとボタンの有効状態は、常に現在のバッファ状態だけから計算する。

use crate::buffer::DocumentBuffer;
use std::path::Path;

/// アプリケーション表示名
pub const APP_TITLE: &str = "MfaText";

/// 名前の無いドキュメントの表示名
pub const UNTITLED: &str = "Untitled";

/// UI に反映する表示状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    /// ヘッダーバーのラベル（例: "* notes.txt"）
    pub label: String,
    /// ウィンドウタイトル（例: "* notes.txt - MfaText"）
    pub window_title: String,
    pub save_enabled: bool,
    pub undo_enabled: bool,
    pub redo_enabled: bool,
    pub language: Option<String>,
}

impl DisplayState {
    /// バッファが無いときの表示
    pub fn empty() -> Self {
        Self {
            label: APP_TITLE.to_string(),
            window_title: APP_TITLE.to_string(),
            save_enabled: false,
            undo_enabled: false,
            redo_enabled: false,
            language: None,
        }
    }

    pub fn from_buffer(buffer: &DocumentBuffer) -> Self {
        let marker = if buffer.is_modified() { "* " } else { "" };
        let label = format!("{}{}", marker, document_name(buffer.file_path()));
        Self {
            window_title: format!("{} - {}", label, APP_TITLE),
            label,
            save_enabled: buffer.is_modified(),
            undo_enabled: buffer.can_undo(),
            redo_enabled: buffer.can_redo(),
            language: buffer.language().map(str::to_string),
        }
    }
}

/// ドキュメントの表示名
pub fn document_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNTITLED.to_string())
}
