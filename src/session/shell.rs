//! ウィンドウシェル（UI 側の協調者）
//!
//! ダイアログやファイル選択は非同期。シェルは要求を受け取るだけで、
//! 応答は後から `EditorSession::respond` や `open_file` などで返す。

use super::display::DisplayState;
use std::time::Duration;

/// 未保存確認ダイアログへの応答
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResponse {
    Save,
    Discard,
    Cancel,
}

impl ConfirmResponse {
    /// 応答ID
    pub fn id(self) -> &'static str {
        match self {
            ConfirmResponse::Save => "save",
            ConfirmResponse::Discard => "discard",
            ConfirmResponse::Cancel => "cancel",
        }
    }

    /// ボタンラベル
    pub fn label(self) -> &'static str {
        match self {
            ConfirmResponse::Save => "Save",
            ConfirmResponse::Discard => "Discard Changes",
            ConfirmResponse::Cancel => "Cancel",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "save" | "s" => Some(ConfirmResponse::Save),
            "discard" | "d" => Some(ConfirmResponse::Discard),
            "cancel" | "c" => Some(ConfirmResponse::Cancel),
            _ => None,
        }
    }
}

/// 確認ダイアログの要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub options: Vec<ConfirmResponse>,
    pub default_response: ConfirmResponse,
}

impl ConfirmRequest {
    /// 未保存の変更についての確認
    pub fn unsaved_changes(document_name: &str) -> Self {
        Self {
            title: "Unsaved Changes".to_string(),
            message: format!(
                "You have unsaved changes to {}. Save changes before closing?",
                document_name
            ),
            options: vec![
                ConfirmResponse::Cancel,
                ConfirmResponse::Discard,
                ConfirmResponse::Save,
            ],
            default_response: ConfirmResponse::Save,
        }
    }
}

/// UI 側が提供する機能
pub trait WindowShell {
    /// 確認ダイアログを表示（応答は非同期）
    fn confirm(&mut self, request: &ConfirmRequest);

    /// 一時的な通知
    fn notify_transient(&mut self, message: &str, duration: Duration);

    /// エラーダイアログ
    fn show_error(&mut self, message: &str);

    /// 表示状態（タイトル、ボタンの有効状態）を反映
    fn update_display(&mut self, display: &DisplayState);

    /// 開くファイルの選択を要求（応答は `open_file`）
    fn choose_open_path(&mut self);

    /// 保存先の選択を要求（応答は `save_as` または `cancel_save_as`）
    fn choose_save_path(&mut self, suggested_name: &str);

    /// ウィンドウを閉じる
    fn close(&mut self);
}
