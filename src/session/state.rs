//! セッション状態

use std::fmt;

/// 確認の後に再開する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseIntent {
    New,
    Open,
    Close,
}

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// まだバッファを表示していない
    Empty,
    /// 編集中（ダイアログなし）
    Editing,
    /// 未保存確認ダイアログの応答待ち
    AwaitingCloseConfirmation(CloseIntent),
    /// 終了済み
    Closed,
}

impl SessionState {
    pub fn is_editing(self) -> bool {
        self == SessionState::Editing
    }

    pub fn pending_intent(self) -> Option<CloseIntent> {
        match self {
            SessionState::AwaitingCloseConfirmation(intent) => Some(intent),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Empty => write!(f, "Empty"),
            SessionState::Editing => write!(f, "Editing"),
            SessionState::AwaitingCloseConfirmation(intent) => {
                write!(f, "AwaitingCloseConfirmation({:?})", intent)
            }
            SessionState::Closed => write!(f, "Closed"),
        }
    }
}

/// 保存先選択の用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveAsPurpose {
    /// 単純な「名前を付けて保存」
    Plain,
    /// 確認ダイアログで「保存」が選ばれた後
    Resume(CloseIntent),
}
