//! エラーハンドリングシステム
//!
//! mfatext 全体で使用される統一されたエラー型とユーティリティを定義
//! すべてのエラーは回復可能。I/O とパスのエラーはダイアログで表示し、
//! 検索・置換のエラーは呼び出し側で黙って無視される。

use std::path::Path;
use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MfaError {
    /// ファイル操作エラー
    #[error(transparent)]
    File(#[from] FileError),

    /// 編集操作エラー
    #[error(transparent)]
    Edit(#[from] EditError),

    /// 検索・置換エラー
    #[error(transparent)]
    Search(#[from] SearchError),

    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 保存先パスが決まっていない
    #[error("No file path available for saving")]
    NoPath,

    /// 現在のセッション状態では実行できない操作
    #[error("Operation not allowed in state {state}: {operation}")]
    InvalidState { state: String, operation: String },
}

/// ファイル操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Failed to decode {path} as {encoding}")]
    Decode { path: String, encoding: String },

    #[error("Failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("IO error: {message}")]
    Io { message: String },

    /// 同じバッファで別の I/O が進行中
    #[error("Another load or save is in progress for {path}")]
    Busy { path: String },
}

impl FileError {
    pub fn not_found(path: &Path) -> Self {
        FileError::NotFound {
            path: path.display().to_string(),
        }
    }

    pub fn write_failed(path: &Path, message: impl Into<String>) -> Self {
        FileError::WriteFailed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}

/// 編集操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Position {position} is out of bounds (length {len})")]
    OutOfBounds { position: usize, len: usize },

    #[error("Invalid range {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

/// 検索・置換固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// 報告済みマッチが内容の変更で無効になった
    #[error("Match {start}..{end} is stale")]
    StaleMatch { start: usize, end: usize },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    /// 操作を黙って取りやめるだけのもの
    Silent,
    /// エラーダイアログで知らせるもの
    Error,
}

/// エラー表示情報
#[derive(Debug, Clone)]
pub struct ErrorDisplay {
    /// ダイアログに表示するメッセージ
    pub message: String,
    /// エラーレベル
    pub level: ErrorLevel,
}

impl ErrorDisplay {
    /// 操作名を添えて表示情報を作る（例: "open file"）
    pub fn new(operation: &str, error: &MfaError) -> Self {
        let level = match error {
            MfaError::Search(_) => ErrorLevel::Silent,
            _ => ErrorLevel::Error,
        };
        let message = match error {
            MfaError::File(FileError::NotFound { path }) => {
                format!("Failed to {}: file not found: {}", operation, path)
            }
            MfaError::File(FileError::Decode { path, encoding }) => {
                format!(
                    "Failed to {}: {} could not be decoded as {}",
                    operation, path, encoding
                )
            }
            other => format!("Failed to {}: {}", operation, other),
        };
        Self { message, level }
    }

    pub fn is_silent(&self) -> bool {
        self.level == ErrorLevel::Silent
    }
}

/// パニックハンドラの設定
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        log::error!("PANIC at {}: {}", location, message);
        eprintln!("PANIC at {}: {}", location, message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());
        std::process::exit(1);
    }));
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, MfaError>;

/// 各モジュール固有のResult型
pub mod file {
    pub type Result<T> = std::result::Result<T, super::FileError>;
}

impl From<std::io::Error> for FileError {
    fn from(error: std::io::Error) -> Self {
        FileError::Io {
            message: error.to_string(),
        }
    }
}

impl From<std::io::Error> for MfaError {
    fn from(error: std::io::Error) -> Self {
        MfaError::File(error.into())
    }
}
