//! mfatext - GNOME 風テキストエディタのコア
//!
//! ドキュメントバッファと編集履歴、リテラル検索・置換、ウィンドウ単位のセッション

// コアモジュール
pub mod config;
pub mod error;
pub mod frontend;
pub mod logging;

// データ層
pub mod buffer;
pub mod file;

// ロジック層
pub mod search;
pub mod session;

// 公開API
pub use buffer::{DocumentBuffer, Edit};
pub use config::EditorConfig;
pub use error::{MfaError, Result};
pub use frontend::ConsoleApplication;
pub use search::{SearchEngine, SearchOptions};
pub use session::{BufferFactory, EditorSession, WindowShell};
