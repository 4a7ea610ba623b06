//! ファイル操作モジュール
//!
//! - 読み込みは UTF-8 を試し、失敗したら Latin-1
//! - 保存は一時ファイル経由のアトミック書き込み
//! - 外部変更の監視、パス展開と XDG ディレクトリ解決

pub mod io;
pub mod monitor;
pub mod path;
pub mod xdg;

pub use io::{load_text, load_text_as, modified_time, save_text, Encoding, LoadedText};
pub use monitor::{FileMonitor, NotifyFileMonitor, NullFileMonitor};
pub use path::expand_path;
