//! パス展開
//!
//! `~` と環境変数を展開し、相対パスはカレントディレクトリ基準の絶対パスにする。

use crate::error::file::Result;
use crate::error::FileError;
use std::path::PathBuf;

/// ユーザー入力のパスを展開
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains('\0') {
        return Err(FileError::InvalidPath {
            path: raw.to_string(),
        });
    }

    let expanded = shellexpand::full(trimmed).map_err(|e| FileError::InvalidPath {
        path: format!("{} ({})", trimmed, e),
    })?;
    let path = PathBuf::from(expanded.as_ref());

    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
