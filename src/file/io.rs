//! ファイルI/O操作
//!
//! テキストファイルの読み込み（UTF-8 → Latin-1 フォールバック）と保存

use crate::error::file::Result;
use crate::error::FileError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// 対応するテキストエンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    /// 表示・設定用のラベル
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
        }
    }

    /// ラベルから解釈（大文字小文字・別名を許容）
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Some(Encoding::Latin1),
            _ => None,
        }
    }

    /// `text` のすべての文字を表現できるか
    pub fn can_encode(self, text: &str) -> bool {
        match self {
            Encoding::Utf8 => true,
            Encoding::Latin1 => text.chars().all(|ch| u32::from(ch) <= 0xFF),
        }
    }

    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            // Latin-1 はすべてのバイト値を表現できる
            Encoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    fn encode(self, text: &str) -> std::result::Result<Vec<u8>, char> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Latin1 => text
                .chars()
                .map(|ch| u8::try_from(u32::from(ch)).map_err(|_| ch))
                .collect(),
        }
    }
}

/// 読み込み結果
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedText {
    pub text: String,
    /// 検出された（または指定された）エンコーディング
    pub encoding: Encoding,
}

/// エンコーディングを自動判定して読み込む
pub fn load_text(path: &Path) -> Result<LoadedText> {
    let bytes = read_bytes(path)?;
    for encoding in [Encoding::Utf8, Encoding::Latin1] {
        if let Some(text) = encoding.decode(&bytes) {
            log::debug!("Loaded {} as {}", path.display(), encoding.label());
            return Ok(LoadedText { text, encoding });
        }
    }
    // Latin-1 は失敗しないので到達しない
    Err(decode_error(path, Encoding::Latin1))
}

/// 指定エンコーディングで厳密に読み込む
pub fn load_text_as(path: &Path, encoding: Encoding) -> Result<LoadedText> {
    let bytes = read_bytes(path)?;
    let text = encoding
        .decode(&bytes)
        .ok_or_else(|| decode_error(path, encoding))?;
    Ok(LoadedText { text, encoding })
}

/// テキストを保存（親ディレクトリ作成・一時ファイル経由のアトミック保存）
pub fn save_text(path: &Path, text: &str, encoding: Encoding) -> Result<()> {
    let bytes = encoding.encode(text).map_err(|ch| {
        FileError::write_failed(
            path,
            format!(
                "character U+{:04X} cannot be encoded as {}",
                u32::from(ch),
                encoding.label()
            ),
        )
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| FileError::write_failed(path, e.to_string()))?;
        }
    }

    let temp_path = temp_path_for(path)?;
    fs::write(&temp_path, &bytes)
        .and_then(|()| fs::rename(&temp_path, path))
        .map_err(|e| {
            // 書き込み途中の一時ファイルを残さない
            let _ = fs::remove_file(&temp_path);
            FileError::write_failed(path, e.to_string())
        })?;

    log::debug!("Saved {} as {}", path.display(), encoding.label());
    Ok(())
}

/// ファイルの最終更新時刻
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FileError::not_found(path)
        } else {
            FileError::from(e)
        }
    })?;
    Ok(metadata.modified()?)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(FileError::not_found(path));
    }
    if path.is_dir() {
        return Err(FileError::InvalidPath {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read(path)?)
}

fn decode_error(path: &Path, encoding: Encoding) -> FileError {
    FileError::Decode {
        path: path.display().to_string(),
        encoding: encoding.label().to_string(),
    }
}

fn temp_path_for(original: &Path) -> Result<PathBuf> {
    let filename = original.file_name().ok_or_else(|| FileError::InvalidPath {
        path: original.display().to_string(),
    })?;
    let temp_name = format!(".{}_{}.tmp", filename.to_string_lossy(), std::process::id());
    Ok(original.with_file_name(temp_name))
}
