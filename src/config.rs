//! エディタ設定
//!
//! `$XDG_CONFIG_HOME/mfatext/config.json` から読み込む。ファイルが無ければ既定値。

use crate::error::{ConfigError, MfaError, Result};
use crate::file::io::Encoding;
use crate::file::xdg;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// アプリケーション名（XDG ディレクトリ名に使用）
pub const APP_NAME: &str = "mfatext";

/// 設定ファイル名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 検索の既定設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub case_sensitive: bool,
    pub wrap_around: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            wrap_around: true,
        }
    }
}

/// トースト通知の表示時間（ミリ秒）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub file_event_ms: u64,
    pub search_wrapped_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            file_event_ms: 2000,
            search_wrapped_ms: 1000,
        }
    }
}

impl NotificationConfig {
    pub fn file_event(&self) -> Duration {
        Duration::from_millis(self.file_event_ms)
    }

    pub fn search_wrapped(&self) -> Duration {
        Duration::from_millis(self.search_wrapped_ms)
    }
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// エディタ全体の設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub search: SearchConfig,
    pub default_encoding: String,
    pub syntax_highlighting: bool,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            default_encoding: Encoding::Utf8.label().to_string(),
            syntax_highlighting: true,
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EditorConfig {
    /// 既定の設定ファイルパス
    pub fn default_path() -> PathBuf {
        xdg::user_config_dir(APP_NAME).join(CONFIG_FILE_NAME)
    }

    /// 既定の場所から読み込む
    pub fn load_default() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// 指定パスから読み込む。存在しなければ既定値を返す。
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&raw).map_err(|e| {
            MfaError::Config(ConfigError::InvalidFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 保存時の既定エンコーディング
    pub fn encoding(&self) -> Result<Encoding> {
        Encoding::from_label(&self.default_encoding).ok_or_else(|| {
            MfaError::Config(ConfigError::InvalidValue {
                key: "default_encoding".to_string(),
                value: self.default_encoding.clone(),
            })
        })
    }

    fn validate(&self) -> Result<()> {
        self.encoding()?;
        if crate::logging::parse_level(&self.logging.level).is_none() {
            return Err(MfaError::Config(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            }));
        }
        Ok(())
    }
}
