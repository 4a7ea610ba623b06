//! ロギングシステム
//!
//! `log` クレートのファサードに接続するロガー。stderr とログファイルへ出力する。

use crate::config::LoggingConfig;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// ログレベルを上書きする環境変数
pub const LOG_ENV_VAR: &str = "MFATEXT_LOG";

/// ロガー
#[derive(Debug)]
pub struct Logger {
    level: LevelFilter,
    output_stderr: bool,
    output_file: Option<PathBuf>,
    file_lock: Mutex<()>,
}

impl Logger {
    /// デフォルト構築
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
            file_lock: Mutex::new(()),
        }
    }

    /// 設定から構築（環境変数が優先）
    pub fn from_config(config: &LoggingConfig) -> Self {
        let level = std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|value| parse_level(&value))
            .or_else(|| parse_level(&config.level))
            .unwrap_or(LevelFilter::Info);

        let mut logger = Self::new(level);
        if let Some(path) = &config.file {
            logger = logger.with_file_output(path.clone());
        }
        logger
    }

    /// ログレベルを取得
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化（テスト向け）
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    fn should_log(&self, level: Level) -> bool {
        level <= self.level
    }

    fn write_line(&self, line: &str) {
        if self.output_stderr {
            eprintln!("{}", line);
        }

        if let Some(path) = &self.output_file {
            let _guard = self.file_lock.lock();
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", line);
            }
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.should_log(metadata.level())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = record.args().to_string();
        self.write_line(&format_record(record.level(), record.target(), &message));
    }

    fn flush(&self) {}
}

fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("{:<5} [{}] {}", level, target, message)
}

/// レベル名を解釈（"debug", "INFO" など）
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// グローバルロガーを設定する。二度目以降の呼び出しは無視される。
pub fn init(config: &LoggingConfig) {
    let logger = Logger::from_config(config);
    let level = logger.level();
    if let Some(path) = &logger.output_file {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn logger_respects_log_level() {
        let logger = Logger::new(LevelFilter::Debug).without_stderr();
        assert!(logger.should_log(Level::Debug));
        assert!(logger.should_log(Level::Error));
        assert!(!logger.should_log(Level::Trace));

        let info_logger = Logger::new(LevelFilter::Info).without_stderr();
        assert!(!info_logger.should_log(Level::Debug));
        assert!(info_logger.should_log(Level::Warn));
    }

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("warning"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn writes_to_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mfatext.log");
        let logger = Logger::new(LevelFilter::Info)
            .without_stderr()
            .with_file_output(&path);

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .target("mfatext::test")
                .args(format_args!("file changed"))
                .build(),
        );

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "WARN  [mfatext::test] file changed\n");
    }
}
