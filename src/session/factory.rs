//! ドキュメントバッファの生成

use crate::buffer::{DocumentBuffer, PlainTextBuffer, SourceTextBuffer, TextBuffer};
use crate::config::EditorConfig;
use crate::file::{FileMonitor, NotifyFileMonitor, NullFileMonitor};
use std::path::Path;

/// 設定に応じてテキストバッファとファイル監視を選ぶ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFactory {
    pub syntax_highlighting: bool,
    pub watch_files: bool,
}

impl Default for BufferFactory {
    fn default() -> Self {
        Self {
            syntax_highlighting: true,
            watch_files: true,
        }
    }
}

impl BufferFactory {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            syntax_highlighting: config.syntax_highlighting,
            watch_files: true,
        }
    }

    /// `path` を開く予定のバッファを作成（読み込みはしない）
    pub fn create(&self, path: Option<&Path>) -> DocumentBuffer {
        let text: Box<dyn TextBuffer> = if self.syntax_highlighting {
            Box::new(SourceTextBuffer::for_path(path))
        } else {
            Box::new(PlainTextBuffer::new())
        };
        DocumentBuffer::new(text, self.create_monitor())
    }

    fn create_monitor(&self) -> Box<dyn FileMonitor> {
        if !self.watch_files {
            return Box::new(NullFileMonitor::new());
        }
        match NotifyFileMonitor::new() {
            Ok(monitor) => Box::new(monitor),
            Err(e) => {
                log::warn!("File monitoring unavailable: {}", e);
                Box::new(NullFileMonitor::new())
            }
        }
    }
}
