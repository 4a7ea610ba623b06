//! ファイル変更監視
//!
//! 外部でのファイル変更を購読する。通知は勧告的なもので、
//! 実際に変更があったかの判定は `DocumentBuffer` が更新時刻で行う。

use crate::error::{FileError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

/// ファイル監視のインターフェース
pub trait FileMonitor {
    /// 監視対象を `path` に切り替える（既存の購読は解除される）
    fn watch(&mut self, path: &Path) -> Result<()>;

    /// 購読を解除
    fn unwatch(&mut self);

    /// 前回の呼び出し以降に変更通知が届いたかを返し、保留分を消費する
    fn take_pending(&mut self) -> bool;

    /// 監視中のパス
    fn watched_path(&self) -> Option<&Path>;
}

/// 何も監視しないモニター（監視を設定できない環境やテスト用）
#[derive(Debug, Default)]
pub struct NullFileMonitor {
    path: Option<PathBuf>,
}

impl NullFileMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileMonitor for NullFileMonitor {
    fn watch(&mut self, path: &Path) -> Result<()> {
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self) {
        self.path = None;
    }

    fn take_pending(&mut self) -> bool {
        false
    }

    fn watched_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// `notify` クレートによる監視
///
/// 保存時のリネーム置換でも購読が切れないよう、親ディレクトリを非再帰で監視し
/// 対象ファイルのイベントだけを拾う。
pub struct NotifyFileMonitor {
    watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    path: Option<PathBuf>,
    watched_dir: Option<PathBuf>,
}

impl NotifyFileMonitor {
    pub fn new() -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(tx).map_err(watch_error)?;
        Ok(Self {
            watcher,
            rx,
            path: None,
            watched_dir: None,
        })
    }

    fn is_relevant(&self, event: &Event) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        matches!(
            event.kind,
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Any
        ) && event.paths.iter().any(|p| p == path)
    }
}

impl FileMonitor for NotifyFileMonitor {
    fn watch(&mut self, path: &Path) -> Result<()> {
        self.unwatch();

        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        self.watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(watch_error)?;
        log::debug!("Watching {} for external changes", target.display());

        self.path = Some(target);
        self.watched_dir = Some(dir);
        Ok(())
    }

    fn unwatch(&mut self) {
        if let Some(dir) = self.watched_dir.take() {
            if let Err(e) = self.watcher.unwatch(&dir) {
                log::debug!("Failed to unwatch {}: {}", dir.display(), e);
            }
        }
        self.path = None;
        // 古い購読の通知を捨てる
        while self.rx.try_recv().is_ok() {}
    }

    fn take_pending(&mut self) -> bool {
        let mut pending = false;
        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(event) => pending |= self.is_relevant(&event),
                Err(e) => log::warn!("File monitor error: {:?}", e),
            }
        }
        pending
    }

    fn watched_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for NotifyFileMonitor {
    fn drop(&mut self) {
        self.unwatch();
    }
}

fn watch_error(error: notify::Error) -> crate::error::MfaError {
    FileError::Io {
        message: format!("file monitor: {}", error),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_monitor_tracks_path_but_never_fires() {
        let mut monitor = NullFileMonitor::new();
        monitor.watch(Path::new("/tmp/a.txt")).unwrap();
        assert_eq!(monitor.watched_path(), Some(Path::new("/tmp/a.txt")));
        assert!(!monitor.take_pending());

        monitor.unwatch();
        assert!(monitor.watched_path().is_none());
    }
}
