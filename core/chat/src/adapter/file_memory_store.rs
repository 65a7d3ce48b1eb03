//! 会話メモリを JSON ファイル 1 つに保存・読み込みするアダプタ

use crate::domain::MemorySnapshot;
use crate::ports::outbound::MemoryStore;
use common::error::Error;
use common::ports::outbound::{FileSystem, Log, LogLevel, LogRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 既定の保存ファイル名
pub const DEFAULT_MEMORY_FILENAME: &str = "conversation_memory.json";

/// JSON ファイル 1 つに {history, summaries} を書く MemoryStore 実装
///
/// 書き込みは一時ファイル経由の rename で置き換える。
pub struct FileMemoryStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    log: Arc<dyn Log>,
}

impl FileMemoryStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>, log: Arc<dyn Log>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
            log,
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl MemoryStore for FileMemoryStore {
    fn save(&self, snapshot: &MemorySnapshot) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| Error::json(e.to_string()))?;
        let tmp = self.tmp_path();
        self.fs.write(&tmp, &json)?;
        self.fs.rename(&tmp, &self.path)
    }

    fn load(&self) -> Result<Option<MemorySnapshot>, Error> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let bytes = match self.fs.read_bytes(&self.path) {
            Ok(b) => b,
            Err(e) => {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Warn, "memory file unreadable")
                        .layer("adapter")
                        .kind("persistence")
                        .field("path", self.path.display().to_string())
                        .field("error", e.to_string()),
                );
                return Ok(None);
            }
        };
        // 読めたが UTF-8 でない中身は壊れたファイルとして扱う（上書きさせない）
        let body = String::from_utf8(bytes)
            .map_err(|e| Error::json(format!("{}: invalid UTF-8: {}", self.path.display(), e)))?;
        serde_json::from_str::<MemorySnapshot>(&body)
            .map(Some)
            .map_err(|e| Error::json(format!("{}: {}", self.path.display(), e)))
    }
}
