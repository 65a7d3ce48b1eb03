//! Log 実装
//!
//! - FileJsonLog: ファイルへ JSONL で追記
//! - StderrLog: --verbose 用に stderr へ 1 行ずつ要点を出す
//! - TeeLog: 複数の Log へ書き分ける
//! - NoopLog: 何もしない（テスト用）

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogLevel, LogRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent)?;
            }
        }
        let mut w = self.fs.open_append(&self.path)?;
        let line = serde_json::to_string(record).map_err(|e| Error::json(e.to_string()))?;
        use std::io::Write;
        w.write_all(line.as_bytes())
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.write_all(b"\n")
            .map_err(|e| Error::io_msg(e.to_string()))?;
        w.flush().map_err(|e| Error::io_msg(e.to_string()))?;
        Ok(())
    }
}

/// stderr へ人間向けに出力する Log 実装（max_level より詳細なものは捨てる）
pub struct StderrLog {
    max_level: LogLevel,
}

impl StderrLog {
    pub fn new(max_level: LogLevel) -> Self {
        Self { max_level }
    }
}

/// fields を `k=v` の並びにする
fn format_fields(record: &LogRecord) -> String {
    match &record.fields {
        Some(fields) if !fields.is_empty() => fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if record.level > self.max_level {
            return Ok(());
        }
        let fields = format_fields(record);
        if fields.is_empty() {
            eprintln!("[{}] {}", record.level.as_str(), record.message);
        } else {
            eprintln!("[{}] {} {}", record.level.as_str(), record.message, fields);
        }
        Ok(())
    }
}

/// 複数の Log に同じレコードを書く。最初のエラーを返すが全件に書き込みを試みる。
pub struct TeeLog {
    sinks: Vec<Arc<dyn Log>>,
}

impl TeeLog {
    pub fn new(sinks: Vec<Arc<dyn Log>>) -> Self {
        Self { sinks }
    }
}

impl Log for TeeLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.log(record) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// 何も出力しない Log 実装（テスト用）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StdFileSystem;

    #[test]
    fn test_noop_log() {
        let log = NoopLog;
        let rec = LogRecord::new(LogLevel::Info, "test");
        assert!(log.log(&rec).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("chat.jsonl");
        let log = FileJsonLog::new(Arc::new(StdFileSystem), &path);
        log.log(&LogRecord::new(LogLevel::Info, "first").kind("lifecycle"))
            .unwrap();
        log.log(&LogRecord::new(LogLevel::Warn, "second").field("n", 2))
            .unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["message"], "first");
        assert_eq!(first["kind"], "lifecycle");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["level"], "warn");
        assert_eq!(second["fields"]["n"], 2);
    }

    #[test]
    fn test_tee_log_writes_to_every_sink() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.jsonl");
        let b = tmp.path().join("b.jsonl");
        let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
        let tee = TeeLog::new(vec![
            Arc::new(FileJsonLog::new(Arc::clone(&fs), &a)),
            Arc::new(FileJsonLog::new(Arc::clone(&fs), &b)),
        ]);
        tee.log(&LogRecord::new(LogLevel::Info, "x")).unwrap();
        assert_eq!(std::fs::read_to_string(&a).unwrap().lines().count(), 1);
        assert_eq!(std::fs::read_to_string(&b).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_format_fields() {
        let rec = LogRecord::new(LogLevel::Info, "m")
            .field("a", 1)
            .field("b", "x");
        assert_eq!(format_fields(&rec), "a=1 b=\"x\"");
        assert_eq!(format_fields(&LogRecord::new(LogLevel::Info, "m")), "");
    }
}
