//! 会話メモリの保存・復元ユースケース

use crate::domain::ConversationMemory;
use crate::ports::outbound::MemoryStore;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

pub struct MemoryPersistence {
    store: Arc<dyn MemoryStore>,
    log: Arc<dyn Log>,
}

impl MemoryPersistence {
    pub fn new(store: Arc<dyn MemoryStore>, log: Arc<dyn Log>) -> Self {
        Self { store, log }
    }

    /// 履歴と要約ログを書き出す
    pub fn persist(&self, memory: &ConversationMemory) -> Result<(), Error> {
        self.store.save(&memory.snapshot())?;
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "memory saved")
                .layer("usecase")
                .kind("persistence")
                .field("history_len", memory.len())
                .field("summaries", memory.summaries().len()),
        );
        Ok(())
    }

    /// 復元できたら true。保存先が無い・読めない場合は false で状態はそのまま。
    /// 中身が壊れている場合は Err（状態はそのまま）。
    pub fn restore(&self, memory: &mut ConversationMemory) -> Result<bool, Error> {
        let snapshot = match self.store.load() {
            Ok(Some(s)) => s,
            Ok(None) => {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Debug, "no saved memory")
                        .layer("usecase")
                        .kind("persistence"),
                );
                return Ok(false);
            }
            Err(e) => {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Error, "saved memory is corrupt")
                        .layer("usecase")
                        .kind("persistence")
                        .field("error", e.to_string()),
                );
                return Err(e);
            }
        };
        memory.restore_snapshot(snapshot);
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "memory restored")
                .layer("usecase")
                .kind("persistence")
                .field("history_len", memory.len())
                .field("summaries", memory.summaries().len()),
        );
        Ok(true)
    }
}
