//! 1 ターンの進行: プライミング → user 記録 → 必要なら圧縮 → コンテキスト組み立て → 応答 → assistant 記録

use crate::domain::{ConversationMemory, Priming, Turn};
use crate::ports::outbound::ChatCompletion;
use crate::usecase::compaction::{CompactionOutcome, CompactionUseCase};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

/// send の結果。圧縮を試みた場合はその結果も返す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub text: String,
    pub compaction: Option<CompactionOutcome>,
}

pub struct ChatUseCase {
    completion: Arc<dyn ChatCompletion>,
    compaction: CompactionUseCase,
    priming: Option<Priming>,
    log: Arc<dyn Log>,
}

impl ChatUseCase {
    pub fn new(
        completion: Arc<dyn ChatCompletion>,
        compaction: CompactionUseCase,
        priming: Option<Priming>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            completion,
            compaction,
            priming,
            log,
        }
    }

    /// 1 メッセージを送って応答を得る。
    ///
    /// 応答生成に失敗した場合は Err を返すが、記録済みの user ターンは残す。
    pub fn send(&self, memory: &mut ConversationMemory, message: &str) -> Result<TurnReply, Error> {
        if memory.is_empty() {
            if let Some(priming) = &self.priming {
                for turn in priming.anchor_turns() {
                    memory.record(turn);
                }
                self.emit(LogRecord::new(LogLevel::Debug, "memory primed with report data"));
            }
        }

        memory.record(Turn::user(message));
        let compaction = self.compaction.maybe_compress(memory);

        let context = memory.context();
        self.emit(
            LogRecord::new(LogLevel::Debug, "sending context")
                .field("context_len", context.len())
                .field("history_len", memory.len()),
        );
        let reply = match self.completion.complete(&context) {
            Ok(r) => r,
            Err(e) => {
                self.emit(LogRecord::new(LogLevel::Error, "completion failed").field("error", e.to_string()));
                return Err(e);
            }
        };

        memory.record(Turn::assistant(reply.clone()));
        Ok(TurnReply {
            text: reply,
            compaction,
        })
    }

    fn emit(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("usecase").kind("chat"));
    }
}
