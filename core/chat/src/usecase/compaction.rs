//! 圧縮のユースケース（要約を依頼し、成功したときだけ履歴を置き換える）

use crate::domain::{CompactionSkip, ConversationMemory};
use crate::ports::outbound::Summarizer;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::sync::Arc;

/// 圧縮 1 回の結果。失敗もエラーではなく結果として返す
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactionOutcome {
    Skipped(CompactionSkip),
    Compacted { summarized: usize, kept: usize },
    /// 要約に失敗した。履歴・要約ログは変更していない
    Failed(String),
}

pub struct CompactionUseCase {
    summarizer: Arc<dyn Summarizer>,
    log: Arc<dyn Log>,
}

impl CompactionUseCase {
    pub fn new(summarizer: Arc<dyn Summarizer>, log: Arc<dyn Log>) -> Self {
        Self { summarizer, log }
    }

    /// 閾値を超えているときだけ圧縮する
    pub fn maybe_compress(&self, memory: &mut ConversationMemory) -> Option<CompactionOutcome> {
        if !memory.needs_compaction() {
            return None;
        }
        Some(self.compress(memory))
    }

    /// anchor と recent window の間を要約して捨てる
    pub fn compress(&self, memory: &mut ConversationMemory) -> CompactionOutcome {
        let plan = match memory.compaction_plan() {
            Ok(plan) => plan,
            Err(skip) => {
                self.emit(
                    LogRecord::new(LogLevel::Debug, "compaction skipped")
                        .field("reason", skip.to_string())
                        .field("history_len", memory.len())
                        .field("retained_len", memory.config().retained_len()),
                );
                return CompactionOutcome::Skipped(skip);
            }
        };

        let summary = match self.summarizer.summarize(&plan.transcript) {
            Ok(s) => s,
            Err(e) => {
                self.emit(
                    LogRecord::new(LogLevel::Warn, "compaction failed")
                        .field("error", e.to_string())
                        .field("history_len", memory.len()),
                );
                return CompactionOutcome::Failed(e.to_string());
            }
        };

        if let Err(e) = memory.apply_compaction(&plan, summary) {
            self.emit(LogRecord::new(LogLevel::Error, "compaction not applied").field("error", e.to_string()));
            return CompactionOutcome::Failed(e.to_string());
        }

        self.emit(
            LogRecord::new(LogLevel::Info, "conversation compacted")
                .field("summarized", plan.summarized)
                .field("kept", memory.len())
                .field("summaries", memory.summaries().len()),
        );
        CompactionOutcome::Compacted {
            summarized: plan.summarized,
            kept: memory.len(),
        }
    }

    fn emit(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("usecase").kind("compaction"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FailingSummarizer, StubSummarizer};
    use crate::domain::{MemoryConfig, Turn};
    use common::adapter::NoopLog;

    fn memory_with(n: usize) -> ConversationMemory {
        let mut m = ConversationMemory::new(MemoryConfig::new(4));
        for i in 0..n {
            if i % 2 == 0 {
                m.record(Turn::user(format!("question {}", i)));
            } else {
                m.record(Turn::assistant(format!("answer {}", i)));
            }
        }
        m
    }

    #[test]
    fn test_compress_sixteen_turns() {
        let summarizer = Arc::new(StubSummarizer::new("key findings"));
        let uc = CompactionUseCase::new(summarizer.clone(), Arc::new(NoopLog));
        let mut m = memory_with(16);
        let old = m.history().to_vec();

        let outcome = uc.compress(&mut m);
        assert_eq!(outcome, CompactionOutcome::Compacted { summarized: 10, kept: 6 });
        assert_eq!(m.len(), 6);
        assert_eq!(m.summaries(), &["key findings".to_string()]);
        assert_eq!(&m.history()[..2], &old[..2]);
        assert_eq!(&m.history()[2..], &old[12..]);

        let calls = summarizer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("USER: question 2\nASSISTANT: answer 3"));
    }

    #[test]
    fn test_failure_leaves_state_untouched() {
        let uc = CompactionUseCase::new(Arc::new(FailingSummarizer), Arc::new(NoopLog));
        let mut m = memory_with(16);
        let before = m.snapshot();

        let outcome = uc.compress(&mut m);
        assert!(matches!(outcome, CompactionOutcome::Failed(ref msg) if msg.contains("provider unavailable")));
        assert_eq!(m.snapshot(), before);
        assert_eq!(m.len(), 16);
        assert!(m.summaries().is_empty());
    }

    #[test]
    fn test_short_history_does_not_call_summarizer() {
        let summarizer = Arc::new(StubSummarizer::new("x"));
        let uc = CompactionUseCase::new(summarizer.clone(), Arc::new(NoopLog));
        let mut m = memory_with(7);
        assert!(matches!(uc.compress(&mut m), CompactionOutcome::Skipped(_)));
        assert_eq!(summarizer.call_count(), 0);
        assert_eq!(m.len(), 7);
    }

    #[test]
    fn test_maybe_compress_respects_trigger() {
        let summarizer = Arc::new(StubSummarizer::new("x"));
        let uc = CompactionUseCase::new(summarizer.clone(), Arc::new(NoopLog));
        let mut m = memory_with(12);
        assert_eq!(uc.maybe_compress(&mut m), None);
        m.record(Turn::user("13"));
        assert!(matches!(
            uc.maybe_compress(&mut m),
            Some(CompactionOutcome::Compacted { kept: 6, .. })
        ));
        assert_eq!(summarizer.call_count(), 1);
    }
}
