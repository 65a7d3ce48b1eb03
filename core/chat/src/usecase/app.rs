//! 対話ループ（You: プロンプト → コマンド or メッセージ）

use crate::domain::{ChatCommand, ConversationMemory, MemoryStats};
use crate::usecase::chat::ChatUseCase;
use crate::usecase::compaction::CompactionOutcome;
use crate::usecase::persistence::MemoryPersistence;
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use std::io::{BufRead, Write};
use std::sync::Arc;

const PROMPT: &str = "You: ";

fn io_err(e: std::io::Error) -> Error {
    Error::io_msg(e.to_string())
}

/// 対話ループ本体。入出力は BufRead / Write で受け取る
pub struct ChatApp {
    chat: ChatUseCase,
    persistence: MemoryPersistence,
    log: Arc<dyn Log>,
}

impl ChatApp {
    pub fn new(chat: ChatUseCase, persistence: MemoryPersistence, log: Arc<dyn Log>) -> Self {
        Self {
            chat,
            persistence,
            log,
        }
    }

    /// restore が true なら開始時に保存済みの会話を読み込む。
    /// quit / EOF で保存して 0 を返す。保存済みファイルが壊れている場合は Err。
    pub fn run<R: BufRead, W: Write, E: Write>(
        &self,
        memory: &mut ConversationMemory,
        restore: bool,
        input: &mut R,
        out: &mut W,
        err: &mut E,
    ) -> Result<i32, Error> {
        if restore && self.persistence.restore(memory)? {
            writeln!(out, "Previous conversation loaded!").map_err(io_err)?;
        }
        writeln!(out, "Business Analytics Chatbot Ready!").map_err(io_err)?;
        writeln!(out, "Ask questions about your Ecocutlery product performance.").map_err(io_err)?;
        writeln!(out, "Commands: 'quit', 'clear', 'save', 'stats'\n").map_err(io_err)?;

        let mut line = String::new();
        loop {
            write!(out, "{}", PROMPT).map_err(io_err)?;
            out.flush().map_err(io_err)?;

            line.clear();
            let command = if input.read_line(&mut line).map_err(io_err)? == 0 {
                writeln!(out).map_err(io_err)?;
                ChatCommand::Quit
            } else {
                ChatCommand::parse(&line)
            };
            let _ = self.log.log(
                &LogRecord::new(LogLevel::Debug, "command received")
                    .layer("usecase")
                    .kind("repl")
                    .field("command", command.name()),
            );

            match command {
                ChatCommand::Empty => {}
                ChatCommand::Quit => {
                    self.persistence.persist(memory)?;
                    writeln!(out, "Conversation saved. Goodbye!").map_err(io_err)?;
                    return Ok(0);
                }
                ChatCommand::Clear => {
                    memory.clear();
                    writeln!(out, "\nConversation history cleared!\n").map_err(io_err)?;
                }
                ChatCommand::Save => match self.persistence.persist(memory) {
                    Ok(()) => writeln!(out, "\nConversation saved!\n").map_err(io_err)?,
                    Err(e) => writeln!(err, "\nError: {}\n", e).map_err(io_err)?,
                },
                ChatCommand::Stats => {
                    let stats = MemoryStats::of(memory);
                    writeln!(out, "\nStats:").map_err(io_err)?;
                    writeln!(out, "  Total messages: {}", stats.total_messages).map_err(io_err)?;
                    writeln!(out, "  Summaries created: {}", stats.summaries).map_err(io_err)?;
                    writeln!(
                        out,
                        "  Estimated tokens in current context: ~{}\n",
                        stats.estimated_context_tokens
                    )
                    .map_err(io_err)?;
                }
                ChatCommand::Message(text) => match self.chat.send(memory, &text) {
                    Ok(reply) => {
                        if let Some(CompactionOutcome::Failed(msg)) = &reply.compaction {
                            writeln!(err, "Note: Could not summarize conversation: {}", msg)
                                .map_err(io_err)?;
                        }
                        writeln!(out, "\nAssistant: {}\n", reply.text).map_err(io_err)?;
                    }
                    Err(e) => writeln!(err, "\nError: {}\n", e).map_err(io_err)?,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FailingSummarizer, InMemoryStore, StubCompletion, StubSummarizer};
    use crate::domain::{MemoryConfig, Priming, Turn};
    use crate::ports::outbound::{ChatCompletion, MemoryStore, Summarizer};
    use crate::usecase::compaction::CompactionUseCase;
    use common::adapter::NoopLog;
    use std::io::Cursor;

    struct Harness {
        store: Arc<InMemoryStore>,
        app: ChatApp,
    }

    fn harness(
        completion: Arc<dyn ChatCompletion>,
        summarizer: Arc<dyn Summarizer>,
        store: Arc<InMemoryStore>,
    ) -> Harness {
        let log: Arc<dyn Log> = Arc::new(NoopLog);
        let chat = ChatUseCase::new(
            completion,
            CompactionUseCase::new(summarizer, Arc::clone(&log)),
            Some(Priming::new("prompt", "product,units")),
            Arc::clone(&log),
        );
        let persistence = MemoryPersistence::new(store.clone(), Arc::clone(&log));
        Harness {
            store,
            app: ChatApp::new(chat, persistence, log),
        }
    }

    fn run(h: &Harness, memory: &mut ConversationMemory, restore: bool, input: &str) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = h
            .app
            .run(memory, restore, &mut Cursor::new(input.as_bytes()), &mut out, &mut err)
            .unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_message_then_quit_saves() {
        let h = harness(
            Arc::new(StubCompletion::replying("Spoons sold 12.")),
            Arc::new(StubSummarizer::new("s")),
            Arc::new(InMemoryStore::default()),
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        let (code, out, err) = run(&h, &mut m, true, "How many spoons?\nquit\n");

        assert_eq!(code, 0);
        assert!(err.is_empty());
        assert!(!out.contains("Previous conversation loaded!"));
        assert!(out.contains("Assistant: Spoons sold 12."));
        assert!(out.ends_with("Conversation saved. Goodbye!\n"));
        let saved = h.store.load().unwrap().unwrap();
        assert_eq!(saved.history.len(), 4);
        assert_eq!(saved.history[3], Turn::assistant("Spoons sold 12."));
    }

    #[test]
    fn test_eof_behaves_like_quit() {
        let h = harness(
            Arc::new(StubCompletion::replying("r")),
            Arc::new(StubSummarizer::new("s")),
            Arc::new(InMemoryStore::default()),
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        let (code, out, _) = run(&h, &mut m, false, "hi\n");
        assert_eq!(code, 0);
        assert!(out.contains("Conversation saved. Goodbye!"));
        assert!(h.store.load().unwrap().is_some());
    }

    #[test]
    fn test_restore_announces_loaded() {
        let store = Arc::new(InMemoryStore::default());
        let mut previous = ConversationMemory::new(MemoryConfig::default());
        previous.record(Turn::user("old"));
        previous.record(Turn::assistant("reply"));
        store.save(&previous.snapshot()).unwrap();

        let h = harness(
            Arc::new(StubCompletion::replying("r")),
            Arc::new(StubSummarizer::new("s")),
            store,
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        let (_, out, _) = run(&h, &mut m, true, "stats\nq\n");
        assert!(out.starts_with("Previous conversation loaded!\n"));
        assert!(out.contains("  Total messages: 2"));
        assert!(out.contains("  Summaries created: 0"));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_fresh_start_ignores_saved_memory() {
        let store = Arc::new(InMemoryStore::default());
        let mut previous = ConversationMemory::new(MemoryConfig::default());
        previous.record(Turn::user("old"));
        store.save(&previous.snapshot()).unwrap();

        let h = harness(
            Arc::new(StubCompletion::replying("r")),
            Arc::new(StubSummarizer::new("s")),
            store,
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        let (_, out, _) = run(&h, &mut m, false, "exit\n");
        assert!(!out.contains("Previous conversation loaded!"));
        assert!(h.store.load().unwrap().unwrap().history.is_empty());
    }

    #[test]
    fn test_clear_and_save_commands() {
        let h = harness(
            Arc::new(StubCompletion::replying("r")),
            Arc::new(StubSummarizer::new("s")),
            Arc::new(InMemoryStore::default()),
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        let (_, out, _) = run(&h, &mut m, false, "hello\nCLEAR\nsave\nq\n");
        assert!(out.contains("Conversation history cleared!"));
        assert!(out.contains("Conversation saved!"));
        assert!(m.is_empty());
    }

    #[test]
    fn test_completion_error_is_reported_and_loop_continues() {
        let h = harness(
            Arc::new(StubCompletion::failing()),
            Arc::new(StubSummarizer::new("s")),
            Arc::new(InMemoryStore::default()),
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        let (code, out, err) = run(&h, &mut m, false, "first\nsecond\nq\n");
        assert_eq!(code, 0);
        assert_eq!(err.matches("Error: HTTP 529: overloaded").count(), 2);
        assert!(out.contains("Conversation saved. Goodbye!"));
        // プライミング 2 + user 2（応答なし）
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn test_summarization_failure_prints_note() {
        let h = harness(
            Arc::new(StubCompletion::replying("r")),
            Arc::new(FailingSummarizer),
            Arc::new(InMemoryStore::default()),
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        // プライミング 2 + 5 往復 = 12、6 通目の user で 13 > 12
        let input = "1\n2\n3\n4\n5\n6\nq\n";
        let (_, out, err) = run(&h, &mut m, false, input);
        assert!(err.contains("Note: Could not summarize conversation: Summarization failed: provider unavailable"));
        assert_eq!(out.matches("Assistant: r").count(), 6);
        assert_eq!(m.len(), 14);
    }

    #[test]
    fn test_corrupt_saved_memory_is_error() {
        let store = Arc::new(InMemoryStore {
            corrupt: true,
            ..Default::default()
        });
        let h = harness(
            Arc::new(StubCompletion::replying("r")),
            Arc::new(StubSummarizer::new("s")),
            store,
        );
        let mut m = ConversationMemory::new(MemoryConfig::default());
        let result = h.app.run(
            &mut m,
            true,
            &mut Cursor::new(b"q\n".to_vec()),
            &mut Vec::<u8>::new(),
            &mut Vec::<u8>::new(),
        );
        assert_eq!(result.unwrap_err().exit_code(), 65);
    }
}
