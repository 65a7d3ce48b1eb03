//! Outbound ポート: アプリが外界（FS・ログ・LLM）を使うための trait

pub mod fs;
pub mod llm_provider;
pub mod log;

pub use fs::FileSystem;
pub use llm_provider::LlmProvider;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
