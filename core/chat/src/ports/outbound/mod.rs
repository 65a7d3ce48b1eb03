//! Outbound ポート: アプリが外界（要約・応答生成・保存先）を使うための trait

pub mod chat_completion;
pub mod memory_store;
pub mod summarizer;

pub use chat_completion::ChatCompletion;
pub use memory_store::MemoryStore;
pub use summarizer::Summarizer;
