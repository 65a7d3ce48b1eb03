//! chat のアダプタ（ポートの標準実装）

pub mod file_memory_store;
pub mod llm_chat_completion;
pub mod llm_summarizer;
pub mod report_loader;
pub mod stub_llm;

pub use file_memory_store::{FileMemoryStore, DEFAULT_MEMORY_FILENAME};
pub use llm_chat_completion::LlmChatCompletion;
pub use llm_summarizer::LlmSummarizer;
pub use report_loader::load_priming;
#[cfg(test)]
pub use stub_llm::{FailingSummarizer, InMemoryStore, StubCompletion, StubSummarizer};
