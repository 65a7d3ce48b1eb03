//! テスト用: 固定応答の Summarizer / ChatCompletion / MemoryStore 実装


#[cfg(test)]
pub use stub::{FailingSummarizer, InMemoryStore, StubCompletion, StubSummarizer};
