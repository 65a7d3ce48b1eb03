//! LlmProvider で要約する Summarizer 実装

use crate::ports::outbound::Summarizer;
use common::error::Error;
use common::llm::{LlmProvider, Message};
use std::sync::Arc;

/// 要約応答のトークン上限
pub const SUMMARY_MAX_TOKENS: u32 = 500;

const SUMMARY_INSTRUCTION: &str =
    "Summarize this conversation into key points and findings. Be concise:";

/// 要約依頼のプロンプト本文
pub fn summary_request(text: &str) -> String {
    format!("{}\n\n{}", SUMMARY_INSTRUCTION, text)
}

/// 単発の user メッセージで要約を依頼する
pub struct LlmSummarizer {
    provider: Arc<dyn LlmProvider>,
    max_tokens: u32,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            max_tokens: SUMMARY_MAX_TOKENS,
        }
    }
}

impl Summarizer for LlmSummarizer {
    fn summarize(&self, text: &str) -> Result<String, Error> {
        let messages = [Message::user(summary_request(text))];
        let summary = self
            .provider
            .complete(None, &messages, Some(self.max_tokens))
            .map_err(|e| Error::summarization(e.to_string()))?;
        if summary.trim().is_empty() {
            return Err(Error::summarization(format!(
                "{} returned an empty summary",
                self.provider.name()
            )));
        }
        Ok(summary)
    }
}
