//! LlmProvider で応答を得る ChatCompletion 実装

use crate::domain::Turn;
use crate::ports::outbound::ChatCompletion;
use common::error::Error;
use common::llm::{LlmProvider, Message};
use std::sync::Arc;

/// 応答のトークン上限
pub const REPLY_MAX_TOKENS: u32 = 2000;

/// ターン列を LlmMessage 列に変換する
fn turns_to_messages(turns: &[Turn]) -> Vec<Message> {
    turns
        .iter()
        .map(|t| Message::new(t.role().as_str(), t.content()))
        .collect()
}

pub struct LlmChatCompletion {
    provider: Arc<dyn LlmProvider>,
    max_tokens: u32,
}

impl LlmChatCompletion {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            max_tokens: REPLY_MAX_TOKENS,
        }
    }
}

impl ChatCompletion for LlmChatCompletion {
    fn complete(&self, context: &[Turn]) -> Result<String, Error> {
        if context.is_empty() {
            return Err(Error::completion("context is empty"));
        }
        let messages = turns_to_messages(context);
        self.provider
            .complete(None, &messages, Some(self.max_tokens))
    }
}
