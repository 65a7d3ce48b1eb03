//! 統計（履歴長・要約数・概算トークン）

use super::{ConversationMemory, Turn};

/// 1 トークン ≒ 4 文字の概算
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub total_messages: usize,
    pub summaries: usize,
    /// 現在のコンテキスト（次に送るターン列）の概算トークン数
    pub estimated_context_tokens: usize,
}

impl MemoryStats {
    pub fn of(memory: &ConversationMemory) -> Self {
        Self {
            total_messages: memory.len(),
            summaries: memory.summaries().len(),
            estimated_context_tokens: context_tokens(&memory.context()),
        }
    }
}

fn context_tokens(context: &[Turn]) -> usize {
    context.iter().map(|t| estimate_tokens(t.content())).sum()
}
