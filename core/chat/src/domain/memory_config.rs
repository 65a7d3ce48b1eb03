//! 会話メモリの設定値

use common::error::Error;

/// 既定値
pub const DEFAULT_MAX_RECENT_MESSAGES: usize = 4;
pub const DEFAULT_ANCHOR_LEN: usize = 2;
pub const DEFAULT_COMPACTION_TRIGGER: usize = 12;
pub const DEFAULT_MAX_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// 常にそのまま残す末尾ターン数（recent window）
    pub max_recent_messages: usize,
    /// 先頭から固定で残すターン数（anchor。初回のデータ読み込みのやり取り）
    pub anchor_len: usize,
    /// 履歴長がこれを超えたら圧縮を試みる（max_recent_messages とは独立）
    pub compaction_trigger: usize,
    /// 要約依頼に載せる 1 ターンあたりの最大文字数
    pub max_excerpt_chars: usize,
}

impl MemoryConfig {
    pub fn new(max_recent_messages: usize) -> Self {
        Self {
            max_recent_messages,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_recent_messages == 0 {
            return Err(Error::invalid_argument("max recent messages must be at least 1"));
        }
        if self.max_excerpt_chars == 0 {
            return Err(Error::invalid_argument("excerpt chars must be at least 1"));
        }
        Ok(())
    }

    /// 圧縮後に残る履歴長（anchor + recent window）
    pub fn retained_len(&self) -> usize {
        self.anchor_len + self.max_recent_messages
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_recent_messages: DEFAULT_MAX_RECENT_MESSAGES,
            anchor_len: DEFAULT_ANCHOR_LEN,
            compaction_trigger: DEFAULT_COMPACTION_TRIGGER,
            max_excerpt_chars: DEFAULT_MAX_EXCERPT_CHARS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MemoryConfig::default();
        assert_eq!(c.max_recent_messages, 4);
        assert_eq!(c.anchor_len, 2);
        assert_eq!(c.compaction_trigger, 12);
        assert_eq!(c.max_excerpt_chars, 200);
        assert_eq!(c.retained_len(), 6);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        assert!(MemoryConfig::new(0).validate().unwrap_err().is_usage());
        assert!(MemoryConfig::new(1).validate().is_ok());
    }
}
