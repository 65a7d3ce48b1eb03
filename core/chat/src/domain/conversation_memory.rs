//! 会話メモリ（履歴・要約ログ・送信用コンテキストの組み立て）
//!
//! 履歴は追記のみで、唯一の例外が圧縮（anchor と recent window 以外をまとめて捨てる）。
//! 要約の生成自体は外部能力なので、ここでは「何を要約するか」の計画と
//! 要約結果の適用だけを行い、I/O は usecase 側に置く。

use super::{MemoryConfig, Turn};
use common::error::Error;
use serde::{Deserialize, Serialize};

/// 要約を再注入するときの user 側ラベル
pub const SUMMARY_PREFIX: &str = "Previous conversation summary:\n";
/// 要約を再注入するときの assistant 側の受け答え
pub const SUMMARY_ACK: &str = "I remember our previous conversation.";
/// 切り詰めたことを示す印
pub const ELLIPSIS: &str = "...";

/// 永続化用のスナップショット（履歴 + 要約ログ）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub history: Vec<Turn>,
    pub summaries: Vec<String>,
}

/// 圧縮を見送った理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionSkip {
    /// 履歴が anchor + recent window 以下
    TooShort { len: usize, required: usize },
    /// 間のスライスが 2 ターン未満で要約する価値がない
    SliceTooSmall { slice_len: usize },
}

impl std::fmt::Display for CompactionSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort { len, required } => {
                write!(f, "history too short ({} turns, need more than {})", len, required)
            }
            Self::SliceTooSmall { slice_len } => {
                write!(f, "only {} turn(s) between anchor and recent window", slice_len)
            }
        }
    }
}

/// 圧縮の計画。要約に渡すテキストと、適用時に検証する履歴長を持つ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionPlan {
    /// `ROLE: content` を改行で連結した要約対象テキスト
    pub transcript: String,
    /// 要約対象のターン数
    pub summarized: usize,
    /// 計画を立てた時点の履歴長
    pub history_len: usize,
}

/// 会話メモリ本体
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    config: MemoryConfig,
    history: Vec<Turn>,
    summaries: Vec<String>,
}

impl ConversationMemory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
            summaries: Vec::new(),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }

    /// 文脈に使うのは常に最新の要約のみ
    pub fn latest_summary(&self) -> Option<&str> {
        self.summaries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// 1 ターン追記する
    pub fn record(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// 履歴と要約ログを空にする（冪等）
    pub fn clear(&mut self) {
        self.history.clear();
        self.summaries.clear();
    }

    /// 次のリクエストで送るターン列を組み立てる（履歴は変更しない）
    ///
    /// 長さは常に `max_recent_messages + 2` 以下。
    pub fn context(&self) -> Vec<Turn> {
        let recent = self.config.max_recent_messages;
        if self.history.len() <= recent {
            return self.history.clone();
        }
        let mut out = Vec::with_capacity(recent + 2);
        if let Some(summary) = self.latest_summary() {
            out.push(Turn::user(format!("{}{}", SUMMARY_PREFIX, summary)));
            out.push(Turn::assistant(SUMMARY_ACK));
        }
        out.extend_from_slice(&self.history[self.history.len() - recent..]);
        out
    }

    /// 圧縮を試みるべき長さに達したか
    pub fn needs_compaction(&self) -> bool {
        self.history.len() > self.config.compaction_trigger
    }

    /// anchor と recent window の間を要約対象として切り出す
    pub fn compaction_plan(&self) -> Result<CompactionPlan, CompactionSkip> {
        let len = self.history.len();
        let required = self.config.retained_len();
        if len <= required {
            return Err(CompactionSkip::TooShort { len, required });
        }
        let slice = &self.history[self.config.anchor_len..len - self.config.max_recent_messages];
        if slice.len() < 2 {
            return Err(CompactionSkip::SliceTooSmall {
                slice_len: slice.len(),
            });
        }
        Ok(CompactionPlan {
            transcript: render_transcript(slice, self.config.max_excerpt_chars),
            summarized: slice.len(),
            history_len: len,
        })
    }

    /// 要約を記録し、履歴を anchor + recent window に置き換える
    ///
    /// 計画後に履歴が変わっていた場合は何もせずエラーを返す。
    pub fn apply_compaction(&mut self, plan: &CompactionPlan, summary: String) -> Result<(), Error> {
        if self.history.len() != plan.history_len {
            return Err(Error::system(format!(
                "history changed since compaction was planned ({} -> {} turns)",
                plan.history_len,
                self.history.len()
            )));
        }
        let start = self.config.anchor_len;
        let end = self.history.len() - self.config.max_recent_messages;
        self.summaries.push(summary);
        self.history.drain(start..end);
        Ok(())
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            history: self.history.clone(),
            summaries: self.summaries.clone(),
        }
    }

    /// 状態をスナップショットで置き換える（設定は維持）
    pub fn restore_snapshot(&mut self, snapshot: MemorySnapshot) {
        self.history = snapshot.history;
        self.summaries = snapshot.summaries;
    }
}

/// 各ターンを `ROLE: content` の 1 行にする。長い本文は max_chars 文字で切って `...` を付ける
pub fn render_transcript(turns: &[Turn], max_chars: usize) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role().label(), excerpt(t.content(), max_chars)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn excerpt(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &s[..idx], ELLIPSIS),
        None => s.to_string(),
    }
}
