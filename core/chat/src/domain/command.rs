//! 対話ループの入力 1 行を表す enum（Command Pattern）
//!
//! 予約語（quit / clear / save / stats）と通常メッセージの分岐を enum で明示する。

/// 対話ループでの 1 入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// 保存して終了（quit / exit / q）
    Quit,
    /// 履歴と要約を消去
    Clear,
    /// 保存のみ
    Save,
    /// 統計表示
    Stats,
    /// 空行（何もしない）
    Empty,
    /// LLM へ送るメッセージ
    Message(String),
}

impl ChatCommand {
    /// 入力 1 行を解釈する。予約語は前後の空白と大文字小文字を無視して判定する。
    ///
    /// メッセージは末尾の改行だけを落とし、それ以外の空白はそのまま残す。
    pub fn parse(line: &str) -> Self {
        let text = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);
        match text.trim().to_lowercase().as_str() {
            "" => Self::Empty,
            "quit" | "exit" | "q" => Self::Quit,
            "clear" => Self::Clear,
            "save" => Self::Save,
            "stats" => Self::Stats,
            _ => Self::Message(text.to_string()),
        }
    }

    /// ログ用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Clear => "clear",
            Self::Save => "save",
            Self::Stats => "stats",
            Self::Empty => "empty",
            Self::Message(_) => "message",
        }
    }
}
