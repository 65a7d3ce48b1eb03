//! 要約 Outbound ポート
//!
//! 圧縮対象のトランスクリプトを渡し、要約文字列を受け取る。
//! 失敗は `Error::Summarization` で返し、呼び出し側（compaction）が握りつぶして続行する。

use common::error::Error;

/// テキストを要約する能力
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, Error>;
}
