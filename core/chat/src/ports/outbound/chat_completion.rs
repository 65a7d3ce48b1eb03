//! 応答生成 Outbound ポート
//!
//! 組み立て済みのターン列を渡し、assistant の応答全文を受け取る（単発・ブロッキング）。

use crate::domain::Turn;
use common::error::Error;

/// ターン列から次の assistant 応答を得る能力
pub trait ChatCompletion: Send + Sync {
    fn complete(&self, context: &[Turn]) -> Result<String, Error>;
}
