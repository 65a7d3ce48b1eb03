//! 会話メモリの保存先 Outbound ポート
//!
//! 形式は実装の内部事情（バージョニングしない）。

use crate::domain::MemorySnapshot;
use common::error::Error;

/// スナップショットの保存と読み込み
pub trait MemoryStore: Send + Sync {
    /// スナップショット全体を書き出す（既存は置き換え）
    fn save(&self, snapshot: &MemorySnapshot) -> Result<(), Error>;

    /// 読み込む。存在しない・読めない場合は Ok(None)、中身が壊れている場合は Err
    fn load(&self) -> Result<Option<MemorySnapshot>, Error>;
}
