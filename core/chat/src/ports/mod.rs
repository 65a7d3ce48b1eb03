//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出すインターフェース
//! - outbound: アプリが外界（要約・応答生成・保存先）を使うための trait

pub mod inbound;
pub mod outbound;
