//! chat 共通ライブラリ
//!
//! `chat` コマンドが外界（ファイル・ログ・LLM API）に触れるための型とアダプタを提供します。

/// エラーハンドリング
pub mod error;

/// LLMプロバイダ
pub mod llm;

/// Ports & Adapters のポート定義
pub mod ports;

/// 標準アダプタ
pub mod adapter;
