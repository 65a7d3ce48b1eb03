//! LLMプロバイダの実装
//!
//! 異なるプロバイダ（Anthropic、OpenAI互換など）を同じ `LlmProvider` トレイトで扱う。

pub mod anthropic;
pub mod config;
pub mod echo;
pub mod factory;
pub mod openai_compat;
pub mod provider;
pub mod resolver;

pub use factory::{create_provider, AnyProvider, ProviderType};
pub use provider::{LlmProvider, Message};
pub use resolver::{load_profiles_config, resolve_provider, ResolvedProvider};
