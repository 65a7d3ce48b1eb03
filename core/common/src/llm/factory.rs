//! プロバイダファクトリー
//!
//! プロバイダタイプに基づいて適切なプロバイダを作成します。

use crate::error::Error;
use crate::llm::anthropic::AnthropicProvider;
use crate::llm::echo::EchoProvider;
use crate::llm::openai_compat::OpenAiCompatProvider;
use crate::llm::provider::{LlmProvider, Message};
use serde_json::Value;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// プロバイダタイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI 本家（OPENAI_API_KEY を使う Chat Completions）
    OpenAi,
    /// OpenAI Chat Completions 互換 (/chat/completions)
    OpenAiCompat,
    /// Echo（API を呼ばない）
    Echo,
}

impl ProviderType {
    /// 文字列からプロバイダタイプを解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gpt" | "openai" => Some(Self::OpenAi),
            "openai_compat" => Some(Self::OpenAiCompat),
            "echo" => Some(Self::Echo),
            _ => None,
        }
    }

    /// プロバイダタイプを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::OpenAiCompat => "openai_compat",
            Self::Echo => "echo",
        }
    }
}

/// プロバイダのenumラッパー
///
/// 異なるプロバイダタイプを型安全に扱うために使用します。
pub enum AnyProvider {
    Anthropic(AnthropicProvider),
    OpenAiCompat(OpenAiCompatProvider),
    Echo(EchoProvider),
}

impl LlmProvider for AnyProvider {
    fn name(&self) -> &str {
        match self {
            Self::Anthropic(p) => p.name(),
            Self::OpenAiCompat(p) => p.name(),
            Self::Echo(p) => p.name(),
        }
    }

    fn make_request_payload(
        &self,
        system_instruction: Option<&str>,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<Value, Error> {
        match self {
            Self::Anthropic(p) => p.make_request_payload(system_instruction, messages, max_tokens),
            Self::OpenAiCompat(p) => p.make_request_payload(system_instruction, messages, max_tokens),
            Self::Echo(p) => p.make_request_payload(system_instruction, messages, max_tokens),
        }
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        match self {
            Self::Anthropic(p) => p.make_http_request(request_json),
            Self::OpenAiCompat(p) => p.make_http_request(request_json),
            Self::Echo(p) => p.make_http_request(request_json),
        }
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        match self {
            Self::Anthropic(p) => p.parse_response_text(response_json),
            Self::OpenAiCompat(p) => p.parse_response_text(response_json),
            Self::Echo(p) => p.parse_response_text(response_json),
        }
    }
}

/// プロバイダを作成する
///
/// # Arguments
/// * `provider_type` - プロバイダタイプ
/// * `model` - モデル名（オプション、デフォルト値が使用される）
/// * `base_url` - ベース URL（None のとき各プロバイダのデフォルト）
/// * `api_key_env` - API キーを読む環境変数名（None のとき各プロバイダのデフォルト）
/// * `temperature` - 温度（None のとき各プロバイダのデフォルト）
pub fn create_provider(
    provider_type: ProviderType,
    model: Option<String>,
    base_url: Option<String>,
    api_key_env: Option<String>,
    temperature: Option<f32>,
) -> Result<AnyProvider, Error> {
    match provider_type {
        ProviderType::Anthropic => {
            let provider = AnthropicProvider::new(model, base_url, api_key_env, temperature)?;
            Ok(AnyProvider::Anthropic(provider))
        }
        ProviderType::OpenAi => {
            let key_env = api_key_env.unwrap_or_else(|| OPENAI_API_KEY_ENV.to_string());
            if std::env::var(&key_env).map(|v| v.is_empty()).unwrap_or(true) {
                return Err(Error::env(format!(
                    "{} environment variable is not set",
                    key_env
                )));
            }
            let provider = OpenAiCompatProvider::new(
                model,
                base_url.or_else(|| Some(OPENAI_BASE_URL.to_string())),
                Some(key_env),
                temperature,
            );
            Ok(AnyProvider::OpenAiCompat(provider))
        }
        ProviderType::OpenAiCompat => {
            let provider = OpenAiCompatProvider::new(model, base_url, api_key_env, temperature);
            Ok(AnyProvider::OpenAiCompat(provider))
        }
        ProviderType::Echo => Ok(AnyProvider::Echo(EchoProvider::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parse() {
        assert_eq!(ProviderType::parse("anthropic"), Some(ProviderType::Anthropic));
        assert_eq!(ProviderType::parse("Claude"), Some(ProviderType::Anthropic));
        assert_eq!(ProviderType::parse("GPT"), Some(ProviderType::OpenAi));
        assert_eq!(ProviderType::parse("openai"), Some(ProviderType::OpenAi));
        assert_eq!(ProviderType::parse("openai_compat"), Some(ProviderType::OpenAiCompat));
        assert_eq!(ProviderType::parse("ECHO"), Some(ProviderType::Echo));
        assert_eq!(ProviderType::parse("unknown"), None);
    }

    #[test]
    fn test_provider_type_as_str_roundtrips() {
        for t in [
            ProviderType::Anthropic,
            ProviderType::OpenAi,
            ProviderType::OpenAiCompat,
            ProviderType::Echo,
        ] {
            assert_eq!(ProviderType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_create_echo_provider() {
        let p = create_provider(ProviderType::Echo, None, None, None, None).unwrap();
        assert_eq!(p.name(), "echo");
    }

    #[test]
    fn test_create_openai_compat_without_key() {
        let p = create_provider(
            ProviderType::OpenAiCompat,
            Some("llama3.1".into()),
            Some("http://localhost:11434/v1".into()),
            None,
            None,
        )
        .unwrap();
        assert_eq!(p.name(), "openai_compat");
    }

    #[test]
    fn test_create_anthropic_requires_key() {
        let err = create_provider(
            ProviderType::Anthropic,
            None,
            None,
            Some("CHAT_TEST_SURELY_UNSET_KEY".into()),
            None,
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::Env(_)));
        assert!(err.to_string().contains("CHAT_TEST_SURELY_UNSET_KEY"));
    }
}
