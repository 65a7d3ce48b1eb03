//! Echoプロバイダの実装
//!
//! このプロバイダは実際にLLM APIを呼び出さず、最後の user メッセージの要点を返すだけです。
//! API キー無しでの動作確認やデバッグに使用します。

use crate::error::Error;
use crate::llm::provider::{LlmProvider, Message};
use serde_json::{json, Value};

const ECHO_PREVIEW_CHARS: usize = 80;

/// Echoプロバイダ
#[derive(Debug, Clone, Default)]
pub struct EchoProvider;

impl EchoProvider {
    /// 新しいEchoプロバイダを作成
    pub fn new() -> Self {
        Self
    }
}

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn make_request_payload(
        &self,
        system_instruction: Option<&str>,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<Value, Error> {
        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("");
        let mut payload = json!({
            "query": last,
            "message_count": messages.len(),
        });
        if let Some(system) = system_instruction {
            payload["system_instruction"] = json!(system);
        }
        if let Some(n) = max_tokens {
            payload["max_tokens"] = json!(n);
        }
        Ok(payload)
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        // 実際のAPI呼び出しは行わず、リクエストをそのままレスポンスとして返す
        Ok(request_json.to_string())
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;
        let query = v["query"].as_str().unwrap_or("");
        let preview: String = query.chars().take(ECHO_PREVIEW_CHARS).collect();
        Ok(Some(format!(
            "[Echo Provider] {} message(s) received; last: {}",
            v["message_count"].as_u64().unwrap_or(0),
            preview
        )))
    }
}
