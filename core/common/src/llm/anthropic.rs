//! Anthropic Messages API (/v1/messages) プロバイダ

use crate::error::Error;
use crate::llm::provider::{error_message_from_body, LlmProvider, Message};
use serde_json::{json, Value};
use std::env;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const DEFAULT_MAX_TOKENS: u32 = 2000;
const API_VERSION: &str = "2023-06-01";

/// Anthropic プロバイダ
pub struct AnthropicProvider {
    model: String,
    base_url: String,
    api_key: String,
    temperature: Option<f64>,
}

impl AnthropicProvider {
    /// 新しいプロバイダを作成
    ///
    /// * `model` - モデル名（None のとき DEFAULT_MODEL）
    /// * `base_url` - ベース URL（None のとき DEFAULT_BASE_URL）
    /// * `api_key_env` - API キーを読む環境変数名（None のとき ANTHROPIC_API_KEY）
    /// * `temperature` - 温度（None のとき送らない）
    pub fn new(
        model: Option<String>,
        base_url: Option<String>,
        api_key_env: Option<String>,
        temperature: Option<f32>,
    ) -> Result<Self, Error> {
        let key_env = api_key_env.unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
        let api_key = env::var(&key_env)
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::env(format!("{} environment variable is not set", key_env)))?;
        Ok(Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            temperature: temperature.map(f64::from),
        })
    }

    fn url(&self) -> String {
        format!("{}/messages", self.base_url)
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn make_request_payload(
        &self,
        system_instruction: Option<&str>,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<Value, Error> {
        if messages.is_empty() {
            return Err(Error::invalid_argument("No messages to send"));
        }
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();
        let mut payload = json!({
            "model": self.model,
            "max_tokens": max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": messages,
        });
        if let Some(system) = system_instruction {
            payload["system"] = json!(system);
        }
        if let Some(t) = self.temperature {
            payload["temperature"] = json!(t);
        }
        Ok(payload)
    }

    fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
        let response = reqwest::blocking::Client::new()
            .post(self.url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .body(request_json.to_string())
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::http(format!(
                "Anthropic API error: {}",
                error_message_from_body(status, &response_text)
            )));
        }
        Ok(response_text)
    }

    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error> {
        let v: Value = serde_json::from_str(response_json)
            .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;

        if v["type"] == "error" {
            let msg = v["error"]["message"].as_str().unwrap_or("Unknown error");
            return Err(Error::http(format!("Anthropic API error: {}", msg)));
        }

        // content は複数ブロックになり得る。text ブロックだけを連結する
        let text: Vec<&str> = v["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b["type"] == "text")
                    .filter_map(|b| b["text"].as_str())
                    .collect()
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text.concat()))
    }
}
