//! LLMプロバイダのトレイト定義

use crate::error::Error;
use serde_json::Value;

/// LLMプロバイダのトレイト
///
/// 各プロバイダ（Anthropic、OpenAI互換など）はこのトレイトを実装する必要があります。
/// 呼び出しは同期（ブロッキング）で、リトライもタイムアウトも行いません。
pub trait LlmProvider: Send + Sync {
    /// プロバイダ名を返す
    fn name(&self) -> &str;

    /// リクエストペイロードを生成
    ///
    /// # Arguments
    /// * `system_instruction` - システム指示（オプション）
    /// * `messages` - 送信するメッセージ列（末尾が今回の user メッセージ）
    /// * `max_tokens` - 応答トークン上限（None のときプロバイダのデフォルト）
    fn make_request_payload(
        &self,
        system_instruction: Option<&str>,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<Value, Error>;

    /// HTTPリクエストを実行してレスポンスJSON文字列を取得
    fn make_http_request(&self, request_json: &str) -> Result<String, Error>;

    /// レスポンスからテキストを抽出（存在しない場合は None）
    fn parse_response_text(&self, response_json: &str) -> Result<Option<String>, Error>;

    /// ペイロード生成 → HTTP → テキスト抽出を 1 回で行う
    fn complete(
        &self,
        system_instruction: Option<&str>,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String, Error> {
        let payload = self.make_request_payload(system_instruction, messages, max_tokens)?;
        let request_json = serde_json::to_string(&payload)
            .map_err(|e| Error::json(format!("Failed to serialize request: {}", e)))?;
        let response_json = self.make_http_request(&request_json)?;
        self.parse_response_text(&response_json)?.ok_or_else(|| {
            Error::completion(format!("{} returned no text content", self.name()))
        })
    }
}

/// メッセージ構造体（user / assistant）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// エラーレスポンス本文から人間向けメッセージを取り出す（`error.message` が無ければ本文そのまま）
pub(crate) fn error_message_from_body(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_message_assistant() {
        let msg = Message::assistant("Hi there");
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.content, "Hi there");
    }

    #[test]
    fn test_message_with_empty_content() {
        let msg = Message::new("user", "");
        assert_eq!(msg.content, "");
    }

    struct Canned(Option<&'static str>);

    impl LlmProvider for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn make_request_payload(
            &self,
            _system_instruction: Option<&str>,
            messages: &[Message],
            _max_tokens: Option<u32>,
        ) -> Result<Value, Error> {
            Ok(json!({ "n": messages.len() }))
        }

        fn make_http_request(&self, request_json: &str) -> Result<String, Error> {
            Ok(request_json.to_string())
        }

        fn parse_response_text(&self, _response_json: &str) -> Result<Option<String>, Error> {
            Ok(self.0.map(|s| s.to_string()))
        }
    }

    #[test]
    fn test_complete_returns_text() {
        let p = Canned(Some("answer"));
        let out = p.complete(None, &[Message::user("q")], None).unwrap();
        assert_eq!(out, "answer");
    }

    #[test]
    fn test_complete_without_text_is_completion_error() {
        let p = Canned(None);
        let err = p.complete(None, &[Message::user("q")], None).unwrap_err();
        assert!(matches!(err, Error::Completion(_)));
    }

    #[test]
    fn test_error_message_from_body() {
        let status = reqwest::StatusCode::TOO_MANY_REQUESTS;
        let body = r#"{"error":{"message":"rate limited"}}"#;
        assert_eq!(error_message_from_body(status, body), "rate limited");
        assert_eq!(
            error_message_from_body(status, "oops"),
            "HTTP 429 Too Many Requests: oops"
        );
    }
}
