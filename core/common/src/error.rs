//! エラーハンドリング
//!
//! 全レイヤーで共有するエラー型。終了コードは sysexits に合わせる。

use thiserror::Error as ThisError;

/// エラー型
///
/// 各バリアントは `exit_code()` で終了コードに対応付けられる。
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// 引数不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Json(String),
    #[error("{0}")]
    Http(String),
    #[error("{0}")]
    Env(String),
    /// 要約 API の失敗（呼び出し側で握りつぶして続行する）
    #[error("Summarization failed: {0}")]
    Summarization(String),
    #[error("Completion failed: {0}")]
    Completion(String),
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn summarization(msg: impl Into<String>) -> Self {
        Self::Summarization(msg.into())
    }

    pub fn completion(msg: impl Into<String>) -> Self {
        Self::Completion(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// usage を表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// プロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) | Self::Env(_) => 64,
            Self::Json(_) => 65,
            Self::Summarization(_) | Self::System(_) => 70,
            Self::Io(_) | Self::Http(_) | Self::Completion(_) => 74,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = Error::invalid_argument("test");
        assert_eq!(err.to_string(), "test");
        assert_eq!(err.exit_code(), 64);
        assert!(err.is_usage());

        let err = Error::system("test");
        assert_eq!(err.exit_code(), 70);
        assert!(!err.is_usage());
    }

    #[test]
    fn test_summarization_message_is_prefixed() {
        let err = Error::summarization("quota exceeded");
        assert_eq!(err.to_string(), "Summarization failed: quota exceeded");
    }

    #[test]
    fn test_io_and_http_share_exit_code() {
        assert_eq!(Error::io_msg("x").exit_code(), 74);
        assert_eq!(Error::http("x").exit_code(), 74);
        assert_eq!(Error::json("x").exit_code(), 65);
    }
}
