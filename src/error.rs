//! エラー型の定義

use thiserror::Error;

/// クッキー処理のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// クッキー名が空、または禁止文字を含む
    #[error("Invalid cookie name: {0}")]
    InvalidName(String),

    /// 日時・期間・SameSite等の引数が不正
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Set-Cookieヘッダーの形式が不正
    #[error("Malformed Set-Cookie header: {0}")]
    MalformedHeader(String),

    /// クッキーを読み出せないメッセージ
    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl Error {
    /// エラーからHTTPステータスコードを取得
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidName(_) => 400,
            Error::InvalidArgument(_) => 400,
            Error::MalformedHeader(_) => 400,
            Error::UnsupportedMessage(_) => 500,
            Error::ConfigurationError(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(Error::InvalidName("".into()).status_code(), 400);
        assert_eq!(Error::MalformedHeader("x".into()).status_code(), 400);
        assert_eq!(Error::UnsupportedMessage("x".into()).status_code(), 500);
    }

    #[test]
    fn test_display() {
        let e = Error::InvalidArgument("Invalid expires \"baz\" provided".into());
        assert_eq!(e.to_string(), "Invalid argument: Invalid expires \"baz\" provided");
    }
}
