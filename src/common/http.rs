//! HTTPメッセージの最小限の型（クッキーの読み書きに必要な部分のみ）

use std::collections::HashMap;
use http::header::{COOKIE, SET_COOKIE};
use super::utils::{is_header_value_valid, parse_cookie_header};

/// クッキーの読み出し元となるHTTPメッセージ
///
/// リクエストはデコード済みのクッキーパラメータを、レスポンスはSet-Cookieヘッダー値を返す。
/// どちらも返さないメッセージからはクッキーを読み込めない。
pub trait HttpMessage {
    /// デコード済みの名前→値（リクエスト）
    fn cookie_params(&self) -> Option<HashMap<String, String>> {
        None
    }

    /// Set-Cookieヘッダー値を出現順に（レスポンス）
    fn set_cookie_headers(&self) -> Option<Vec<String>> {
        None
    }
}

/// HTTPリクエスト
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// HTTPヘッダー（小文字キー）
    pub headers: HashMap<String, String>,
    /// デコード済みのクッキー
    pub cookie_params: HashMap<String, String>,
}

impl Request {
    /// 新しいリクエストを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ヘッダーを追加（CRLF等を含む値は拒否）
    ///
    /// `Cookie` ヘッダーはクッキーパラメータにも展開する。
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into().to_ascii_lowercase();
        let value = value.into();
        if !is_header_value_valid(&value) {
            log::warn!("Request::with_header rejected invalid value for {:?}", key);
            return self;
        }
        if key == COOKIE.as_str() {
            self.cookie_params.extend(parse_cookie_header(&value));
        }
        self.headers.insert(key, value);
        self
    }

    /// クッキーパラメータを追加
    pub fn with_cookie_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookie_params.insert(name.into(), value.into());
        self
    }

    /// クッキーパラメータをまとめて追加
    pub fn with_cookie_params(mut self, params: HashMap<String, String>) -> Self {
        self.cookie_params.extend(params);
        self
    }
}

impl HttpMessage for Request {
    fn cookie_params(&self) -> Option<HashMap<String, String>> {
        Some(self.cookie_params.clone())
    }
}

/// HTTPレスポンス
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTPステータスコード
    pub status: u16,
    /// HTTPヘッダー（同名の複数値を出現順に保持）
    pub headers: Vec<(String, String)>,
}

impl Response {
    /// 新しいレスポンスを作成
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// 200 OKレスポンスを作成
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// ヘッダーを設定（同名の既存値は置き換える）
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(name, _)| !name.eq_ignore_ascii_case(&key));
        self.with_added_header(key, value)
    }

    /// ヘッダーを追加（同名の既存値は残す、CRLF等を含む値は拒否）
    pub fn with_added_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if !is_header_value_valid(&value) {
            log::warn!("Response::with_added_header rejected invalid value for {:?}", key);
            return self;
        }
        self.headers.push((key, value));
        self
    }

    /// 同名ヘッダーの値を出現順に取得（大文字小文字を区別しない）
    pub fn header_values(&self, key: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// クッキーをSet-Cookieヘッダーとして追加
    pub fn with_cookie(self, cookie: &crate::cookie::Cookie) -> Self {
        cookie.apply_to(self)
    }
}

impl HttpMessage for Response {
    fn set_cookie_headers(&self) -> Option<Vec<String>> {
        Some(
            self.header_values(SET_COOKIE.as_str())
                .into_iter()
                .map(str::to_string)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::CookieDefaults;
    use crate::cookie::Cookie;

    #[test]
    fn test_request_cookie_header_is_expanded() {
        let req = Request::new()
            .with_header("Cookie", "session=abc123; theme=dark%20mode")
            .with_cookie_param("extra", "1");

        assert_eq!(req.headers.get("cookie"), Some(&"session=abc123; theme=dark%20mode".to_string()));
        let params = req.cookie_params().unwrap();
        assert_eq!(params.get("session"), Some(&"abc123".to_string()));
        assert_eq!(params.get("theme"), Some(&"dark mode".to_string()));
        assert_eq!(params.get("extra"), Some(&"1".to_string()));
        assert_eq!(req.set_cookie_headers(), None);
    }

    #[test]
    fn test_request_rejects_crlf_header() {
        let req = Request::new().with_header("X-Bad", "bad\r\ninjected: 1");
        assert!(req.headers.get("x-bad").is_none());
    }

    #[test]
    fn test_response_keeps_multiple_set_cookie() {
        let res = Response::ok()
            .with_added_header("Set-Cookie", "a=1")
            .with_added_header("Content-Type", "text/plain")
            .with_added_header("set-cookie", "b=2");

        assert_eq!(res.header_values("Set-Cookie"), vec!["a=1", "b=2"]);
        assert_eq!(res.set_cookie_headers(), Some(vec!["a=1".to_string(), "b=2".to_string()]));
        assert_eq!(res.cookie_params(), None);
    }

    #[test]
    fn test_response_with_header_replaces() {
        let res = Response::ok()
            .with_header("Content-Type", "text/plain")
            .with_header("content-type", "application/json");
        assert_eq!(res.header_values("Content-Type"), vec!["application/json"]);
    }

    #[test]
    fn test_response_with_cookie() {
        let cookie = Cookie::with_defaults("sessionId", Some("e8bb43229de9".to_string()), &CookieDefaults::EMPTY)
            .unwrap()
            .with_path("/")
            .with_domain(Some("foo.example.com".to_string()));
        let res = Response::ok()
            .with_added_header("Set-Cookie", "other=1")
            .with_cookie(&cookie);

        assert_eq!(
            res.header_values("Set-Cookie"),
            vec!["other=1", "sessionId=e8bb43229de9; Path=/; Domain=foo.example.com"]
        );
    }
}
