//! リクエストの `Cookie` ヘッダー由来のクッキー

use super::Cookie;

/// 名前と値を持つクッキーの共通インターフェース
pub trait CookieContract {
    fn name(&self) -> &str;

    fn value(&self) -> Option<&str>;
}

/// リクエスト側のクッキー（属性を持たない名前と値の組）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    name: String,
    value: Option<String>,
}

impl RequestCookie {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl CookieContract for RequestCookie {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl CookieContract for Cookie {
    fn name(&self) -> &str {
        Cookie::name(self)
    }

    fn value(&self) -> Option<&str> {
        Cookie::value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_cookie() {
        let cookie = RequestCookie::new("foo", Some("bar".to_string()));
        assert_eq!(cookie.name(), "foo");
        assert_eq!(cookie.value(), Some("bar"));

        let empty = RequestCookie::new("foo", None);
        assert_eq!(empty.value(), None);
    }
}
