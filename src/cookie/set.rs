//! HTTPメッセージに含まれるクッキーを名前で引ける集合

use std::collections::HashMap;
use crate::common::http::HttpMessage;
use crate::error::Error;
use super::{Cookie, CookieContract, RequestCookie};

/// 集合の要素（リクエスト由来かレスポンス由来か）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieEntry {
    Request(RequestCookie),
    Response(Cookie),
}

impl CookieEntry {
    /// レスポンス由来なら属性付きのクッキーを返す
    pub fn as_cookie(&self) -> Option<&Cookie> {
        match self {
            CookieEntry::Response(cookie) => Some(cookie),
            CookieEntry::Request(_) => None,
        }
    }
}

impl CookieContract for CookieEntry {
    fn name(&self) -> &str {
        match self {
            CookieEntry::Request(cookie) => cookie.name(),
            CookieEntry::Response(cookie) => cookie.name(),
        }
    }

    fn value(&self) -> Option<&str> {
        match self {
            CookieEntry::Request(cookie) => cookie.value(),
            CookieEntry::Response(cookie) => cookie.value(),
        }
    }
}

/// クッキー名をキーとする集合（同名は後勝ち）
#[derive(Debug, Clone, Default)]
pub struct CookieSet {
    cookies: HashMap<String, CookieEntry>,
}

impl CookieSet {
    /// メッセージからクッキーを読み込む
    ///
    /// リクエストはデコード済みのクッキーパラメータから、レスポンスは
    /// Set-Cookieヘッダーを1つずつ解析して読み込む。解析に失敗したヘッダーがあれば
    /// その時点でエラーを返す。
    pub fn of<M: HttpMessage + ?Sized>(message: &M) -> Result<Self, Error> {
        let mut set = Self::default();

        if let Some(params) = message.cookie_params() {
            for (name, value) in params {
                set.insert(CookieEntry::Request(RequestCookie::new(name, Some(value))));
            }
            return Ok(set);
        }

        if let Some(headers) = message.set_cookie_headers() {
            for header in headers {
                set.insert(CookieEntry::Response(Cookie::from_header(&header)?));
            }
            return Ok(set);
        }

        Err(Error::UnsupportedMessage(
            "We are unable to load the cookies of the message".to_string(),
        ))
    }

    fn insert(&mut self, entry: CookieEntry) {
        let name = entry.name().to_string();
        if self.cookies.insert(name, entry).is_some() {
            log::debug!("Duplicate cookie name replaced by the later entry");
        }
    }

    /// 値を取得（存在しない、または値がない場合は `default`）
    pub fn get(&self, name: &str, default: Option<&str>) -> Option<String> {
        self.cookies
            .get(name)
            .and_then(|entry| entry.value())
            .or(default)
            .map(str::to_string)
    }

    pub fn get_cookie(&self, name: &str) -> Option<&CookieEntry> {
        self.cookies.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CookieEntry> {
        self.cookies.values()
    }
}
