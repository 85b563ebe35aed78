//! Set-Cookieヘッダー値のエンコード・デコード

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use chrono::Utc;
use regex::Regex;
use crate::common::config::{CookieConfig, CookieDefaults};
use crate::common::utils::{decode_cookie_value, encode_cookie_value, is_header_value_valid, title_case};
use crate::error::Error;
use super::time::{to_timestamp_at, TimeInput};
use super::{Cookie, SameSite};

/// 送出時に使うSet-Cookieヘッダー名
pub const SET_COOKIE: &str = "Set-Cookie";

/// `name=value[; attr]...` の分解（値と属性は最短一致）
const SET_COOKIE_PATTERN: &str = r"^(.*?)=(.*?)(?:; (.*?))?$";

static SET_COOKIE_REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn malformed() -> Error {
    Error::MalformedHeader("Not a valid Set-Cookie header.".to_string())
}

impl Cookie {
    /// Set-Cookieヘッダー値を生成
    ///
    /// 属性の順序は Expires, Path, Domain, Secure, HttpOnly, SameSite で固定。
    /// Max-Ageは出力しない。CRLF等を含むPath/Domainは出力せずに警告する。
    pub fn to_header_value(&self) -> String {
        let mut cookie_str = format!(
            "{}={}",
            self.name,
            encode_cookie_value(self.value.as_deref().unwrap_or(""))
        );

        if let Some(expires) = self.expires_at() {
            cookie_str.push_str(&format!("; Expires={}", expires.format("%a, %d %b %Y %H:%M:%S GMT")));
        }

        if !self.path.is_empty() {
            if is_header_value_valid(&self.path) {
                cookie_str.push_str(&format!("; Path={}", self.path));
            } else {
                log::warn!("Cookie::to_header_value skipped invalid Path value: {:?}", self.path);
            }
        }

        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            if is_header_value_valid(domain) {
                cookie_str.push_str(&format!("; Domain={}", domain));
            } else {
                log::warn!("Cookie::to_header_value skipped invalid Domain value: {:?}", domain);
            }
        }

        if self.secure {
            cookie_str.push_str("; Secure");
        }

        if self.http_only {
            cookie_str.push_str("; HttpOnly");
        }

        if let Some(same_site) = &self.same_site {
            cookie_str.push_str(&format!("; SameSite={}", same_site));
        }

        cookie_str
    }

    /// Set-Cookieヘッダー値を解析（未指定の属性はプロセス全体の既定値）
    pub fn from_header(header: &str) -> Result<Self, Error> {
        Self::from_header_with_defaults(header, &CookieConfig::get())
    }

    /// Set-Cookieヘッダー値を解析（既定値を指定）
    ///
    /// PathとHttpOnlyは既定値に関わらず `""` / `false` から始め、属性で上書きする。
    /// 属性名は大文字小文字を区別せず、未知の属性は無視する。
    pub fn from_header_with_defaults(header: &str, defaults: &CookieDefaults) -> Result<Self, Error> {
        if header.is_empty() {
            return Err(malformed());
        }
        let regex = SET_COOKIE_REGEX
            .get_or_init(|| Regex::new(SET_COOKIE_PATTERN))
            .as_ref()
            .map_err(|e| Error::MalformedHeader(format!("Set-Cookie pattern failed to compile: {}", e)))?;
        let captures = regex.captures(header).ok_or_else(malformed)?;
        let name = captures.get(1).map_or("", |m| m.as_str());
        let value = captures.get(2).map_or("", |m| m.as_str());

        let mut cookie = Cookie::with_defaults(name, Some(decode_cookie_value(value)), defaults)?
            .with_path("")
            .with_http_only(false);

        let Some(attributes) = captures.get(3) else {
            return Ok(cookie);
        };

        for attribute in attributes.as_str().split("; ") {
            if attribute.eq_ignore_ascii_case("HttpOnly") {
                cookie = cookie.with_http_only(true);
            } else if attribute.eq_ignore_ascii_case("Secure") {
                cookie = cookie.with_secure(true);
            } else if let Some(expires) = strip_prefix_ignore_case(attribute, "Expires=") {
                cookie = cookie.with_expires_at(parse_expires_attribute(expires));
            } else if let Some(domain) = strip_prefix_ignore_case(attribute, "Domain=") {
                cookie = cookie.with_domain(Some(domain.to_string()));
            } else if let Some(path) = strip_prefix_ignore_case(attribute, "Path=") {
                cookie = cookie.with_path(path);
            } else if let Some(same_site) = strip_prefix_ignore_case(attribute, "SameSite=") {
                cookie = cookie.with_same_site(SameSite::parse(&title_case(same_site))?)?;
            } else {
                log::debug!("Ignoring unrecognized Set-Cookie attribute {:?}", attribute);
            }
        }

        Ok(cookie)
    }
}

/// 大文字小文字を区別せずに接頭辞を取り除く
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Expires属性の日付を解釈（解釈できない場合は0）
fn parse_expires_attribute(text: &str) -> i64 {
    match to_timestamp_at(TimeInput::Text(text.to_string()), false, Utc::now()) {
        Ok(timestamp) => timestamp,
        Err(e) => {
            log::warn!("Set-Cookie Expires attribute could not be parsed: {}", e);
            0
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

impl FromStr for Cookie {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cookie::from_header(s)
    }
}
