//! HTTPクッキー関連の実装
//!
//! `Cookie` は不変の値オブジェクト。`with_*` 系の操作はすべて新しい `Cookie` を返し、
//! 呼び出し元のインスタンスは変更されない。

mod codec;
mod request;
mod set;
pub mod time;

use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::common::config::{CookieConfig, CookieDefaults};
use crate::common::http::Response;
use crate::common::utils::validate_cookie_name;
use crate::error::Error;

pub use codec::SET_COOKIE;
pub use request::{CookieContract, RequestCookie};
pub use set::{CookieEntry, CookieSet};
pub use time::{to_timestamp, TimeInput, FIVE_YEARS};

/// SameSite属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// 属性値の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }

    /// 属性値を解釈する（大文字小文字を区別、`""` は未指定）
    pub fn parse(value: &str) -> Result<Option<SameSite>, Error> {
        match value {
            "" => Ok(None),
            "Lax" => Ok(Some(SameSite::Lax)),
            "Strict" => Ok(Some(SameSite::Strict)),
            "None" => Ok(Some(SameSite::None)),
            _ => Err(Error::InvalidArgument(
                "The same site attribute must be \"Lax\", \"Strict\", \"None\" or \"\"".to_string(),
            )),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SameSite=None はSecureなクッキーにのみ許可される
fn assert_valid_same_site(same_site: Option<SameSite>, secure: bool) -> Result<(), Error> {
    if same_site == Some(SameSite::None) && !secure {
        return Err(Error::InvalidArgument(
            "The same site attribute can only be \"None\" when secure is set to true".to_string(),
        ));
    }
    Ok(())
}

/// HTTPクッキー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    name: String,
    value: Option<String>,
    expires: i64,
    max_age: Option<i64>,
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl Cookie {
    /// 新しいクッキーを作成（未指定の属性はプロセス全体の既定値から補う）
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, Error> {
        Self::builder(name).value(value).build()
    }

    /// 値を持たないクッキーを作成
    pub fn named(name: impl Into<String>) -> Result<Self, Error> {
        Self::builder(name).build()
    }

    /// 明示的な既定値でクッキーを作成
    pub fn with_defaults(
        name: impl Into<String>,
        value: Option<String>,
        defaults: &CookieDefaults,
    ) -> Result<Self, Error> {
        let mut builder = Self::builder(name).defaults(defaults.clone());
        builder.value = value;
        builder.build()
    }

    /// 全属性を指定できるビルダーを取得
    pub fn builder(name: impl Into<String>) -> CookieBuilder {
        CookieBuilder::new(name)
    }

    /// ブラウザに削除させるためのクッキー（1時間前に失効）
    pub fn that_delete(name: impl Into<String>) -> Result<Self, Error> {
        Ok(Self::named(name)?.with_expires_at(Utc::now().timestamp() - 3600))
    }

    /// このクッキーをSet-Cookieヘッダーとしてレスポンスに追加
    pub fn apply_to(&self, response: Response) -> Response {
        response.with_added_header(SET_COOKIE, self.to_header_value())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// 有効期限（UNIX時刻、0はExpires属性なし）
    pub fn expires(&self) -> i64 {
        self.expires
    }

    /// 有効期限を日時として取得
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.expires == 0 {
            return None;
        }
        DateTime::from_timestamp(self.expires, 0)
    }

    /// Max-Age（秒）
    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// SameSite属性の文字列表現（未指定は `""`）
    pub fn same_site_str(&self) -> &'static str {
        self.same_site.map(|s| s.as_str()).unwrap_or("")
    }

    /// 名前を変更（検証あり）
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        validate_cookie_name(&name)?;
        Ok(Self { name, ..self.clone() })
    }

    pub fn with_value(&self, value: Option<String>) -> Self {
        Self { value, ..self.clone() }
    }

    /// 有効期限を設定
    ///
    /// 数値はUNIX時刻、文字列は現在時刻を基準とした相対表現または日付として解釈する。
    pub fn with_expires(&self, expires: impl Into<TimeInput>) -> Result<Self, Error> {
        Ok(self.with_expires_at(to_timestamp(expires, false)?))
    }

    pub fn that_expires_on(&self, expires: impl Into<TimeInput>) -> Result<Self, Error> {
        self.with_expires(expires)
    }

    pub fn that_remains_until(&self, expires: impl Into<TimeInput>) -> Result<Self, Error> {
        self.with_expires(expires)
    }

    fn with_expires_at(&self, expires: i64) -> Self {
        Self { expires, ..self.clone() }
    }

    /// Max-Ageを設定
    ///
    /// 文字列はエポックを基準とした期間（`"2 days"` → 172800）として解釈する。
    pub fn with_max_age(&self, max_age: impl Into<TimeInput>) -> Result<Self, Error> {
        Ok(self.with_max_age_secs(to_timestamp(max_age, true)?))
    }

    pub fn that_expires_in(&self, max_age: impl Into<TimeInput>) -> Result<Self, Error> {
        self.with_max_age(max_age)
    }

    pub fn that_stay_for(&self, max_age: impl Into<TimeInput>) -> Result<Self, Error> {
        self.with_max_age(max_age)
    }

    /// 5年間有効なクッキー
    pub fn that_stay_forever(&self) -> Self {
        self.with_max_age_secs(FIVE_YEARS)
    }

    fn with_max_age_secs(&self, max_age: i64) -> Self {
        Self { max_age: Some(max_age), ..self.clone() }
    }

    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self { path: path.into(), ..self.clone() }
    }

    pub fn with_domain(&self, domain: Option<String>) -> Self {
        Self { domain, ..self.clone() }
    }

    /// セキュアフラグを設定
    ///
    /// SameSite=Noneのまま外すこともできるが、そのヘッダーは `from_header` で拒否される。
    pub fn with_secure(&self, secure: bool) -> Self {
        Self { secure, ..self.clone() }
    }

    pub fn secured(&self) -> Self {
        self.with_secure(true)
    }

    pub fn unsecured(&self) -> Self {
        self.with_secure(false)
    }

    /// HttpOnlyフラグを設定
    pub fn with_http_only(&self, http_only: bool) -> Self {
        Self { http_only, ..self.clone() }
    }

    pub fn http_only(&self) -> Self {
        self.with_http_only(true)
    }

    /// JavaScriptから参照可能にする（HttpOnlyを外す）
    pub fn available_in_js(&self) -> Self {
        self.with_http_only(false)
    }

    /// SameSite属性を設定（`None` はSecureなクッキーのみ）
    pub fn with_same_site(&self, same_site: Option<SameSite>) -> Result<Self, Error> {
        assert_valid_same_site(same_site, self.secure)?;
        Ok(Self { same_site, ..self.clone() })
    }

    /// SameSite属性を文字列で設定（`""`, `"Lax"`, `"Strict"`, `"None"`）
    pub fn with_same_site_str(&self, same_site: &str) -> Result<Self, Error> {
        self.with_same_site(SameSite::parse(same_site)?)
    }
}

/// `Cookie` のビルダー
///
/// 省略したDomain/Secure/HttpOnly/SameSiteは、`defaults` で与えた既定値か、
/// なければ `build()` 時点のプロセス全体の既定値から補われる。
#[derive(Debug, Clone)]
pub struct CookieBuilder {
    name: String,
    value: Option<String>,
    expires: i64,
    path: String,
    domain: Option<String>,
    secure: Option<bool>,
    http_only: Option<bool>,
    same_site: Option<Option<SameSite>>,
    max_age: Option<i64>,
    defaults: Option<CookieDefaults>,
}

impl CookieBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            expires: 0,
            path: String::new(),
            domain: None,
            secure: None,
            http_only: None,
            same_site: None,
            max_age: None,
            defaults: None,
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// 有効期限（UNIX時刻）
    pub fn expires(mut self, expires: i64) -> Self {
        self.expires = expires;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = Some(http_only);
        self
    }

    pub fn same_site(mut self, same_site: Option<SameSite>) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Max-Age（秒）
    pub fn max_age(mut self, max_age: i64) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// 省略した属性の補完に使う既定値
    pub fn defaults(mut self, defaults: CookieDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// クッキーを構築（名前とSameSite/Secureの組み合わせを検証）
    pub fn build(self) -> Result<Cookie, Error> {
        validate_cookie_name(&self.name)?;
        let defaults = self.defaults.unwrap_or_else(CookieConfig::get);

        let secure = self.secure.unwrap_or(defaults.secure);
        let same_site = self.same_site.unwrap_or(defaults.same_site);
        assert_valid_same_site(same_site, secure)?;
        let expires = to_timestamp(self.expires, false)?;

        Ok(Cookie {
            name: self.name,
            value: self.value,
            expires,
            max_age: self.max_age,
            path: self.path,
            domain: Some(self.domain.unwrap_or(defaults.domain)),
            secure,
            http_only: self.http_only.unwrap_or(defaults.http_only),
            same_site,
        })
    }
}
