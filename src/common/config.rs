//! クッキー属性の既定値（ドメイン・Secure・HttpOnly・SameSite）
//!
//! 既定値は `CookieDefaults` として明示的に渡すことも、プロセス全体の
//! `CookieConfig` に登録して `Cookie::new` などから参照させることもできる。

use std::env;
use std::sync::{PoisonError, RwLock};
use serde::{Deserialize, Serialize};
use crate::cookie::SameSite;
use crate::error::Error;

/// 環境変数: 既定のDomain属性
pub const ENV_COOKIE_DOMAIN: &str = "RUNBRIDGE_COOKIE_DOMAIN";
/// 環境変数: 既定のSecure属性
pub const ENV_COOKIE_SECURE: &str = "RUNBRIDGE_COOKIE_SECURE";
/// 環境変数: 既定のHttpOnly属性
pub const ENV_COOKIE_HTTP_ONLY: &str = "RUNBRIDGE_COOKIE_HTTP_ONLY";
/// 環境変数: 既定のSameSite属性
pub const ENV_COOKIE_SAME_SITE: &str = "RUNBRIDGE_COOKIE_SAME_SITE";

/// クッキー生成時に未指定の属性を補う既定値
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CookieDefaults {
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
    #[serde(with = "same_site_text")]
    pub same_site: Option<SameSite>,
}

impl CookieDefaults {
    /// すべて空の既定値（`("", false, false, "")`）
    pub const EMPTY: CookieDefaults = CookieDefaults {
        domain: String::new(),
        secure: false,
        http_only: false,
        same_site: None,
    };

    /// ドメインを設定
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// セキュアフラグを設定
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// HttpOnlyフラグを設定
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// SameSite属性を設定
    pub fn with_same_site(mut self, same_site: Option<SameSite>) -> Self {
        self.same_site = same_site;
        self
    }

    /// 部分的な変更を適用
    pub fn apply(&mut self, patch: CookieDefaultsPatch) {
        if let Some(domain) = patch.domain {
            self.domain = domain;
        }
        if let Some(secure) = patch.secure {
            self.secure = secure;
        }
        if let Some(http_only) = patch.http_only {
            self.http_only = http_only;
        }
        if let Some(same_site) = patch.same_site {
            self.same_site = same_site;
        }
    }

    /// 環境変数から既定値を読み込む
    ///
    /// 未設定の項目は空の既定値のまま。真偽値として解釈できない値は警告を出して無視する。
    /// SameSiteが不正な場合は `ConfigurationError` を返す。
    pub fn from_env() -> Result<Self, Error> {
        let mut defaults = Self::default();

        if let Ok(domain) = env::var(ENV_COOKIE_DOMAIN) {
            defaults.domain = domain.trim().to_string();
        }
        if let Some(secure) = env_flag(ENV_COOKIE_SECURE) {
            defaults.secure = secure;
        }
        if let Some(http_only) = env_flag(ENV_COOKIE_HTTP_ONLY) {
            defaults.http_only = http_only;
        }
        if let Ok(same_site) = env::var(ENV_COOKIE_SAME_SITE) {
            defaults.same_site = SameSite::parse(same_site.trim())
                .map_err(|e| Error::ConfigurationError(format!("{}: {}", ENV_COOKIE_SAME_SITE, e)))?;
        }

        Ok(defaults)
    }
}

/// 真偽値の環境変数を解釈
fn env_flag(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        other => {
            log::warn!("Ignoring {}={:?}: expected a boolean", key, other);
            None
        }
    }
}

/// `CookieDefaults` の部分更新（`None` の項目は変更しない）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieDefaultsPatch {
    pub domain: Option<String>,
    pub secure: Option<bool>,
    pub http_only: Option<bool>,
    pub same_site: Option<Option<SameSite>>,
}

static PROCESS_DEFAULTS: RwLock<CookieDefaults> = RwLock::new(CookieDefaults::EMPTY);

/// プロセス全体で共有されるクッキー既定値
///
/// `configure()` が返す設定子の `with_*` は呼び出した時点で即座に反映される。
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieConfig;

impl CookieConfig {
    /// 現在の既定値のスナップショットを取得
    pub fn get() -> CookieDefaults {
        PROCESS_DEFAULTS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 部分的に既定値を更新
    pub fn set(patch: CookieDefaultsPatch) {
        let mut guard = PROCESS_DEFAULTS.write().unwrap_or_else(PoisonError::into_inner);
        guard.apply(patch);
        log::debug!("Cookie defaults updated: {:?}", *guard);
    }

    /// 既定値を丸ごと置き換え
    pub fn replace(defaults: CookieDefaults) {
        *PROCESS_DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = defaults;
    }

    /// `("", false, false, "")` に戻す
    pub fn reset() -> Self {
        Self::replace(CookieDefaults::EMPTY);
        CookieConfig
    }

    /// 環境変数から読み込んだ既定値を登録
    pub fn init_from_env() -> Result<CookieDefaults, Error> {
        let defaults = CookieDefaults::from_env()?;
        Self::replace(defaults.clone());
        Ok(defaults)
    }

    /// 流れるような設定子を取得
    pub fn configure() -> Self {
        CookieConfig
    }

    pub fn with_domain(self, domain: impl Into<String>) -> Self {
        Self::set(CookieDefaultsPatch { domain: Some(domain.into()), ..Default::default() });
        self
    }

    pub fn with_secure(self, secure: bool) -> Self {
        Self::set(CookieDefaultsPatch { secure: Some(secure), ..Default::default() });
        self
    }

    pub fn with_http_only(self, http_only: bool) -> Self {
        Self::set(CookieDefaultsPatch { http_only: Some(http_only), ..Default::default() });
        self
    }

    pub fn with_same_site(self, same_site: Option<SameSite>) -> Self {
        Self::set(CookieDefaultsPatch { same_site: Some(same_site), ..Default::default() });
        self
    }
}

/// SameSiteを `""` / `"Lax"` / `"Strict"` / `"None"` の文字列として直列化
mod same_site_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use crate::cookie::SameSite;

    pub fn serialize<S: Serializer>(value: &Option<SameSite>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SameSite>, D::Error> {
        let text = String::deserialize(deserializer)?;
        SameSite::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_empty() {
        let defaults = CookieDefaults::default();
        assert_eq!(defaults, CookieDefaults::EMPTY);
        assert_eq!(defaults.domain, "");
        assert!(!defaults.secure);
        assert!(!defaults.http_only);
        assert_eq!(defaults.same_site, None);
    }

    #[test]
    fn test_apply_patch_only_touches_given_fields() {
        let mut defaults = CookieDefaults::default().with_domain("foo.com").with_secure(true);
        defaults.apply(CookieDefaultsPatch {
            http_only: Some(true),
            same_site: Some(Some(SameSite::Lax)),
            ..Default::default()
        });
        assert_eq!(defaults.domain, "foo.com");
        assert!(defaults.secure);
        assert!(defaults.http_only);
        assert_eq!(defaults.same_site, Some(SameSite::Lax));

        defaults.apply(CookieDefaultsPatch { same_site: Some(None), ..Default::default() });
        assert_eq!(defaults.same_site, None);
    }

    #[test]
    fn test_defaults_from_json() {
        let defaults: CookieDefaults = serde_json::from_str(
            r#"{"domain":"example.com","secure":true,"httpOnly":true,"sameSite":"Strict"}"#,
        )
        .unwrap();
        assert_eq!(
            defaults,
            CookieDefaults::default()
                .with_domain("example.com")
                .with_secure(true)
                .with_http_only(true)
                .with_same_site(Some(SameSite::Strict))
        );

        let partial: CookieDefaults = serde_json::from_str(r#"{"sameSite":""}"#).unwrap();
        assert_eq!(partial, CookieDefaults::EMPTY);

        assert!(serde_json::from_str::<CookieDefaults>(r#"{"sameSite":"lax"}"#).is_err());
    }

    #[test]
    fn test_defaults_to_json() {
        let json = serde_json::to_value(CookieDefaults::default().with_same_site(Some(SameSite::Lax))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"domain": "", "secure": false, "httpOnly": false, "sameSite": "Lax"})
        );
    }

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                (ENV_COOKIE_DOMAIN, Some("example.org")),
                (ENV_COOKIE_SECURE, Some("true")),
                (ENV_COOKIE_HTTP_ONLY, Some("maybe")),
                (ENV_COOKIE_SAME_SITE, Some("None")),
            ],
            || {
                let defaults = CookieDefaults::from_env().unwrap();
                assert_eq!(defaults.domain, "example.org");
                assert!(defaults.secure);
                // 解釈できない値は既定値のまま
                assert!(!defaults.http_only);
                assert_eq!(defaults.same_site, Some(SameSite::None));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_same_site() {
        temp_env::with_vars(
            [
                (ENV_COOKIE_DOMAIN, None),
                (ENV_COOKIE_SECURE, None),
                (ENV_COOKIE_HTTP_ONLY, None),
                (ENV_COOKIE_SAME_SITE, Some("sometimes")),
            ],
            || {
                let err = CookieDefaults::from_env().unwrap_err();
                assert!(matches!(err, Error::ConfigurationError(_)));
            },
        );
    }
}
