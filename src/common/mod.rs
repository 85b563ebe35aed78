//! 共通の型とユーティリティ（HTTPメッセージ、既定値の設定、文字列処理）

pub mod config;
pub mod http;
pub mod utils;

pub use self::config::{CookieConfig, CookieDefaults, CookieDefaultsPatch};
pub use self::http::{HttpMessage, Request, Response};
pub use self::utils::*;
