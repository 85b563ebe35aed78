//! runbridge-cookie: 不変値としてのHTTPクッキーとSet-Cookieヘッダーのエンコード・デコード
//!
//! ```
//! use runbridge_cookie::{Cookie, CookieDefaults, SameSite};
//!
//! let cookie = Cookie::with_defaults("flavor", Some("choco".to_string()), &CookieDefaults::default())?
//!     .secured()
//!     .with_same_site(Some(SameSite::None))?;
//! assert_eq!(cookie.to_header_value(), "flavor=choco; Secure; SameSite=None");
//!
//! let decoded = Cookie::from_header_with_defaults(&cookie.to_header_value(), &CookieDefaults::default())?;
//! assert_eq!(decoded.same_site(), Some(SameSite::None));
//! # Ok::<(), runbridge_cookie::Error>(())
//! ```

pub mod common;
pub mod cookie;
pub mod error;

pub use common::{CookieConfig, CookieDefaults, CookieDefaultsPatch, HttpMessage, Request, Response};
pub use cookie::{
    Cookie, CookieBuilder, CookieContract, CookieEntry, CookieSet, RequestCookie, SameSite, TimeInput,
};
pub use error::Error;
