//! 共通ユーティリティ関数群（クッキー名の検証、値のURLエンコード、Cookieヘッダー解析 等）

use std::collections::HashMap;
use crate::error::Error;

/// クッキー名に使用できない文字
pub const FORBIDDEN_NAME_CHARS: &[char] = &['=', ',', ';', ' ', '\t', '\r', '\n', '\x0B', '\x0C'];

/// Cookie名が有効か（空でなく、禁止文字を含まない）
pub fn is_cookie_name_valid(name: &str) -> bool {
    !name.is_empty() && !name.contains(FORBIDDEN_NAME_CHARS)
}

/// ヘルパー: 無効なCookie名ならErrorを返す
pub fn validate_cookie_name(name: &str) -> Result<(), Error> {
    if name.contains(FORBIDDEN_NAME_CHARS) {
        return Err(Error::InvalidName(format!(
            "The cookie name \"{}\" contains invalid characters.",
            name.escape_default()
        )));
    }
    if name.is_empty() {
        return Err(Error::InvalidName("The cookie name cannot be empty.".to_string()));
    }
    Ok(())
}

/// ヘッダー値に使用可能な文字かを判定（CRLF・制御文字を拒否）
pub fn is_header_value_valid(value: &str) -> bool {
    // 保守的にタブ以外の制御文字(0x00-0x1F, 0x7F)を拒否する
    value.chars().all(|c| {
        let code = c as u32;
        (code >= 0x20 && code != 0x7F) || c == '\t'
    })
}

/// クッキー値をURLエンコード
pub fn encode_cookie_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// クッキー値のURLエンコードを解除
///
/// UTF-8として不正なバイト列になる場合は置換文字で補う。
pub fn decode_cookie_value(value: &str) -> String {
    match urlencoding::decode(value) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            log::warn!("Cookie value {:?} is not valid UTF-8 after decoding: {}", value, e);
            String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
        }
    }
}

/// `Cookie` リクエストヘッダー（`a=1; b=2`）をデコード済みの名前→値の対応に変換
///
/// `=` を含まない断片と名前が不正な断片は読み飛ばす。同名は後勝ち。
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for pair in header.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let name = name.trim();
        if !is_cookie_name_valid(name) {
            log::debug!("Skipping cookie pair with invalid name: {:?}", name);
            continue;
        }
        cookies.insert(name.to_string(), decode_cookie_value(value.trim()));
    }

    cookies
}

/// 先頭のみ大文字、残りを小文字にする（`none` → `None`）
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}


#[cfg(test)]
mod sec_tests {
    use super::*;

    #[test]
    fn header_value_rejects_crlf_and_ctl() {
        assert!(is_header_value_valid("normal-Value_123"));
        assert!(is_header_value_valid(""));
        assert!(!is_header_value_valid("bad\rvalue"));
        assert!(!is_header_value_valid("bad\nvalue"));
        assert!(!is_header_value_valid("bad\x07bell"));
    }
}
