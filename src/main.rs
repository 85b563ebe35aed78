use std::io::{self, BufRead, Write};
use log::{error, info, warn};

use runbridge_cookie::{Cookie, CookieConfig};

// 1行分のSet-Cookieヘッダー値を解析結果のJSONに変換
fn inspect_line(line: &str) -> serde_json::Value {
    let header = line
        .trim()
        .trim_start_matches("Set-Cookie:")
        .trim_start_matches("set-cookie:")
        .trim();
    match Cookie::from_header(header) {
        Ok(cookie) => serde_json::json!({
            "header": header,
            "cookie": cookie,
            "expiresAt": cookie.expires_at().map(|date| date.to_rfc3339()),
        }),
        Err(e) => serde_json::json!({
            "header": header,
            "error": e.to_string(),
        }),
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    match CookieConfig::init_from_env() {
        Ok(defaults) => info!("Cookie defaults: {:?}", defaults),
        Err(e) => warn!("Falling back to empty cookie defaults: {}", e),
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let result = inspect_line(&line);
        if result.get("error").is_some() {
            error!("Failed to parse Set-Cookie header: {}", line);
        }
        writeln!(out, "{}", result)?;
    }

    Ok(())
}
