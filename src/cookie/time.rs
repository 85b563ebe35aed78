//! Expires / Max-Age に与える日時・期間の解決
//!
//! 数値はそのままUNIX時刻（または秒数）として扱い、文字列は相対表現
//! （`now`、`2 days`、`1 week ago` など）やHTTP日付として解釈する。
//! 期間として解決する場合の基準時刻はUNIXエポック、日時として解決する場合は現在時刻。

use std::time::SystemTime;
use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, Utc};
use crate::error::Error;

/// 5年（365日×5）の秒数
pub const FIVE_YEARS: i64 = 5 * 365 * 24 * 3600;

/// 日時・期間の入力値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInput {
    /// 未指定（0に解決される）
    None,
    /// 暦日時
    DateTime(DateTime<Utc>),
    /// UNIX時刻または秒数
    Timestamp(i64),
    /// 数値文字列・相対表現・日付文字列
    Text(String),
}

impl From<i64> for TimeInput {
    fn from(value: i64) -> Self {
        TimeInput::Timestamp(value)
    }
}

impl From<i32> for TimeInput {
    fn from(value: i32) -> Self {
        TimeInput::Timestamp(value.into())
    }
}

impl From<u32> for TimeInput {
    fn from(value: u32) -> Self {
        TimeInput::Timestamp(value.into())
    }
}

impl From<f64> for TimeInput {
    fn from(value: f64) -> Self {
        TimeInput::Timestamp(value.trunc() as i64)
    }
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        TimeInput::Text(value.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(value: String) -> Self {
        TimeInput::Text(value)
    }
}

impl From<&String> for TimeInput {
    fn from(value: &String) -> Self {
        TimeInput::Text(value.clone())
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(value: DateTime<Utc>) -> Self {
        TimeInput::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for TimeInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        TimeInput::DateTime(value.with_timezone(&Utc))
    }
}

impl From<SystemTime> for TimeInput {
    fn from(value: SystemTime) -> Self {
        TimeInput::DateTime(value.into())
    }
}

impl<T: Into<TimeInput>> From<Option<T>> for TimeInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(TimeInput::None, Into::into)
    }
}

/// 入力を整数の秒に解決（現在時刻基準）
pub fn to_timestamp(input: impl Into<TimeInput>, is_interval: bool) -> Result<i64, Error> {
    to_timestamp_at(input.into(), is_interval, Utc::now())
}

/// 入力を整数の秒に解決（基準となる現在時刻を指定）
pub fn to_timestamp_at(input: TimeInput, is_interval: bool, now: DateTime<Utc>) -> Result<i64, Error> {
    let (seconds, text) = match input {
        TimeInput::None => return Ok(0),
        TimeInput::DateTime(date) => return Ok(date.timestamp()),
        TimeInput::Timestamp(seconds) => (Some(seconds), seconds.to_string()),
        TimeInput::Text(text) => {
            let seconds = parse_numeric(&text).or_else(|| {
                // 期間はエポックからの差分として求める
                let base = if is_interval { DateTime::<Utc>::default() } else { now };
                parse_time_expression(&text, base).map(|date| date.timestamp())
            });
            (seconds, text)
        }
    };
    // 日時として表せない値はExpiresに書けない
    seconds
        .filter(|seconds| DateTime::from_timestamp(*seconds, 0).is_some())
        .ok_or_else(|| invalid_expires(&text))
}

fn invalid_expires(text: &str) -> Error {
    Error::InvalidArgument(format!("Invalid expires \"{}\" provided", text))
}

/// 数値として読める文字列なら整数部を返す（`"42"`, `"42.9"`, `"1e3"`）
fn parse_numeric(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(integer);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// HTTP日付などの絶対日時表現を解釈
pub fn parse_http_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    // IMF-fixdate: "Sun, 06 Nov 1994 08:49:37 GMT"
    for format in ["%a, %d %b %Y %H:%M:%S GMT", "%a, %d %b %Y %H:%M:%S UTC"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    // RFC 850: "Sunday, 06-Nov-94 08:49:37 GMT"
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%A, %d-%b-%y %H:%M:%S GMT") {
        return Some(naive.and_utc());
    }
    // asctime: "Sun Nov  6 08:49:37 1994"
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%a %b %e %H:%M:%S %Y") {
        return Some(naive.and_utc());
    }
    // 曜日が日付と合わない場合は曜日を無視する
    if let Some((_, rest)) = text.split_once(", ") {
        for format in ["%d %b %Y %H:%M:%S GMT", "%d-%b-%y %H:%M:%S GMT"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(rest, format) {
                return Some(naive.and_utc());
            }
        }
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// 相対・絶対の日時表現を `base` を基準に解決
pub fn parse_time_expression(text: &str, base: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if text.trim().is_empty() {
        return None;
    }
    if let Some(date) = parse_http_date(text) {
        return Some(date);
    }
    parse_relative(&text.to_ascii_lowercase(), base)
}

/// 相対指定の累積値
#[derive(Debug, Default)]
struct Offset {
    seconds: i64,
    months: i64,
}

impl Offset {
    fn add(&mut self, amount: i64, unit: &str) -> Option<()> {
        match unit_seconds(unit)? {
            Unit::Seconds(scale) => {
                self.seconds = self.seconds.checked_add(amount.checked_mul(scale)?)?;
            }
            Unit::Months(scale) => {
                self.months = self.months.checked_add(amount.checked_mul(scale)?)?;
            }
        }
        Some(())
    }

    fn negate(&mut self) {
        self.seconds = -self.seconds;
        self.months = -self.months;
    }

    fn apply(&self, date: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = u32::try_from(self.months.unsigned_abs()).ok()?;
        let date = if self.months >= 0 {
            date.checked_add_months(Months::new(months))?
        } else {
            date.checked_sub_months(Months::new(months))?
        };
        date.checked_add_signed(Duration::try_seconds(self.seconds)?)
    }
}

enum Unit {
    Seconds(i64),
    Months(i64),
}

fn unit_seconds(unit: &str) -> Option<Unit> {
    let unit = match unit {
        "sec" | "secs" | "second" | "seconds" => Unit::Seconds(1),
        "min" | "mins" | "minute" | "minutes" => Unit::Seconds(60),
        "hour" | "hours" => Unit::Seconds(3600),
        "day" | "days" => Unit::Seconds(86_400),
        "week" | "weeks" => Unit::Seconds(7 * 86_400),
        "fortnight" | "fortnights" => Unit::Seconds(14 * 86_400),
        "month" | "months" => Unit::Months(1),
        "year" | "years" => Unit::Months(12),
        _ => return None,
    };
    Some(unit)
}

fn start_of_day(date: DateTime<Utc>) -> Option<DateTime<Utc>> {
    date.date_naive().and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// `now`, `tomorrow`, `+1 week 2 days`, `3 hours ago`, `next month` などを解釈
fn parse_relative(text: &str, base: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut date = base;
    let mut offset = Offset::default();
    let mut rest = text.trim_start_matches(|c: char| c.is_whitespace() || c == ',');

    while !rest.is_empty() {
        let first = rest.chars().next()?;
        if first.is_ascii_digit() || first == '+' || first == '-' {
            let (amount, after) = take_number(rest)?;
            let (unit, after) = take_word(after.trim_start());
            offset.add(amount, unit)?;
            rest = after;
        } else {
            let (word, after) = take_word(rest);
            match word {
                "now" => {}
                "today" | "midnight" => date = start_of_day(date)?,
                "noon" => date = start_of_day(date)? + Duration::hours(12),
                "tomorrow" => date = start_of_day(date)? + Duration::days(1),
                "yesterday" => date = start_of_day(date)? - Duration::days(1),
                "ago" => offset.negate(),
                "next" | "last" | "previous" => {
                    let (unit, after) = take_word(after.trim_start());
                    offset.add(if word == "next" { 1 } else { -1 }, unit)?;
                    rest = after.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
                    continue;
                }
                _ => return None,
            }
            rest = after;
        }
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }

    offset.apply(date)
}

/// 先頭の符号付き整数を読み取る
fn take_number(text: &str) -> Option<(i64, &str)> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'+' => (false, text[1..].trim_start()),
        b'-' => (true, text[1..].trim_start()),
        _ => (false, text),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let amount: i64 = digits[..end].parse().ok()?;
    Some((if negative { -amount } else { amount }, &digits[end..]))
}

/// 先頭の英字の並びを読み取る
fn take_word(text: &str) -> (&str, &str) {
    let end = text.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(text.len());
    text.split_at(end)
}
