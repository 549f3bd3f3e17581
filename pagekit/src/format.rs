//! Uzbek locale formatting for numbers, money and dates.

use crate::errors::PageError;
use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

/// Tashkent's offset from UTC, in minutes.
pub const TASHKENT_OFFSET_MINUTES: i32 = 5 * 60;

/// Short weekday names, Sunday first.
pub const WEEKDAYS_SHORT: [&str; 7] = ["Yak", "Dush", "Sesh", "Chor", "Pay", "Jum", "Shan"];

/// Short month names.
pub const MONTHS_SHORT: [&str; 12] = [
    "yan", "fev", "mar", "apr", "may", "iyn", "iyl", "avg", "sen", "okt", "noy", "dek",
];

/// Full month names.
pub const MONTHS_LONG: [&str; 12] = [
    "yanvar", "fevral", "mart", "aprel", "may", "iyun", "iyul", "avgust", "sentabr", "oktabr", "noyabr",
    "dekabr",
];

const MAX_FRACTION_DIGITS: usize = 3;

/// A fixed offset from UTC, falling back to UTC for out-of-range values.
#[must_use]
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix())
}

/// The fixed Tashkent offset.
#[must_use]
pub fn tashkent_offset() -> FixedOffset {
    offset_from_minutes(TASHKENT_OFFSET_MINUTES)
}

/// Formats a number the Uzbek way: space-grouped thousands, comma decimal
/// separator, at most three fraction digits.
///
/// ```
/// assert_eq!(pagekit::format::format_number(1234567.891), "1 234 567,891");
/// assert_eq!(pagekit::format::format_number(-0.5), "-0,5");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + 4);
    if value.is_sign_negative() && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

/// Formats whole so'm: `1 500 000 so'm`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    format!("{} so'm", format_number(amount.round()))
}

/// Formats an instant in Tashkent time: `5-mart, 2024-yil, 14:07`.
#[must_use]
pub fn format_uzbek_date(date: DateTime<Utc>) -> String {
    format_uzbek_date_in(date, tashkent_offset())
}

/// [`format_uzbek_date`] in an arbitrary zone.
#[must_use]
pub fn format_uzbek_date_in(date: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = date.with_timezone(&offset);
    format!(
        "{}-{}, {}-yil, {:02}:{:02}",
        local.day(),
        MONTHS_LONG[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute()
    )
}

/// Parses an RFC 3339 timestamp and formats it with [`format_uzbek_date`].
pub fn format_uzbek_date_str(date: &str) -> Result<String, PageError> {
    let parsed = DateTime::parse_from_rfc3339(date)?;
    Ok(format_uzbek_date(parsed.with_timezone(&Utc)))
}

/// The clock widget text: `Dush, 5-mar, 14:07:09`.
#[must_use]
pub fn format_clock(now: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = now.with_timezone(&offset);
    format!(
        "{}, {}-{}, {:02}:{:02}:{:02}",
        WEEKDAYS_SHORT[local.weekday().num_days_from_sunday() as usize],
        local.day(),
        MONTHS_SHORT[local.month0() as usize],
        local.hour(),
        local.minute(),
        local.second()
    )
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
