//! Excel serial dates and time-format rendering.
//!
//! Excel stores dates as a day count with the time of day in the fraction.
//! The 1900 system counts from 1899-12-31 and pretends 1900-02-29 existed
//! (serial 60); the 1904 system counts from 1904-01-01 with no such quirk.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;
const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;
/// Larger day counts overflow the calendar long before they overflow `Duration`.
const MAX_SERIAL_DAYS: f64 = 1.0e9;

fn epoch_1899_12_30() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn epoch_1904_01_01() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1904, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert an Excel serial number to a calendar date-time.
///
/// Serials before the phantom 1900-02-29 are shifted by one day so that
/// serial 1 is 1900-01-01. The time of day is rounded to the nearest second.
/// Returns `None` for serials that are not finite or fall outside the
/// calendar range.
#[allow(clippy::cast_possible_truncation)]
pub fn time_from_excel_time(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    let days = serial.floor();
    let seconds = ((serial - days) * SECONDS_PER_DAY).round() as i64;

    let epoch = if date1904 {
        epoch_1904_01_01()
    } else if days < 61.0 {
        epoch_1899_12_30() + Duration::days(1)
    } else {
        epoch_1899_12_30()
    };

    epoch
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Convert a calendar date-time to an Excel serial in the 1900 system.
#[allow(clippy::cast_precision_loss)]
pub fn time_to_excel_time(dt: NaiveDateTime) -> f64 {
    let delta = dt - epoch_1899_12_30();
    let days = delta.num_days();
    let rest = delta - Duration::days(days);
    let nanos = rest.num_nanoseconds().unwrap_or(0);
    days as f64 + nanos as f64 / NANOS_PER_DAY
}

/// Render `serial` through an Excel date/time format code.
///
/// 12-hour display is selected by the presence of an am/pm marker, not by
/// the number of `h` characters. A `[h]` token whose elapsed hour count is
/// zero is omitted together with the `:` that follows it. Returns `None`
/// when the serial has no calendar date.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_time(serial: f64, format_code: &str, date1904: bool) -> Option<String> {
    let dt = time_from_excel_time(serial, date1904)?;
    let tokens = parse_date_format_tokens(format_code);
    let has_ampm = tokens
        .iter()
        .any(|t| matches!(t, DateToken::AmPm(_) | DateToken::AP(_)));

    let (year, month, day) = (dt.year(), dt.month(), dt.day());
    let (hour, minute, second) = (dt.hour(), dt.minute(), dt.second());
    let day_of_week = dt.weekday().num_days_from_sunday();
    let display_hour = if has_ampm {
        match hour {
            0 => 12,
            1..=12 => hour,
            _ => hour - 12,
        }
    } else {
        hour
    };
    let elapsed_seconds = (serial.abs() * SECONDS_PER_DAY).round() as u64;

    let mut result = String::new();
    let mut skip_colon = false;
    for token in &tokens {
        if skip_colon {
            skip_colon = false;
            if matches!(token, DateToken::Literal(s) if s == ":") {
                continue;
            }
        }
        match token {
            DateToken::Year4 => result.push_str(&format!("{year:04}")),
            DateToken::Year2 => result.push_str(&format!("{:02}", year.rem_euclid(100))),
            DateToken::Month1 => result.push_str(&month.to_string()),
            DateToken::Month2 => result.push_str(&format!("{month:02}")),
            DateToken::Month3 => result.push_str(month_abbrev(month)),
            DateToken::Month4 => result.push_str(month_full(month)),
            DateToken::Month5 => result.push_str(month_letter(month)),
            DateToken::Day1 => result.push_str(&day.to_string()),
            DateToken::Day2 => result.push_str(&format!("{day:02}")),
            DateToken::Day3 => result.push_str(day_abbrev(day_of_week)),
            DateToken::Day4 => result.push_str(day_full(day_of_week)),
            DateToken::Hour1 => result.push_str(&display_hour.to_string()),
            DateToken::Hour2 => result.push_str(&format!("{display_hour:02}")),
            DateToken::Minute1 => result.push_str(&minute.to_string()),
            DateToken::Minute2 => result.push_str(&format!("{minute:02}")),
            DateToken::Second1 => result.push_str(&second.to_string()),
            DateToken::Second2 => result.push_str(&format!("{second:02}")),
            DateToken::AmPm(upper) => {
                let marker = if hour >= 12 { "PM" } else { "AM" };
                if *upper {
                    result.push_str(marker);
                } else {
                    result.push_str(&marker.to_ascii_lowercase());
                }
            }
            DateToken::AP(upper) => {
                let marker = if hour >= 12 { "P" } else { "A" };
                if *upper {
                    result.push_str(marker);
                } else {
                    result.push_str(&marker.to_ascii_lowercase());
                }
            }
            DateToken::Literal(s) => result.push_str(s),
            DateToken::ElapsedHours => {
                let hours = elapsed_seconds / 3600;
                if hours == 0 {
                    skip_colon = true;
                } else {
                    result.push_str(&hours.to_string());
                }
            }
            DateToken::ElapsedMinutes => result.push_str(&(elapsed_seconds / 60).to_string()),
            DateToken::ElapsedSeconds => result.push_str(&elapsed_seconds.to_string()),
        }
    }

    Some(result)
}

/// Token types for date format parsing
#[derive(Debug, Clone, PartialEq)]
enum DateToken {
    Year4,           // yyyy
    Year2,           // yy or y
    Month1,          // m
    Month2,          // mm
    Month3,          // mmm
    Month4,          // mmmm
    Month5,          // mmmmm
    Day1,            // d
    Day2,            // dd
    Day3,            // ddd
    Day4,            // dddd
    Hour1,           // h
    Hour2,           // hh
    Minute1,         // m after h or before s
    Minute2,         // mm after h or before s
    Second1,         // s
    Second2,         // ss
    AmPm(bool),      // AM/PM, true when written upper case
    AP(bool),        // A/P
    Literal(String), // literal text or separator
    ElapsedHours,    // [h]
    ElapsedMinutes,  // [m]
    ElapsedSeconds,  // [s]
}

/// Parse a date format code into tokens.
#[allow(clippy::indexing_slicing)]
fn parse_date_format_tokens(format_code: &str) -> Vec<DateToken> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = format_code.chars().collect();
    let mut i = 0;
    let mut in_time_context = false; // seen h and not yet s

    while i < chars.len() {
        let c = chars[i];
        let c_lower = c.to_ascii_lowercase();

        if c == '"' {
            let mut literal = String::new();
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                literal.push(chars[i]);
                i += 1;
            }
            i += 1;
            tokens.push(DateToken::Literal(literal));
            continue;
        }

        if c == '\\' && i + 1 < chars.len() {
            tokens.push(DateToken::Literal(chars[i + 1].to_string()));
            i += 2;
            continue;
        }

        if c == '[' {
            let mut j = i + 1;
            while j < chars.len() && chars[j] != ']' {
                j += 1;
            }
            let inner: String = chars[i + 1..j.min(chars.len())]
                .iter()
                .collect::<String>()
                .to_ascii_lowercase();
            if !inner.is_empty() && inner.chars().all(|ch| ch == 'h') {
                tokens.push(DateToken::ElapsedHours);
                in_time_context = true;
            } else if !inner.is_empty() && inner.chars().all(|ch| ch == 'm') {
                tokens.push(DateToken::ElapsedMinutes);
            } else if !inner.is_empty() && inner.chars().all(|ch| ch == 's') {
                tokens.push(DateToken::ElapsedSeconds);
                in_time_context = false;
            }
            // colors, conditions and locale annotations render nothing
            i = j + 1;
            continue;
        }

        if c_lower == 'a' {
            if i + 4 < chars.len() {
                let is_ampm = chars[i + 1].eq_ignore_ascii_case(&'m')
                    && chars[i + 2] == '/'
                    && chars[i + 3].eq_ignore_ascii_case(&'p')
                    && chars[i + 4].eq_ignore_ascii_case(&'m');
                if is_ampm {
                    tokens.push(DateToken::AmPm(c.is_ascii_uppercase()));
                    i += 5;
                    continue;
                }
            }
            if i + 2 < chars.len() {
                let is_ap = chars[i + 1] == '/' && chars[i + 2].eq_ignore_ascii_case(&'p');
                if is_ap {
                    tokens.push(DateToken::AP(c.is_ascii_uppercase()));
                    i += 3;
                    continue;
                }
            }
            tokens.push(DateToken::Literal(c.to_string()));
            i += 1;
            continue;
        }

        let mut count = 1;
        while i + count < chars.len() && chars[i + count].to_ascii_lowercase() == c_lower {
            count += 1;
        }

        match c_lower {
            'y' => {
                if count >= 3 {
                    tokens.push(DateToken::Year4);
                } else {
                    tokens.push(DateToken::Year2);
                }
                i += count;
            }
            'm' => {
                let is_minute = in_time_context || is_followed_by_seconds(&chars, i + count);
                if is_minute {
                    if count >= 2 {
                        tokens.push(DateToken::Minute2);
                    } else {
                        tokens.push(DateToken::Minute1);
                    }
                } else {
                    match count {
                        1 => tokens.push(DateToken::Month1),
                        2 => tokens.push(DateToken::Month2),
                        3 => tokens.push(DateToken::Month3),
                        4 => tokens.push(DateToken::Month4),
                        _ => tokens.push(DateToken::Month5),
                    }
                }
                i += count;
            }
            'd' => {
                match count {
                    1 => tokens.push(DateToken::Day1),
                    2 => tokens.push(DateToken::Day2),
                    3 => tokens.push(DateToken::Day3),
                    _ => tokens.push(DateToken::Day4),
                }
                i += count;
            }
            'h' => {
                in_time_context = true;
                if count >= 2 {
                    tokens.push(DateToken::Hour2);
                } else {
                    tokens.push(DateToken::Hour1);
                }
                i += count;
            }
            's' => {
                in_time_context = false;
                if count >= 2 {
                    tokens.push(DateToken::Second2);
                } else {
                    tokens.push(DateToken::Second1);
                }
                i += count;
            }
            '_' | '*' => {
                i += if i + 1 < chars.len() { 2 } else { 1 };
            }
            _ => {
                tokens.push(DateToken::Literal(c.to_string()));
                i += 1;
            }
        }
    }

    tokens
}

/// Check if 'm' at position is followed by 's' (making it minutes, not months)
fn is_followed_by_seconds(chars: &[char], start: usize) -> bool {
    let mut i = start;
    while let Some(&ch) = chars.get(i) {
        match ch.to_ascii_lowercase() {
            's' => return true,
            'h' | 'y' | 'd' | 'm' => return false,
            _ => i += 1,
        }
    }
    false
}

fn month_abbrev(month: u32) -> &'static str {
    month_full(month).get(..3).unwrap_or("???")
}

fn month_full(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "???",
    }
}

fn month_letter(month: u32) -> &'static str {
    month_full(month).get(..1).unwrap_or("?")
}

fn day_abbrev(day_of_week: u32) -> &'static str {
    day_full(day_of_week).get(..3).unwrap_or("???")
}

fn day_full(day_of_week: u32) -> &'static str {
    match day_of_week {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "???",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_time_from_excel_time_1900() {
        assert_eq!(time_from_excel_time(1.0, false).unwrap(), ymd_hms(1900, 1, 1, 0, 0, 0));
        assert_eq!(time_from_excel_time(59.0, false).unwrap(), ymd_hms(1900, 2, 28, 0, 0, 0));
        assert_eq!(time_from_excel_time(61.0, false).unwrap(), ymd_hms(1900, 3, 1, 0, 0, 0));
        assert_eq!(
            time_from_excel_time(45_000.5, false).unwrap(),
            ymd_hms(2023, 3, 15, 12, 0, 0)
        );
    }

    #[test]
    fn test_time_from_excel_time_1904() {
        assert_eq!(time_from_excel_time(0.0, true).unwrap(), ymd_hms(1904, 1, 1, 0, 0, 0));
        assert_eq!(time_from_excel_time(1.25, true).unwrap(), ymd_hms(1904, 1, 2, 6, 0, 0));
    }

    #[test]
    fn test_time_to_excel_time() {
        assert_eq!(time_to_excel_time(ymd_hms(2023, 3, 15, 12, 0, 0)), 45_000.5);
        assert_eq!(time_to_excel_time(ymd_hms(1900, 3, 1, 0, 0, 0)), 61.0);
    }

    #[test]
    fn test_format_time_dates() {
        assert_eq!(format_time(45_000.0, "yyyy-mm-dd", false).unwrap(), "2023-03-15");
        assert_eq!(format_time(45_000.0, "mm-dd-yy", false).unwrap(), "03-15-23");
        assert_eq!(format_time(45_000.0, "d-mmm-yy", false).unwrap(), "15-Mar-23");
        assert_eq!(format_time(45_000.0, "dddd, mmmm d", false).unwrap(), "Wednesday, March 15");
    }

    #[test]
    fn test_format_time_clock() {
        // 45000.75 = 18:00
        assert_eq!(format_time(45_000.75, "hh:mm:ss", false).unwrap(), "18:00:00");
        assert_eq!(format_time(45_000.75, "h:mm am/pm", false).unwrap(), "6:00 pm");
        assert_eq!(format_time(45_000.75, "hh:mm AM/PM", false).unwrap(), "06:00 PM");
        assert_eq!(format_time(45_000.25, "h:mm AM/PM", false).unwrap(), "6:00 AM");
    }

    #[test]
    fn test_format_time_elapsed_hours() {
        // 30 minutes: the zero hour and its colon disappear
        assert_eq!(format_time(30.0 / 1440.0, "[h]:mm:ss", false).unwrap(), "30:00");
        // 26 hours
        assert_eq!(format_time(26.0 / 24.0, "[h]:mm:ss", false).unwrap(), "26:00:00");
    }

    #[test]
    fn test_serial_out_of_calendar_range() {
        assert_eq!(time_from_excel_time(1e300, false), None);
        assert_eq!(time_from_excel_time(f64::NAN, false), None);
        assert_eq!(time_from_excel_time(-1e12, true), None);
        assert_eq!(format_time(1e300, "yyyy-mm-dd", false), None);
    }
}
