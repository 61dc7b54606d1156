//! Date helper functions

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use super::locale::Locale;

/// Default display pattern for post dates
pub const DEFAULT_DATE_FORMAT: &str = "dd MMM yyyy";

/// Formats publication timestamps for display
#[derive(Debug, Clone)]
pub struct DateFormatter {
    pattern: String,
    locale: Locale,
    timezone: Tz,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT, Locale::PtBr, Tz::UTC)
    }
}

impl DateFormatter {
    pub fn new(pattern: &str, locale: Locale, timezone: Tz) -> Self {
        Self {
            pattern: pattern.to_string(),
            locale,
            timezone,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Format a timestamp with the configured pattern
    pub fn format(&self, timestamp: &DateTime<Utc>) -> String {
        format_date(
            &timestamp.with_timezone(&self.timezone),
            &self.pattern,
            self.locale,
        )
    }

    /// Format an optional timestamp, falling back to the locale's
    /// "unknown date" label
    pub fn display(&self, timestamp: Option<&DateTime<Utc>>) -> String {
        match timestamp {
            Some(ts) => self.format(ts),
            None => self.locale.unknown_date().to_string(),
        }
    }
}

/// Parse a CMS timestamp
///
/// Accepts RFC 3339, the Prismic form `2021-03-25T19:25:28+0000`, and
/// integer epoch milliseconds. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(millis) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a date using a date-fns style pattern
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", Locale::PtBr) // -> "15 mar 2021"
/// ```
pub fn format_date<Tz2: TimeZone>(date: &DateTime<Tz2>, pattern: &str, locale: Locale) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            // '' is a literal quote, otherwise copy until the closing quote
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    break;
                }
                out.push(chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        match c {
            'y' => match run {
                2 => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
                1 => out.push_str(&date.year().to_string()),
                n => out.push_str(&format!("{:0width$}", date.year(), width = n)),
            },
            'M' => {
                let month = date.month();
                match run {
                    1 => out.push_str(&month.to_string()),
                    2 => out.push_str(&format!("{:02}", month)),
                    3 => out.push_str(locale.month_abbr(month)),
                    _ => out.push_str(locale.month_name(month)),
                }
            }
            'd' => pad(&mut out, date.day(), run),
            'E' => {
                let weekday = date.weekday().num_days_from_sunday();
                if run >= 4 {
                    out.push_str(locale.weekday_name(weekday));
                } else {
                    out.push_str(locale.weekday_abbr(weekday));
                }
            }
            'H' => pad(&mut out, date.hour(), run),
            'm' => pad(&mut out, date.minute(), run),
            's' => pad(&mut out, date.second(), run),
            _ => {
                for _ in 0..run {
                    out.push(c);
                }
            }
        }

        i += run;
    }

    out
}

fn pad(out: &mut String, value: u32, run: usize) {
    if run >= 2 {
        out.push_str(&format!("{:02}", value));
    } else {
        out.push_str(&value.to_string());
    }
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz2: TimeZone>(date: &DateTime<Tz2>) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_in_pt_br() {
        let epoch = parse_timestamp("0").unwrap();
        let formatter = DateFormatter::default();
        assert_eq!(formatter.format(&epoch), "01 jan 1970");
        assert_eq!(formatter.format(&epoch), formatter.format(&epoch));
    }

    #[test]
    fn test_parse_prismic_timestamp() {
        let ts = parse_timestamp("2021-03-25T19:25:28+0000").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap());

        let ts = parse_timestamp("2021-03-25T19:25:28-03:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2021, 3, 25, 22, 25, 28).unwrap());

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_format_patterns() {
        let date = Utc.with_ymd_and_hms(2021, 2, 7, 9, 5, 3).unwrap();
        assert_eq!(format_date(&date, "dd MMM yyyy", Locale::PtBr), "07 fev 2021");
        assert_eq!(format_date(&date, "d 'de' MMMM", Locale::PtBr), "7 de fevereiro");
        assert_eq!(format_date(&date, "EEEE, MMM d", Locale::EnUs), "Sunday, Feb 7");
        assert_eq!(format_date(&date, "yy/MM/dd HH:mm:ss", Locale::EnUs), "21/02/07 09:05:03");
        assert_eq!(format_date(&date, "'it''s' yyyy", Locale::EnUs), "it's 2021");
    }

    #[test]
    fn test_timezone_shifts_day() {
        let ts = parse_timestamp("2021-03-01T01:00:00+0000").unwrap();
        let sao_paulo = DateFormatter::new(DEFAULT_DATE_FORMAT, Locale::PtBr, chrono_tz::America::Sao_Paulo);
        assert_eq!(sao_paulo.format(&ts), "28 fev 2021");
    }

    #[test]
    fn test_unknown_date() {
        let formatter = DateFormatter::default();
        assert_eq!(formatter.display(None), "data desconhecida");
    }

    #[test]
    fn test_date_xml() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(date_xml(&date), "2024-01-15T10:30:00.000+00:00");
    }
}
