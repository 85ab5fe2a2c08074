//! Time utilities

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// 현재 UTC 타임스탬프 (밀리초)
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// 밀리초 → ISO 8601 (`2022-02-11T00:00:00.000Z`)
pub fn iso8601(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// ISO 8601 → 밀리초
///
/// Strings without an offset (`2015-07-08T02:43:34.823`) are read as UTC.
pub fn parse8601(datetime: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// 밀리초 → `YYMMDD` (futures symbol suffix)
pub fn yymmdd(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.format("%y%m%d").to_string())
}

/// `11FEB2022` style contract date → midnight UTC in milliseconds
pub fn parse_ddmmmyyyy(date: &str) -> Option<i64> {
    if date.len() != 9 || !date.is_ascii() {
        return None;
    }
    let day: u32 = date[0..2].parse().ok()?;
    let month = match &date[2..5] {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    let year: i32 = date[5..9].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601() {
        assert_eq!(iso8601(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(
            iso8601(1644537600000).as_deref(),
            Some("2022-02-11T00:00:00.000Z")
        );
    }

    #[test]
    fn test_parse8601() {
        assert_eq!(parse8601("2022-02-11T00:00:00Z"), Some(1644537600000));
        assert_eq!(parse8601("2015-07-08T02:43:34.823"), Some(1436323414823));
        assert_eq!(parse8601("not a date"), None);
    }

    #[test]
    fn test_yymmdd() {
        assert_eq!(yymmdd(1644537600000).as_deref(), Some("220211"));
    }

    #[test]
    fn test_parse_ddmmmyyyy() {
        assert_eq!(parse_ddmmmyyyy("11FEB2022"), Some(1644537600000));
        assert_eq!(parse_ddmmmyyyy("11XXX2022"), None);
        assert_eq!(parse_ddmmmyyyy("31FEB2022"), None);
        assert_eq!(parse_ddmmmyyyy("short"), None);
    }
}
