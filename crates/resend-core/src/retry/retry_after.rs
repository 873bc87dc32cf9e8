//! `Retry-After` header parsing (delay-seconds or HTTP-date).

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;

/// Parse a `Retry-After` value into a delay relative to `now`.
///
/// Returns `None` for malformed values and for dates that are already in
/// the past.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse::<u64>().ok().map(Duration::from_secs);
    }

    let date = parse_http_date(value)?;
    let delta = date.signed_duration_since(now);
    if delta < chrono::Duration::zero() {
        return None;
    }
    delta.to_std().ok()
}

/// HTTP-date forms from RFC 9110: IMF-fixdate, obsolete RFC 850 and asctime.
/// An IMF-fixdate without a zone is taken as UTC.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%a, %d %b %Y %H:%M:%S GMT",
        "%A, %d-%b-%y %H:%M:%S GMT",
        "%a %b %e %H:%M:%S %Y",
        "%a, %d %b %Y %H:%M:%S",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap()
    }

    #[test]
    fn delay_seconds() {
        assert_eq!(parse_retry_after("120", now()), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after(" 5 ", now()), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after("0", now()), Some(Duration::ZERO));
    }

    #[test]
    fn imf_fixdate_in_future() {
        let d = parse_retry_after("Wed, 21 Oct 2015 07:28:30 GMT", now());
        assert_eq!(d, Some(Duration::from_secs(30)));
    }

    #[test]
    fn date_without_zone_is_utc() {
        let d = parse_retry_after("Wed, 21 Oct 2015 07:29:00", now());
        assert_eq!(d, Some(Duration::from_secs(60)));
    }

    #[test]
    fn rfc850_and_asctime() {
        assert_eq!(
            parse_retry_after("Wednesday, 21-Oct-15 07:28:10 GMT", now()),
            Some(Duration::from_secs(10))
        );
        assert_eq!(
            parse_retry_after("Wed Oct 21 07:28:05 2015", now()),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn past_date_is_no_hint() {
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:27:00 GMT", now()), None);
    }

    #[test]
    fn malformed_is_no_hint() {
        assert_eq!(parse_retry_after("invalid", now()), None);
        assert_eq!(parse_retry_after("-5", now()), None);
        assert_eq!(parse_retry_after("1.5", now()), None);
        assert_eq!(parse_retry_after("", now()), None);
    }
}
