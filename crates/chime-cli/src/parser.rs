use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;

/// Parses a point in time given as epoch seconds, RFC 3339, or an English phrase
/// interpreted in `timezone`.
pub fn parse_when(input: &str, timezone: &Tz) -> Result<i64> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp());
    }
    parse_date_string(input, Utc::now().with_timezone(timezone), Dialect::Us)
        .map(|dt| dt.timestamp())
        .map_err(|e| anyhow::anyhow!("Failed to parse time '{}': {}", input, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epoch_and_rfc3339() {
        assert_eq!(parse_when("1750000000", &Tz::UTC).unwrap(), 1_750_000_000);
        assert_eq!(parse_when("1970-01-01T01:00:00+01:00", &Tz::UTC).unwrap(), 0);
    }

    #[test]
    fn test_parse_english() {
        assert!(parse_when("tomorrow", &Tz::UTC).unwrap() > Utc::now().timestamp());
        assert!(parse_when("the day after never", &Tz::UTC).is_err());
    }
}
