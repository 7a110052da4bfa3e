//! Duration parsing utilities.

use anyhow::Context;

/// Parse a duration string like "1h", "5m", "30s", "300" into a [`chrono::Duration`].
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "30s"
/// - Minutes suffix: "5m"
/// - Hours suffix: "1h"
pub fn parse_duration(s: &str) -> anyhow::Result<chrono::Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let (num_str, unit_secs) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s, 1)
    };

    let value: i64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration value: {s}"))?;
    if value < 0 {
        anyhow::bail!("Duration must not be negative: {s}");
    }

    value
        .checked_mul(unit_secs)
        .and_then(chrono::Duration::try_seconds)
        .with_context(|| format!("Duration out of range: {s}"))
}

/// Same as [`parse_duration`], converted to a [`std::time::Duration`].
pub fn parse_std_duration(s: &str) -> anyhow::Result<std::time::Duration> {
    parse_duration(s)?
        .to_std()
        .with_context(|| format!("Duration out of range: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(parse_duration("300").unwrap(), chrono::Duration::seconds(300));
        assert_eq!(parse_duration("30s").unwrap(), chrono::Duration::seconds(30));
        assert_eq!(parse_duration("5m").unwrap(), chrono::Duration::minutes(5));
        assert_eq!(parse_duration(" 1h ").unwrap(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("-5m").is_err());
    }

    #[test]
    fn test_out_of_range() {
        let err = parse_duration("9223372036854775807h").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_duration("9223372036854775807").is_err());
        assert!(parse_std_duration("9223372036854775807m").is_err());
        assert!(parse_duration("10000000000h").is_ok());
    }

    #[test]
    fn test_std_duration() {
        assert_eq!(
            parse_std_duration("2s").unwrap(),
            std::time::Duration::from_secs(2)
        );
    }
}
