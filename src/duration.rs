//! Human-readable duration parsing for CLI flags.

use std::time::Duration;

/// Parse a duration such as `10s`, `2m`, `1h` or `500ms`.
///
/// A bare number is interpreted as seconds.
///
/// # Examples
/// ```
/// use ruuvitag_scanner::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
/// assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
/// ```
pub fn parse_duration(src: &str) -> Result<Duration, String> {
    let src = src.trim();
    let digits = src.len() - src.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let (number, suffix) = src.split_at(digits);

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration: '{src}'"))?;

    let seconds_per_unit = match suffix.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        "ms" => return Ok(Duration::from_millis(value)),
        other => return Err(format!("unknown duration suffix: '{other}'")),
    };

    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration out of range: '{src}'"))
}
