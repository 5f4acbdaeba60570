//! Duration parsing for the typed resolver's `get_duration` getter (`spec.md` §4.9).
//!
//! Accepts `humantime`'s short-form grammar (`"5s"`, `"2h 30m"`, `"1d"`) and a small ISO-8601
//! subset (`"PT5S"`, `"PT1H30M"`) as a fallback, since both appear in configuration files drawn
//! from different ecosystems.

use crate::{ConfigError, Result};
use std::time::Duration;

/// Parse `s` as a duration, trying `humantime`'s short form first and an ISO-8601 `PT...`
/// duration second.
pub fn parse(s: &str) -> Result<Duration> {
    let trimmed = s.trim();
    if let Ok(d) = humantime::parse_duration(trimmed) {
        return Ok(d);
    }
    parse_iso8601(trimmed).ok_or_else(|| ConfigError::InvalidDuration(trimmed.to_string()))
}

/// Parse a minimal ISO-8601 duration of the form `PT<n>H<n>M<n(.n)>S`, all components optional
/// but at least one required, matching the subset actually seen in configuration files (no
/// year/month/week/day designators before `T`).
fn parse_iso8601(s: &str) -> Option<Duration> {
    let rest = s.strip_prefix("PT").or_else(|| s.strip_prefix("pt"))?;
    if rest.is_empty() {
        return None;
    }

    let mut seconds: f64 = 0.0;
    let mut saw_component = false;
    let mut number = String::new();

    for c in rest.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' | 'h' => {
                seconds += number.parse::<f64>().ok()? * 3600.0;
                number.clear();
                saw_component = true;
            }
            'M' | 'm' => {
                seconds += number.parse::<f64>().ok()? * 60.0;
                number.clear();
                saw_component = true;
            }
            'S' | 's' => {
                seconds += number.parse::<f64>().ok()?;
                number.clear();
                saw_component = true;
            }
            _ => return None,
        }
    }

    if !saw_component || !number.is_empty() {
        return None;
    }

    Some(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_form_seconds() {
        assert_eq!(parse("5s").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn parses_short_form_compound() {
        assert_eq!(parse("2h 30m").unwrap(), Duration::from_secs(2 * 3600 + 30 * 60));
    }

    #[test]
    fn parses_iso8601_hours_minutes() {
        assert_eq!(parse("PT1H30M").unwrap(), Duration::from_secs(3600 + 1800));
    }

    #[test]
    fn parses_iso8601_seconds_only() {
        assert_eq!(parse("PT5S").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("not-a-duration").is_err());
    }
}
