use chrono::{DateTime, Utc};

pub type Time = DateTime<Utc>;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Parses an RFC 3339 timestamp as reported by Cromwell. Anything else is `None`.
pub fn parse_timestamp(value: &str) -> Option<Time> {
  DateTime::parse_from_rfc3339(value.trim())
    .ok()
    .map(|time| time.with_timezone(&Utc))
}

pub fn parse_optional(value: Option<&str>) -> Option<Time> {
  value.and_then(parse_timestamp)
}

pub fn format_timestamp(time: &Time) -> String {
  time.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn elapsed_millis(start: &Time, end: &Time) -> i64 {
  (*end - *start).num_milliseconds()
}

pub fn elapsed_hours(start: &Time, end: &Time) -> f64 {
  elapsed_millis(start, end) as f64 / MILLIS_PER_HOUR
}

/// Human readable duration with one decimal: seconds below a minute,
/// minutes below an hour, hours otherwise.
pub fn time_string(milliseconds: i64) -> String {
  let seconds = milliseconds as f64 / 1000.0;
  let minutes = seconds / 60.0;
  if minutes < 1.0 {
    return format!("{:.1} sec", seconds);
  }

  let hours = minutes / 60.0;
  if hours < 1.0 {
    return format!("{:.1} min", minutes);
  }

  format!("{:.1} hr", hours)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_timestamp() {
    let time = parse_timestamp("2021-01-01T01:00:00.000Z").unwrap();
    assert_eq!(time.timestamp(), 1_609_462_800);

    let offset = parse_timestamp("2021-01-01T02:00:00+01:00").unwrap();
    assert_eq!(offset, time);
  }

  #[test]
  fn test_parse_invalid_timestamp() {
    assert!(parse_timestamp("").is_none());
    assert!(parse_timestamp("yesterday").is_none());
    assert!(parse_optional(None).is_none());
  }

  #[test]
  fn test_format_timestamp() {
    let time = parse_timestamp("2021-03-04T05:06:07Z").unwrap();
    assert_eq!(format_timestamp(&time), "2021-03-04 05:06:07");
  }

  #[test]
  fn test_elapsed() {
    let start = parse_timestamp("2021-01-01T00:00:00Z").unwrap();
    let end = parse_timestamp("2021-01-01T01:30:00Z").unwrap();
    assert_eq!(elapsed_millis(&start, &end), 5_400_000);
    assert_eq!(elapsed_hours(&start, &end), 1.5);
  }

  #[test]
  fn test_time_string() {
    assert_eq!(time_string(0), "0.0 sec");
    assert_eq!(time_string(12_340), "12.3 sec");
    assert_eq!(time_string(90_000), "1.5 min");
    assert_eq!(time_string(5_400_000), "1.5 hr");
    assert_eq!(time_string(-5_000), "-5.0 sec");
  }
}
