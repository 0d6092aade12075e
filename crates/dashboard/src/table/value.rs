use crate::{format_timestamp, time_string, Time};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  Ascending,
  #[default]
  Descending,
}

impl Direction {
  pub fn reverse(self) -> Self {
    match self {
      Direction::Ascending => Direction::Descending,
      Direction::Descending => Direction::Ascending,
    }
  }

  /// Applies the direction to an ascending ordering.
  pub fn apply(self, ordering: Ordering) -> Ordering {
    match self {
      Direction::Ascending => ordering,
      Direction::Descending => ordering.reverse(),
    }
  }
}

/// A single table cell. Values that cannot be read from a row are `Missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub enum CellValue {
  #[default]
  Missing,
  Text(String),
  Number(f64),
  Time(Time),
  /// Milliseconds.
  Duration(i64),
}

impl CellValue {
  pub fn number(value: f64) -> Self {
    if value.is_nan() {
      CellValue::Missing
    } else {
      CellValue::Number(value)
    }
  }

  pub fn is_missing(&self) -> bool {
    matches!(self, CellValue::Missing)
  }

  /// Numeric projection used by range filters: times as epoch milliseconds,
  /// durations as milliseconds.
  pub fn as_number(&self) -> Option<f64> {
    match self {
      CellValue::Number(n) => Some(*n),
      CellValue::Time(time) => Some(time.timestamp_millis() as f64),
      CellValue::Duration(ms) => Some(*ms as f64),
      CellValue::Text(_) | CellValue::Missing => None,
    }
  }

  fn rank(&self) -> u8 {
    match self {
      CellValue::Number(_) => 0,
      CellValue::Duration(_) => 1,
      CellValue::Time(_) => 2,
      CellValue::Text(_) => 3,
      CellValue::Missing => 4,
    }
  }
}

impl fmt::Display for CellValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CellValue::Missing => Ok(()),
      CellValue::Text(text) => write!(f, "{}", text),
      CellValue::Number(n) => write!(f, "{}", n),
      CellValue::Time(time) => write!(f, "{}", format_timestamp(time)),
      CellValue::Duration(ms) => write!(f, "{}", time_string(*ms)),
    }
  }
}

impl From<&str> for CellValue {
  fn from(text: &str) -> Self {
    CellValue::Text(text.to_string())
  }
}

impl From<String> for CellValue {
  fn from(text: String) -> Self {
    CellValue::Text(text)
  }
}

impl From<f64> for CellValue {
  fn from(value: f64) -> Self {
    CellValue::number(value)
  }
}

impl From<Time> for CellValue {
  fn from(time: Time) -> Self {
    CellValue::Time(time)
  }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
  fn from(value: Option<T>) -> Self {
    value.map_or(CellValue::Missing, Into::into)
  }
}

/// Ascending order used when a column brings no comparator of its own.
/// Missing sorts after everything; values of different kinds order by kind.
pub fn generic_compare(a: &CellValue, b: &CellValue) -> Ordering {
  match (a, b) {
    (CellValue::Number(a), CellValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    (CellValue::Duration(a), CellValue::Duration(b)) => a.cmp(b),
    (CellValue::Time(a), CellValue::Time(b)) => a.cmp(b),
    (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
    (a, b) => a.rank().cmp(&b.rank()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_timestamp;

  #[test]
  fn test_nan_is_missing() {
    assert_eq!(CellValue::number(f64::NAN), CellValue::Missing);
    assert_eq!(CellValue::from(2.5), CellValue::Number(2.5));
    assert_eq!(CellValue::from(None::<String>), CellValue::Missing);
  }

  #[test]
  fn test_generic_compare() {
    assert_eq!(
      generic_compare(&CellValue::from(1.0), &CellValue::from(2.0)),
      Ordering::Less
    );
    assert_eq!(
      generic_compare(&CellValue::from("b"), &CellValue::from("a")),
      Ordering::Greater
    );
    assert_eq!(
      generic_compare(&CellValue::Missing, &CellValue::from("a")),
      Ordering::Greater
    );
    assert_eq!(
      generic_compare(&CellValue::from(9.0), &CellValue::from("a")),
      Ordering::Less
    );
    assert_eq!(
      generic_compare(&CellValue::Missing, &CellValue::Missing),
      Ordering::Equal
    );
  }

  #[test]
  fn test_display() {
    let time = parse_timestamp("2021-01-01T00:00:00Z").unwrap();
    assert_eq!(CellValue::Time(time).to_string(), "2021-01-01 00:00:00");
    assert_eq!(CellValue::Duration(90_000).to_string(), "1.5 min");
    assert_eq!(CellValue::Missing.to_string(), "");
    assert_eq!(CellValue::Number(3.0).to_string(), "3");
  }

  #[test]
  fn test_direction() {
    assert_eq!(Direction::default(), Direction::Descending);
    assert_eq!(Direction::Descending.apply(Ordering::Less), Ordering::Greater);
    assert_eq!(Direction::Ascending.reverse(), Direction::Descending);
  }
}
