//! Field deserializers for engine output that does not always match its
//! documented shape. A bad field degrades to its default instead of failing
//! the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `T::default()` for null or a value of the wrong shape.
pub(crate) fn default_on_error<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned + Default,
{
  let value = Value::deserialize(deserializer)?;
  Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Strings as is, numbers and booleans in their JSON spelling, anything
/// else `None`.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let text = match Value::deserialize(deserializer)? {
    Value::String(text) => Some(text),
    Value::Number(number) => Some(number.to_string()),
    Value::Bool(flag) => Some(flag.to_string()),
    _ => None,
  };
  Ok(text)
}

/// Whole numbers, including numeric strings such as `"3"`.
pub(crate) fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let integer = match Value::deserialize(deserializer)? {
    Value::Number(number) => number.as_i64(),
    Value::String(text) => text.trim().parse::<i64>().ok(),
    _ => None,
  };
  Ok(integer)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Deserialize, Default, PartialEq)]
  struct Record {
    #[serde(default, deserialize_with = "optional_text")]
    text: Option<String>,
    #[serde(default, deserialize_with = "optional_integer")]
    index: Option<i64>,
    #[serde(default, deserialize_with = "default_on_error")]
    items: Vec<String>,
  }

  fn parse(json: &str) -> Record {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn test_missing_and_null() {
    assert_eq!(parse("{}"), Record::default());
    assert_eq!(
      parse(r#"{ "text": null, "index": null, "items": null }"#),
      Record::default()
    );
  }

  #[test]
  fn test_wrong_types() {
    let record = parse(r#"{ "text": 12, "index": "3", "items": { "a": 1 } }"#);
    assert_eq!(record.text.as_deref(), Some("12"));
    assert_eq!(record.index, Some(3));
    assert!(record.items.is_empty());

    let record = parse(r#"{ "text": [1], "index": 1.5, "items": ["a", "b"] }"#);
    assert_eq!(record.text, None);
    assert_eq!(record.index, None);
    assert_eq!(record.items, vec!["a", "b"]);
  }
}
