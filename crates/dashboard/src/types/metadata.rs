use super::lenient::{default_on_error, optional_integer, optional_text};
use super::time::{parse_optional, Time};
use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A runtime attribute as reported by the engine. Cromwell mostly sends
/// strings (`"4"`, `"7.5 GB"`) but numbers show up too.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
  Number(f64),
  Text(String),
  Boolean(bool),
  Other(Value),
}

impl AttributeValue {
  pub fn is_blank(&self) -> bool {
    match self {
      AttributeValue::Text(text) => text.trim().is_empty(),
      AttributeValue::Other(value) => value.is_null(),
      _ => false,
    }
  }

  /// Numeric reading of the attribute; text is trimmed and parsed.
  pub fn as_number(&self) -> Option<f64> {
    let number = match self {
      AttributeValue::Number(n) => Some(*n),
      AttributeValue::Text(text) => text.trim().parse::<f64>().ok(),
      _ => None,
    };

    number.filter(|n| n.is_finite())
  }

  /// Memory size in GB: text has its first `" GB"` removed before parsing.
  pub fn as_gigabytes(&self) -> Option<f64> {
    match self {
      AttributeValue::Text(text) => AttributeValue::Text(text.replacen(" GB", "", 1)).as_number(),
      other => other.as_number(),
    }
  }
}

impl fmt::Display for AttributeValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AttributeValue::Number(n) => write!(f, "{}", n),
      AttributeValue::Text(s) => write!(f, "{}", s),
      AttributeValue::Boolean(b) => write!(f, "{}", b),
      AttributeValue::Other(v) => write!(f, "{}", v),
    }
  }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct RuntimeAttributes {
  pub cpu: Option<AttributeValue>,
  #[serde(rename = "cpuMin")]
  pub cpu_min: Option<AttributeValue>,
  pub memory: Option<AttributeValue>,
  #[serde(rename = "memoryMin")]
  pub memory_min: Option<AttributeValue>,
  #[serde(flatten)]
  pub other: BTreeMap<String, Value>,
}

fn first_present<'a>(
  preferred: Option<&'a AttributeValue>,
  fallback: Option<&'a AttributeValue>,
) -> Option<&'a AttributeValue> {
  preferred
    .filter(|value| !value.is_blank())
    .or(fallback.filter(|value| !value.is_blank()))
}

impl RuntimeAttributes {
  /// `cpu`, falling back to `cpuMin`.
  pub fn cpu_count(&self) -> Option<f64> {
    first_present(self.cpu.as_ref(), self.cpu_min.as_ref()).and_then(AttributeValue::as_number)
  }

  /// `memory`, falling back to `memoryMin`, in GB.
  pub fn memory_gb(&self) -> Option<f64> {
    first_present(self.memory.as_ref(), self.memory_min.as_ref())
      .and_then(AttributeValue::as_gigabytes)
  }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JesInfo {
  #[serde(default, deserialize_with = "optional_text")]
  pub zone: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub machine_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEvent {
  #[serde(default, deserialize_with = "optional_text")]
  pub description: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub start_time: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub end_time: Option<String>,
}

impl ExecutionEvent {
  pub fn start(&self) -> Option<Time> {
    parse_optional(self.start_time.as_deref())
  }

  pub fn end(&self) -> Option<Time> {
    parse_optional(self.end_time.as_deref())
  }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Failure {
  #[serde(default, deserialize_with = "optional_text")]
  pub message: Option<String>,
}

/// One execution instance of a call.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallShard {
  #[serde(default, deserialize_with = "optional_text")]
  pub start: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub end: Option<String>,
  #[serde(default, deserialize_with = "optional_integer")]
  pub shard_index: Option<i64>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub runtime_attributes: Option<RuntimeAttributes>,
  #[serde(default, deserialize_with = "optional_text")]
  pub backend: Option<String>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub jes: Option<JesInfo>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub execution_events: Vec<ExecutionEvent>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub failures: Vec<Failure>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub outputs: Option<BTreeMap<String, Value>>,
}

impl CallShard {
  pub fn start_time(&self) -> Option<Time> {
    parse_optional(self.start.as_deref())
  }

  pub fn end_time(&self) -> Option<Time> {
    parse_optional(self.end.as_deref())
  }
}

/// A call is either a single record or, when scattered, a list of shards.
#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CallEntry {
  Shards(Vec<CallShard>),
  Single(CallShard),
}

impl CallEntry {
  pub fn shards(&self) -> &[CallShard] {
    match self {
      CallEntry::Shards(shards) => shards,
      CallEntry::Single(shard) => std::slice::from_ref(shard),
    }
  }
}

/// Calls keyed by name, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calls(Vec<(String, CallEntry)>);

impl Calls {
  pub fn new() -> Self {
    Calls(Vec::new())
  }

  pub fn insert(&mut self, name: impl Into<String>, entry: CallEntry) {
    let name = name.into();
    match self.0.iter_mut().find(|(existing, _)| *existing == name) {
      Some((_, existing)) => *existing = entry,
      None => self.0.push((name, entry)),
    }
  }

  pub fn get(&self, name: &str) -> Option<&CallEntry> {
    self
      .0
      .iter()
      .find(|(existing, _)| existing == name)
      .map(|(_, entry)| entry)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &CallEntry)> {
    self.0.iter().map(|(name, entry)| (name.as_str(), entry))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<N: Into<String>> FromIterator<(N, CallEntry)> for Calls {
  fn from_iter<T: IntoIterator<Item = (N, CallEntry)>>(iter: T) -> Self {
    let mut calls = Calls::new();
    for (name, entry) in iter {
      calls.insert(name, entry);
    }
    calls
  }
}

impl Serialize for Calls {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for (name, entry) in &self.0 {
      map.serialize_entry(name, entry)?;
    }
    map.end()
  }
}

struct CallsVisitor;

impl<'de> Visitor<'de> for CallsVisitor {
  type Value = Calls;

  fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    formatter.write_str("a map of call names to call records")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Calls, A::Error> {
    let mut calls = Calls::new();
    while let Some((name, value)) = access.next_entry::<String, Value>()? {
      match serde_json::from_value::<CallEntry>(value) {
        Ok(entry) => calls.insert(name, entry),
        Err(err) => log::warn!("Skipping unreadable call {}: {}", name, err),
      }
    }
    Ok(calls)
  }
}

impl<'de> Deserialize<'de> for Calls {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    deserializer.deserialize_map(CallsVisitor)
  }
}

/// Metadata document of a single workflow, as served by
/// `/api/workflows/{version}/{id}/metadata`.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMetadata {
  #[serde(default, deserialize_with = "optional_text")]
  pub id: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub workflow_name: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub status: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub submission: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub start: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub end: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub workflow_root: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub actual_workflow_language: Option<String>,
  #[serde(default, deserialize_with = "optional_text")]
  pub actual_workflow_language_version: Option<String>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub labels: BTreeMap<String, String>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub inputs: BTreeMap<String, Value>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub outputs: BTreeMap<String, Value>,
  #[serde(default, deserialize_with = "default_on_error")]
  pub calls: Calls,
}

impl WorkflowMetadata {
  pub fn from_json(json: &str) -> Result<Self> {
    serde_json::from_str(json)
      .map_err(|e| Error::invalid_metadata(format!("Failed to parse metadata: {}", e)))
  }

  pub fn start_time(&self) -> Option<Time> {
    parse_optional(self.start.as_deref())
  }

  pub fn end_time(&self) -> Option<Time> {
    parse_optional(self.end.as_deref())
  }

  pub fn submission_time(&self) -> Option<Time> {
    parse_optional(self.submission.as_deref())
  }

  pub fn is_running(&self) -> bool {
    self.status.as_deref() == Some("Running")
  }

  pub fn is_failed(&self) -> bool {
    self.status.as_deref() == Some("Failed")
  }
}

impl TryFrom<&str> for WorkflowMetadata {
  type Error = Error;

  fn try_from(value: &str) -> Result<Self> {
    Self::from_json(value)
  }
}

impl TryFrom<String> for WorkflowMetadata {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> {
    Self::from_json(value.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_metadata() {
    let json = r#"{
      "id": "b3e45584-9450-4e73-9523-fc3ccf749848",
      "workflowName": "hello",
      "status": "Succeeded",
      "actualWorkflowLanguage": "WDL",
      "actualWorkflowLanguageVersion": "1.0",
      "labels": { "cromwell-workflow-id": "cromwell-b3e45584" },
      "inputs": { "hello.name": "world", "hello.missing": null },
      "calls": {
        "hello.b": [
          { "shardIndex": 0, "backend": "PAPIv2", "executionEvents": [] },
          { "shardIndex": 1, "backend": "PAPIv2", "executionEvents": [] }
        ],
        "hello.a": {
          "shardIndex": -1,
          "runtimeAttributes": { "cpu": "2", "memory": "7.5 GB", "docker": "ubuntu" },
          "jes": { "zone": "us-central1-b", "machineType": "n1-standard-2" }
        }
      }
    }"#;

    let metadata = WorkflowMetadata::from_json(json).unwrap();

    assert_eq!(metadata.workflow_name.as_deref(), Some("hello"));
    assert_eq!(metadata.inputs.get("hello.missing"), Some(&Value::Null));

    let names: Vec<&str> = metadata.calls.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["hello.b", "hello.a"]);

    assert_eq!(metadata.calls.get("hello.b").unwrap().shards().len(), 2);

    let a = &metadata.calls.get("hello.a").unwrap().shards()[0];
    assert_eq!(a.shard_index, Some(-1));
    let attributes = a.runtime_attributes.as_ref().unwrap();
    assert_eq!(attributes.cpu_count(), Some(2.0));
    assert_eq!(attributes.memory_gb(), Some(7.5));
    assert_eq!(
      attributes.other.get("docker"),
      Some(&Value::String("ubuntu".to_string()))
    );
    assert_eq!(
      a.jes.as_ref().unwrap().machine_type.as_deref(),
      Some("n1-standard-2")
    );
  }

  #[test]
  fn test_parse_invalid_json() {
    let err = WorkflowMetadata::from_json("{ not json").unwrap_err();
    assert!(matches!(err, Error::InvalidMetadata(_)));
  }

  #[test]
  fn test_malformed_fields_still_parse() {
    let json = r#"{
      "calls": {
        "w.t": {
          "start": "not a date",
          "runtimeAttributes": { "cpu": { "weird": true }, "memory": 4 }
        }
      }
    }"#;

    let metadata = WorkflowMetadata::try_from(json).unwrap();
    let shard = &metadata.calls.get("w.t").unwrap().shards()[0];
    assert!(shard.start_time().is_none());

    let attributes = shard.runtime_attributes.as_ref().unwrap();
    assert_eq!(attributes.cpu_count(), None);
    assert_eq!(attributes.memory_gb(), Some(4.0));
  }

  #[test]
  fn test_null_and_mistyped_shard_fields() {
    let json = r#"{
      "calls": {
        "w.t": [
          {
            "shardIndex": "0",
            "start": 1700000000000,
            "backend": null,
            "executionEvents": null,
            "failures": null,
            "jes": "n/a"
          },
          {
            "shardIndex": 1,
            "executionEvents": [
              { "description": "Pulling", "startTime": 5, "endTime": null }
            ],
            "failures": [{ "message": 42 }]
          }
        ]
      }
    }"#;

    let metadata = WorkflowMetadata::from_json(json).unwrap();
    let shards = metadata.calls.get("w.t").unwrap().shards();
    assert_eq!(shards.len(), 2);

    let first = &shards[0];
    assert_eq!(first.shard_index, Some(0));
    assert_eq!(first.start.as_deref(), Some("1700000000000"));
    assert_eq!(first.backend, None);
    assert!(first.execution_events.is_empty());
    assert!(first.failures.is_empty());
    assert_eq!(first.jes, None);

    let second = &shards[1];
    assert_eq!(second.execution_events[0].start_time.as_deref(), Some("5"));
    assert_eq!(second.execution_events[0].end_time, None);
    assert_eq!(second.failures[0].message.as_deref(), Some("42"));
  }

  #[test]
  fn test_unreadable_call_is_skipped() {
    let json = r#"{
      "status": "Running",
      "labels": null,
      "calls": {
        "w.broken": "not a call",
        "w.fine": { "shardIndex": -1 },
        "w.count": 3
      }
    }"#;

    let metadata = WorkflowMetadata::from_json(json).unwrap();
    assert!(metadata.is_running());
    assert!(metadata.labels.is_empty());

    let names: Vec<&str> = metadata.calls.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["w.fine"]);
  }

  #[test]
  fn test_calls_of_wrong_shape() {
    let metadata = WorkflowMetadata::from_json(r#"{ "id": 7, "calls": [] }"#).unwrap();
    assert_eq!(metadata.id.as_deref(), Some("7"));
    assert!(metadata.calls.is_empty());
  }

  #[test]
  fn test_attribute_fallbacks() {
    let attributes = RuntimeAttributes {
      cpu: Some(AttributeValue::Text("".to_string())),
      cpu_min: Some(AttributeValue::Number(1.0)),
      memory: None,
      memory_min: Some(AttributeValue::Text("3.75 GB".to_string())),
      other: BTreeMap::new(),
    };

    assert_eq!(attributes.cpu_count(), Some(1.0));
    assert_eq!(attributes.memory_gb(), Some(3.75));
  }

  #[test]
  fn test_attribute_not_a_number() {
    assert_eq!(AttributeValue::Text("many".to_string()).as_number(), None);
    assert_eq!(AttributeValue::Text("NaN".to_string()).as_number(), None);
    assert_eq!(AttributeValue::Boolean(true).as_number(), None);
    assert_eq!(AttributeValue::Text("2 GB".to_string()).as_number(), None);
    assert_eq!(
      AttributeValue::Text("2 GB".to_string()).as_gigabytes(),
      Some(2.0)
    );
  }

  #[test]
  fn test_calls_round_trip_keeps_order() {
    let calls: Calls = vec![
      ("z", CallEntry::Single(CallShard::default())),
      ("a", CallEntry::Shards(vec![])),
    ]
    .into_iter()
    .collect();

    let json = serde_json::to_string(&calls).unwrap();
    assert!(json.find("\"z\"").unwrap() < json.find("\"a\"").unwrap());
  }
}
