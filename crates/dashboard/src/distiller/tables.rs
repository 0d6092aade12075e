use crate::WorkflowMetadata;
use serde_json::Value;
use std::collections::BTreeMap;

/// Failure messages per call, only for calls that reported at least one.
pub fn failures(metadata: &WorkflowMetadata) -> BTreeMap<String, Vec<String>> {
  let mut failures: BTreeMap<String, Vec<String>> = BTreeMap::new();

  for (call_name, entry) in metadata.calls.iter() {
    let messages = entry
      .shards()
      .iter()
      .flat_map(|shard| shard.failures.iter())
      .filter_map(|failure| failure.message.clone())
      .filter(|message| !message.is_empty());

    for message in messages {
      failures
        .entry(call_name.to_string())
        .or_default()
        .push(message);
    }
  }

  failures
}

/// Every shard's outputs, keyed `call.output`, in shard order.
pub fn call_outputs(metadata: &WorkflowMetadata) -> BTreeMap<String, Vec<Value>> {
  let mut outputs: BTreeMap<String, Vec<Value>> = BTreeMap::new();

  for (call_name, entry) in metadata.calls.iter() {
    for shard in entry.shards() {
      let Some(shard_outputs) = &shard.outputs else {
        continue;
      };

      for (key, value) in shard_outputs {
        outputs
          .entry(format!("{}.{}", call_name, key))
          .or_default()
          .push(value.clone());
      }
    }
  }

  outputs
}

/// A key with one display line per value.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntry {
  pub key: String,
  pub values: Vec<String>,
}

fn display_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn is_empty_value(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.is_empty(),
    Value::Array(items) => items.is_empty(),
    _ => false,
  }
}

/// Key / value table rows: keys sorted, empty values skipped, arrays spread
/// over several lines.
pub fn display_entries(map: &BTreeMap<String, Value>) -> Vec<DisplayEntry> {
  map
    .iter()
    .filter(|(_, value)| !is_empty_value(value))
    .map(|(key, value)| DisplayEntry {
      key: key.clone(),
      values: match value {
        Value::Array(items) => items.iter().map(display_value).collect(),
        other => vec![display_value(other)],
      },
    })
    .collect()
}
