use crate::{elapsed_hours, elapsed_millis, format_timestamp, time_string, CallShard, WorkflowMetadata};
use serde::Serialize;
use std::collections::BTreeSet;

const UNKNOWN: &str = "unknown";
const NOT_AVAILABLE: &str = "N/A";

/// Accumulated resource usage (CPU hours or memory GB hours) together with
/// the reasons some shards could not be counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceHours {
  pub total: f64,
  pub errors: Vec<String>,
}

impl ResourceHours {
  fn accrue(mut self, usage: &Result<f64, String>) -> Self {
    match usage {
      Ok(hours) => self.total += hours,
      Err(reason) => {
        if !self.errors.contains(reason) {
          self.errors.push(reason.clone());
        }
      }
    }
    self
  }

  pub fn is_complete(&self) -> bool {
    self.errors.is_empty()
  }

  /// The total, or every collected error joined with `", "`.
  pub fn outcome(&self) -> Result<f64, String> {
    if self.errors.is_empty() {
      Ok(self.total)
    } else {
      Err(self.error())
    }
  }

  pub fn error(&self) -> String {
    self.errors.join(", ")
  }

  pub fn display(&self) -> String {
    match self.outcome() {
      Ok(total) => format!("{:.2}", total),
      Err(error) => error,
    }
  }
}

/// Display-ready facts about one workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistilledSummary {
  pub workflow_language: String,
  pub submission: String,
  pub duration: String,
  pub workflow_root: String,
  pub backends: BTreeSet<String>,
  pub zones: BTreeSet<String>,
  pub machine_types: BTreeSet<String>,
  pub cpu_hours: ResourceHours,
  pub memory_hours: ResourceHours,
}

impl DistilledSummary {
  pub fn total_cpu_hours(&self) -> f64 {
    self.cpu_hours.total
  }

  pub fn total_memory_hours(&self) -> f64 {
    self.memory_hours.total
  }

  pub fn cpu_error(&self) -> String {
    self.cpu_hours.error()
  }

  pub fn memory_error(&self) -> String {
    self.memory_hours.error()
  }

  /// Label / value pairs in display order.
  pub fn rows(&self) -> Vec<(&'static str, String)> {
    vec![
      ("Workflow Language", self.workflow_language.clone()),
      ("Submission", self.submission.clone()),
      ("Duration", self.duration.clone()),
      ("Workflow Root", self.workflow_root.clone()),
      ("Backends", join(&self.backends)),
      ("Machine zones", join(&self.zones)),
      ("Machine types used", join(&self.machine_types)),
      ("Total CPU hours", self.cpu_hours.display()),
      ("Total memory GB * hours", self.memory_hours.display()),
    ]
  }
}

fn join(values: &BTreeSet<String>) -> String {
  values.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// What a single shard contributes to the summary.
#[derive(Debug, Clone, PartialEq)]
struct ShardUsage {
  backend: String,
  zone: String,
  machine_type: String,
  cpu: Result<f64, String>,
  memory: Result<f64, String>,
}

fn shard_usage(call_name: &str, shard: &CallShard) -> ShardUsage {
  let backend = shard.backend.clone().unwrap_or_else(|| UNKNOWN.to_string());
  let (zone, machine_type) = match &shard.jes {
    Some(jes) => (
      jes.zone.clone().unwrap_or_else(|| UNKNOWN.to_string()),
      jes.machine_type.clone().unwrap_or_else(|| UNKNOWN.to_string()),
    ),
    None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
  };

  let (cpu, memory) = match (shard.start_time(), shard.end_time()) {
    (Some(start), Some(end)) => match &shard.runtime_attributes {
      Some(attributes) => {
        let hours = elapsed_hours(&start, &end);
        let cpu = attributes
          .cpu_count()
          .map(|count| count * hours)
          .ok_or_else(|| format!("Failed to get number of CPU for {}", call_name));
        let memory = attributes
          .memory_gb()
          .map(|size| size * hours)
          .ok_or_else(|| format!("Failed to get memory in GB for {}", call_name));
        (cpu, memory)
      }
      None => {
        let error = format!("Missing runtime attributes for {}", call_name);
        (Err(error.clone()), Err(error))
      }
    },
    _ => {
      let error = format!("Missing start/end time for {}", call_name);
      (Err(error.clone()), Err(error))
    }
  };

  ShardUsage {
    backend,
    zone,
    machine_type,
    cpu,
    memory,
  }
}

fn language_label(metadata: &WorkflowMetadata) -> String {
  let language = metadata
    .actual_workflow_language
    .clone()
    .unwrap_or_else(|| UNKNOWN.to_string());

  match metadata.actual_workflow_language_version.as_deref() {
    Some(version) if !version.is_empty() => format!("{} ({})", language, version),
    _ => language,
  }
}

fn duration_label(metadata: &WorkflowMetadata) -> String {
  let start = metadata.start_time();
  let end = metadata.end_time();

  let start_label = start.as_ref().map_or("?".to_string(), format_timestamp);
  let end_label = end.as_ref().map_or("?".to_string(), format_timestamp);

  match (start, end) {
    (Some(start), Some(end)) => format!(
      "{} - {} ({})",
      start_label,
      end_label,
      time_string(elapsed_millis(&start, &end))
    ),
    _ => format!("{} - {}", start_label, end_label),
  }
}

pub fn summarize(metadata: &WorkflowMetadata) -> DistilledSummary {
  let usages = metadata.calls.iter().flat_map(|(call_name, entry)| {
    entry
      .shards()
      .iter()
      .map(move |shard| shard_usage(call_name, shard))
  });

  let initial = DistilledSummary {
    workflow_language: language_label(metadata),
    submission: metadata
      .submission_time()
      .as_ref()
      .map_or("?".to_string(), format_timestamp),
    duration: duration_label(metadata),
    workflow_root: metadata.workflow_root.clone().unwrap_or_default(),
    ..Default::default()
  };

  let summary = usages.fold(initial, |mut summary, usage| {
    summary.backends.insert(usage.backend);
    summary.zones.insert(usage.zone);
    summary.machine_types.insert(usage.machine_type);
    summary.cpu_hours = summary.cpu_hours.accrue(&usage.cpu);
    summary.memory_hours = summary.memory_hours.accrue(&usage.memory);
    summary
  });

  if !summary.cpu_hours.is_complete() || !summary.memory_hours.is_complete() {
    log::warn!(
      "Incomplete resource usage for workflow {}: {} / {}",
      metadata.id.as_deref().unwrap_or(UNKNOWN),
      summary.cpu_error(),
      summary.memory_error()
    );
  }

  summary
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{AttributeValue, JesInfo, RuntimeAttributes};

  fn shard(start: &str, end: &str, cpu: Option<&str>, memory: Option<&str>) -> CallShard {
    CallShard {
      start: Some(start.to_string()),
      end: Some(end.to_string()),
      runtime_attributes: Some(RuntimeAttributes {
        cpu: cpu.map(|c| AttributeValue::Text(c.to_string())),
        memory: memory.map(|m| AttributeValue::Text(m.to_string())),
        ..Default::default()
      }),
      ..Default::default()
    }
  }

  #[test]
  fn test_shard_usage() {
    let usage = shard_usage(
      "w.a",
      &shard(
        "2021-01-01T00:00:00Z",
        "2021-01-01T00:30:00Z",
        Some("4"),
        Some("8 GB"),
      ),
    );

    assert_eq!(usage.cpu, Ok(2.0));
    assert_eq!(usage.memory, Ok(4.0));
    assert_eq!(usage.backend, "unknown");
    assert_eq!(usage.zone, "N/A");
    assert_eq!(usage.machine_type, "N/A");
  }

  #[test]
  fn test_shard_usage_missing_times() {
    let mut record = shard("bad", "2021-01-01T00:30:00Z", Some("4"), Some("8 GB"));
    record.jes = Some(JesInfo {
      zone: Some("us-east1-b".to_string()),
      machine_type: None,
    });

    let usage = shard_usage("w.a", &record);
    let error = "Missing start/end time for w.a".to_string();
    assert_eq!(usage.cpu, Err(error.clone()));
    assert_eq!(usage.memory, Err(error));
    assert_eq!(usage.zone, "us-east1-b");
    assert_eq!(usage.machine_type, "unknown");
  }

  #[test]
  fn test_shard_usage_missing_attributes() {
    let record = CallShard {
      start: Some("2021-01-01T00:00:00Z".to_string()),
      end: Some("2021-01-01T00:30:00Z".to_string()),
      ..Default::default()
    };

    let usage = shard_usage("w.b", &record);
    assert_eq!(
      usage.cpu,
      Err("Missing runtime attributes for w.b".to_string())
    );
  }

  #[test]
  fn test_resource_hours_dedupes_errors() {
    let hours = ResourceHours::default()
      .accrue(&Ok(1.5))
      .accrue(&Err("Failed to get number of CPU for w.a".to_string()))
      .accrue(&Err("Failed to get number of CPU for w.a".to_string()))
      .accrue(&Ok(0.5));

    assert_eq!(hours.total, 2.0);
    assert_eq!(hours.errors.len(), 1);
    assert_eq!(hours.display(), "Failed to get number of CPU for w.a");
    assert_eq!(
      hours.outcome(),
      Err("Failed to get number of CPU for w.a".to_string())
    );
  }

  #[test]
  fn test_resource_hours_display() {
    let hours = ResourceHours::default().accrue(&Ok(1.0 / 3.0));
    assert_eq!(hours.display(), "0.33");
    assert_eq!(hours.error(), "");
  }

  #[test]
  fn test_labels() {
    let mut metadata = WorkflowMetadata {
      actual_workflow_language: Some("WDL".to_string()),
      start: Some("2021-01-01T00:00:00Z".to_string()),
      end: Some("2021-01-01T00:02:00Z".to_string()),
      ..Default::default()
    };
    assert_eq!(language_label(&metadata), "WDL");
    assert_eq!(
      duration_label(&metadata),
      "2021-01-01 00:00:00 - 2021-01-01 00:02:00 (2.0 min)"
    );

    metadata.actual_workflow_language_version = Some("1.0".to_string());
    metadata.end = None;
    assert_eq!(language_label(&metadata), "WDL (1.0)");
    assert_eq!(duration_label(&metadata), "2021-01-01 00:00:00 - ?");
  }
}
