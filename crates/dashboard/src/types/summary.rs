use super::time::{parse_optional, Time};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of `/api/workflows/{version}/query`.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
  pub id: String,
  pub name: Option<String>,
  pub submission: Option<String>,
  pub start: Option<String>,
  pub end: Option<String>,
  pub status: Option<String>,
  pub metadata_archive_status: Option<String>,
  pub labels: Option<BTreeMap<String, String>>,
}

impl WorkflowSummary {
  pub fn new(id: impl Into<String>) -> Self {
    WorkflowSummary {
      id: id.into(),
      ..Default::default()
    }
  }

  pub fn submission_time(&self) -> Option<Time> {
    parse_optional(self.submission.as_deref())
  }

  pub fn start_time(&self) -> Option<Time> {
    parse_optional(self.start.as_deref())
  }

  pub fn end_time(&self) -> Option<Time> {
    parse_optional(self.end.as_deref())
  }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
  #[serde(default)]
  pub results: Vec<WorkflowSummary>,
  pub total_results_count: Option<u64>,
}

/// Reply of the abort and submit endpoints.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct WorkflowStatus {
  pub id: String,
  pub status: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_query_response() {
    let json = r#"{
      "results": [
        {
          "id": "6f1a",
          "name": "hello",
          "submission": "2021-01-01T00:00:00.000Z",
          "start": "2021-01-01T00:01:00.000Z",
          "status": "Running",
          "metadataArchiveStatus": "Unarchived",
          "labels": { "project": "x" }
        },
        { "id": "7b2c" }
      ],
      "totalResultsCount": 2
    }"#;

    let response: QueryResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.total_results_count, Some(2));

    let first = &response.results[0];
    assert_eq!(first.metadata_archive_status.as_deref(), Some("Unarchived"));
    assert!(first.start_time().unwrap() > first.submission_time().unwrap());
    assert!(first.end_time().is_none());

    assert_eq!(response.results[1], WorkflowSummary::new("7b2c"));
  }
}
