use crate::ClientResult;
use cromwell_dashboard::{
  DescribeRequest, QueryResponse, WorkflowMetadata, WorkflowStatus, WorkflowSubmission,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Filters understood by the workflow query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  pub ids: Vec<String>,
  pub names: Vec<String>,
  pub statuses: Vec<String>,
  /// `key:value` pairs.
  pub labels: Vec<String>,
  pub submission: Option<String>,
  pub start: Option<String>,
  pub end: Option<String>,
  pub page: Option<usize>,
  pub page_size: Option<usize>,
  pub include_labels: bool,
}

impl QueryParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn status(mut self, status: impl Into<String>) -> Self {
    self.statuses.push(status.into());
    self
  }

  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.names.push(name.into());
    self
  }

  pub fn id(mut self, id: impl Into<String>) -> Self {
    self.ids.push(id.into());
    self
  }

  pub fn label(mut self, key: &str, value: &str) -> Self {
    self.labels.push(format!("{}:{}", key, value));
    self
  }

  pub fn page(mut self, page: usize, page_size: usize) -> Self {
    self.page = Some(page);
    self.page_size = Some(page_size);
    self
  }

  pub fn include_labels(mut self) -> Self {
    self.include_labels = true;
    self
  }

  /// Query string pairs, repeated keys for multi-valued filters.
  pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = vec![];
    pairs.extend(self.ids.iter().map(|id| ("id", id.clone())));
    pairs.extend(self.names.iter().map(|name| ("name", name.clone())));
    pairs.extend(self.statuses.iter().map(|status| ("status", status.clone())));
    pairs.extend(self.labels.iter().map(|label| ("label", label.clone())));

    let optional = [
      ("submission", self.submission.clone()),
      ("start", self.start.clone()),
      ("end", self.end.clone()),
      ("page", self.page.map(|page| page.to_string())),
      ("pageSize", self.page_size.map(|size| size.to_string())),
    ];
    pairs.extend(
      optional
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value))),
    );

    if self.include_labels {
      pairs.push(("additionalQueryResultFields", "labels".to_string()));
    }
    pairs
  }
}

/// Operations the dashboard performs against a Cromwell server.
#[async_trait::async_trait]
pub trait WorkflowApi: Send + Sync {
  async fn query(&self, params: &QueryParams) -> ClientResult<QueryResponse>;

  async fn metadata(&self, id: &str) -> ClientResult<WorkflowMetadata>;

  /// Reason phrase of the engine status endpoint (`OK` when healthy).
  async fn engine_status(&self) -> ClientResult<String>;

  async fn abort(&self, id: &str) -> ClientResult<WorkflowStatus>;

  async fn update_labels(
    &self,
    id: &str,
    labels: &BTreeMap<String, String>,
  ) -> ClientResult<Value>;

  async fn submit(&self, submission: &WorkflowSubmission) -> ClientResult<WorkflowStatus>;

  async fn describe(&self, request: &DescribeRequest) -> ClientResult<Value>;
}
