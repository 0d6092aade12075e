use crate::{ClientError, ClientResult, Config, QueryParams, WorkflowApi};
use cromwell_dashboard::{
  Attachment, DescribeRequest, FormField, FormValue, QueryResponse, WorkflowMetadata,
  WorkflowStatus, WorkflowSubmission,
};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Cromwell REST client over `reqwest`.
#[derive(Clone)]
pub struct CromwellClient {
  inner: reqwest::Client,
  config: Arc<Config>,
  base_url: Url,
}

impl CromwellClient {
  pub fn new(config: Config) -> ClientResult<Self> {
    config.validate()?;

    let inner = reqwest::Client::builder()
      .timeout(config.request_timeout)
      .build()?;

    let base_url = Url::parse(config.api_url.trim()).map_err(|e| {
      ClientError::config_error(format!("Invalid api-url `{}`: {}", config.api_url, e))
    })?;

    Ok(CromwellClient {
      inner,
      base_url,
      config: Arc::new(config),
    })
  }

  pub fn from_env() -> ClientResult<Self> {
    Self::new(Config::from_env()?)
  }

  pub fn config(&self) -> Arc<Config> {
    Arc::clone(&self.config)
  }

  pub fn api_version(&self) -> &str {
    &self.config.api_version
  }

  /// Appends `segments` to the base url, percent-encoding each one, so
  /// ids containing `/` or `?` stay a single path segment.
  fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| ClientError::config_error(format!("Invalid api url {}", self.base_url)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn workflows_endpoint(&self, rest: &[&str]) -> ClientResult<Url> {
    let mut segments = vec!["api", "workflows", self.config.api_version.as_str()];
    segments.extend_from_slice(rest);
    self.endpoint(&segments)
  }

  fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
    log::trace!("{} {}", method, url);

    let mut builder = self.inner.request(method, url);
    if let Some(token) = self.config.bearer_token() {
      builder = builder.header(header::AUTHORIZATION, token);
    }
    builder
  }

  async fn send<T>(&self, builder: reqwest::RequestBuilder) -> ClientResult<T>
  where
    T: DeserializeOwned,
  {
    let response = builder.send().await?;
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;

    Ok(serde_json::from_slice(&bytes)?)
  }
}

/// Turns a non-2xx response into an error carrying the server's message.
async fn check_status(response: Response) -> ClientResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  let message = serde_json::from_str::<Value>(&body)
    .ok()
    .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
    .unwrap_or(body);

  Err(ClientError::unexpected_status(status, message))
}

fn multipart_form(fields: Vec<FormField>) -> Form {
  fields
    .into_iter()
    .fold(Form::new(), |form, field| match field.value {
      FormValue::Text(text) => form.text(field.name, text),
      FormValue::File(attachment) => form.part(
        field.name,
        Part::bytes(attachment.content).file_name(attachment.file_name),
      ),
    })
}

/// Reads a local file into an upload attachment named after the file.
pub async fn load_attachment(path: impl AsRef<Path>) -> ClientResult<Attachment> {
  let path = path.as_ref();
  let content = tokio::fs::read(path).await?;
  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .unwrap_or_else(|| path.display().to_string());

  Ok(Attachment::new(file_name, content))
}

#[async_trait::async_trait]
impl WorkflowApi for CromwellClient {
  async fn query(&self, params: &QueryParams) -> ClientResult<QueryResponse> {
    let builder = self
      .request(Method::GET, self.workflows_endpoint(&["query"])?)
      .query(&params.to_pairs());
    self.send(builder).await
  }

  async fn metadata(&self, id: &str) -> ClientResult<WorkflowMetadata> {
    let url = self.workflows_endpoint(&[id, "metadata"])?;
    self.send(self.request(Method::GET, url)).await
  }

  async fn engine_status(&self) -> ClientResult<String> {
    let url = self.endpoint(&["engine", self.config.api_version.as_str(), "status"])?;
    let response = self.request(Method::GET, url).send().await?;
    let status = response.status();

    Ok(status.canonical_reason().unwrap_or(status.as_str()).to_string())
  }

  async fn abort(&self, id: &str) -> ClientResult<WorkflowStatus> {
    let url = self.workflows_endpoint(&[id, "abort"])?;
    let builder = self
      .request(Method::POST, url)
      .json(&serde_json::json!({}));
    self.send(builder).await
  }

  async fn update_labels(
    &self,
    id: &str,
    labels: &BTreeMap<String, String>,
  ) -> ClientResult<Value> {
    let url = self.workflows_endpoint(&[id, "labels"])?;
    let builder = self.request(Method::PATCH, url).json(labels);
    self.send(builder).await
  }

  async fn submit(&self, submission: &WorkflowSubmission) -> ClientResult<WorkflowStatus> {
    submission.validate()?;

    let form = multipart_form(submission.form_fields());
    let builder = self
      .request(Method::POST, self.workflows_endpoint(&[])?)
      .multipart(form);
    let status: WorkflowStatus = self.send(builder).await?;
    log::info!("Submitted workflow {} ({})", status.id, status.status);

    Ok(status)
  }

  async fn describe(&self, request: &DescribeRequest) -> ClientResult<Value> {
    request.validate()?;

    let url = self.endpoint(&["api", "womtool", self.config.api_version.as_str(), "describe"])?;
    let builder = self
      .request(Method::POST, url)
      .multipart(multipart_form(request.form_fields()));
    self.send(builder).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_paths() {
    let client = CromwellClient::new(Config::new("http://localhost:8000/")).unwrap();
    assert_eq!(
      client.workflows_endpoint(&["query"]).unwrap().as_str(),
      "http://localhost:8000/api/workflows/v1/query"
    );
    assert_eq!(
      client.workflows_endpoint(&[]).unwrap().as_str(),
      "http://localhost:8000/api/workflows/v1"
    );
    assert_eq!(
      client.endpoint(&["engine", "v1", "status"]).unwrap().as_str(),
      "http://localhost:8000/engine/v1/status"
    );
  }

  #[test]
  fn test_paths_under_prefix() {
    let client = CromwellClient::new(Config::new("https://example.org/cromwell/")).unwrap();
    assert_eq!(
      client.workflows_endpoint(&["abc", "abort"]).unwrap().as_str(),
      "https://example.org/cromwell/api/workflows/v1/abc/abort"
    );
  }

  #[test]
  fn test_workflow_id_is_one_segment() {
    let client = CromwellClient::new(Config::new("http://localhost:8000")).unwrap();
    assert_eq!(
      client.workflows_endpoint(&["a/b?c", "metadata"]).unwrap().as_str(),
      "http://localhost:8000/api/workflows/v1/a%2Fb%3Fc/metadata"
    );
  }

  #[test]
  fn test_rejects_invalid_config() {
    assert!(CromwellClient::new(Config::new("localhost")).is_err());
  }
}
