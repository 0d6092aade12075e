use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkflowType {
  #[default]
  #[serde(rename = "WDL")]
  Wdl,
  #[serde(rename = "CWL")]
  Cwl,
}

impl WorkflowType {
  pub fn all() -> [WorkflowType; 2] {
    [WorkflowType::Wdl, WorkflowType::Cwl]
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      WorkflowType::Wdl => "WDL",
      WorkflowType::Cwl => "CWL",
    }
  }

  /// Language versions the engine accepts, the first one being the default.
  pub fn versions(&self) -> &'static [&'static str] {
    match self {
      WorkflowType::Wdl => &["draft-2", "1.0"],
      WorkflowType::Cwl => &["v1.0"],
    }
  }

  pub fn default_version(&self) -> &'static str {
    self.versions()[0]
  }

  pub fn supports(&self, version: &str) -> bool {
    self.versions().contains(&version)
  }
}

impl fmt::Display for WorkflowType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl TryFrom<&str> for WorkflowType {
  type Error = Error;

  fn try_from(value: &str) -> Result<Self> {
    match value.to_uppercase().as_str() {
      "WDL" => Ok(WorkflowType::Wdl),
      "CWL" => Ok(WorkflowType::Cwl),
      _ => Err(Error::invalid_submission(format!(
        "Unsupported workflow type {}",
        value
      ))),
    }
  }
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
  pub file_name: String,
  pub content: Vec<u8>,
}

impl Attachment {
  pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
    Attachment {
      file_name: file_name.into(),
      content: content.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
  Text(String),
  File(Attachment),
}

/// One part of a multipart body, in the order it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
  pub name: &'static str,
  pub value: FormValue,
}

impl FormField {
  fn text(name: &'static str, value: impl Into<String>) -> Self {
    FormField {
      name,
      value: FormValue::Text(value.into()),
    }
  }

  fn file(name: &'static str, attachment: &Option<Attachment>) -> Option<Self> {
    attachment.as_ref().map(|attachment| FormField {
      name,
      value: FormValue::File(attachment.clone()),
    })
  }
}

fn check_language(workflow_type: WorkflowType, version: &str) -> Result<()> {
  if workflow_type.supports(version) {
    Ok(())
  } else {
    Err(Error::invalid_submission(format!(
      "{} does not support version {}",
      workflow_type, version
    )))
  }
}

fn check_source(url: &Option<String>, source: &Option<Attachment>) -> Result<()> {
  let has_url = url.as_deref().is_some_and(|url| !url.is_empty());
  if has_url || source.is_some() {
    Ok(())
  } else {
    Err(Error::invalid_submission(
      "Either a workflow source file or a workflow URL is required",
    ))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSubmission {
  pub workflow_type: WorkflowType,
  pub workflow_type_version: String,
  pub on_hold: bool,
  /// Entry point inside a CWL bundle. Ignored for WDL.
  pub workflow_root: Option<String>,
  pub workflow_url: Option<String>,
  pub source: Option<Attachment>,
  pub inputs: Option<Attachment>,
  pub options: Option<Attachment>,
  pub labels: Option<Attachment>,
  pub dependencies: Option<Attachment>,
}

impl Default for WorkflowSubmission {
  fn default() -> Self {
    WorkflowSubmission::new(WorkflowType::default())
  }
}

impl WorkflowSubmission {
  pub fn new(workflow_type: WorkflowType) -> Self {
    WorkflowSubmission {
      workflow_type,
      workflow_type_version: workflow_type.default_version().to_string(),
      on_hold: false,
      workflow_root: None,
      workflow_url: None,
      source: None,
      inputs: None,
      options: None,
      labels: None,
      dependencies: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    check_language(self.workflow_type, &self.workflow_type_version)?;
    check_source(&self.workflow_url, &self.source)
  }

  pub fn form_fields(&self) -> Vec<FormField> {
    let mut fields = vec![
      FormField::text("workflowType", self.workflow_type.as_str()),
      FormField::text("workflowTypeVersion", self.workflow_type_version.as_str()),
      FormField::text("workflowOnHold", self.on_hold.to_string()),
    ];

    if self.workflow_type == WorkflowType::Cwl {
      fields.push(FormField::text(
        "workflowRoot",
        self.workflow_root.clone().unwrap_or_default(),
      ));
    }
    if let Some(url) = self.workflow_url.as_deref().filter(|url| !url.is_empty()) {
      fields.push(FormField::text("workflowUrl", url));
    }

    fields.extend(
      [
        FormField::file("workflowSource", &self.source),
        FormField::file("workflowInputs", &self.inputs),
        FormField::file("workflowOptions", &self.options),
        FormField::file("labels", &self.labels),
        FormField::file("workflowDependencies", &self.dependencies),
      ]
      .into_iter()
      .flatten(),
    );

    fields
  }
}

/// Body of a WOM describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeRequest {
  pub workflow_type: WorkflowType,
  pub workflow_type_version: String,
  pub workflow_url: Option<String>,
  pub source: Option<Attachment>,
  pub inputs: Option<Attachment>,
}

impl DescribeRequest {
  pub fn new(workflow_type: WorkflowType) -> Self {
    DescribeRequest {
      workflow_type,
      workflow_type_version: workflow_type.default_version().to_string(),
      workflow_url: None,
      source: None,
      inputs: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    check_language(self.workflow_type, &self.workflow_type_version)?;
    check_source(&self.workflow_url, &self.source)
  }

  pub fn form_fields(&self) -> Vec<FormField> {
    let mut fields = vec![
      FormField::text("workflowType", self.workflow_type.as_str()),
      FormField::text("workflowTypeVersion", self.workflow_type_version.as_str()),
    ];
    if let Some(url) = self.workflow_url.as_deref().filter(|url| !url.is_empty()) {
      fields.push(FormField::text("workflowUrl", url));
    }
    fields.extend(FormField::file("workflowSource", &self.source));
    fields.extend(FormField::file("workflowInputs", &self.inputs));
    fields
  }
}

/// Top-level scalar facts of a describe response (`valid`, `isRunnableWorkflow`,
/// `validWorkflow`, ...). Nested parts such as inputs and errors are left to
/// dedicated views.
pub fn describe_summary(response: &Value) -> BTreeMap<String, String> {
  let Some(object) = response.as_object() else {
    return BTreeMap::new();
  };

  object
    .iter()
    .filter_map(|(key, value)| match value {
      Value::String(text) => Some((key.clone(), text.clone())),
      Value::Bool(flag) => Some((key.clone(), flag.to_string())),
      _ => None,
    })
    .collect()
}
