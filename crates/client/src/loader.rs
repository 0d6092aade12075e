use crate::{LatestRequest, QueryParams, WorkflowApi};
use cromwell_dashboard::{distill, status_counts, Distilled, WorkflowMetadata, WorkflowSummary};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
  Committed,
  /// A newer load started before this one finished; its result was dropped.
  Stale,
  /// The fetch failed and the previous state was kept.
  Failed,
}

/// What the workflow detail view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowView {
  pub id: String,
  pub metadata: WorkflowMetadata,
  pub distilled: Distilled,
}

/// Loads one workflow's metadata and keeps the distilled view of the most
/// recently requested workflow.
pub struct WorkflowLoader<A> {
  api: Arc<A>,
  api_version: String,
  guard: LatestRequest<(String, String)>,
  view: Mutex<Option<WorkflowView>>,
}

impl<A: WorkflowApi> WorkflowLoader<A> {
  pub fn new(api: Arc<A>, api_version: impl Into<String>) -> Self {
    WorkflowLoader {
      api,
      api_version: api_version.into(),
      guard: LatestRequest::new(),
      view: Mutex::new(None),
    }
  }

  pub async fn load(&self, id: &str) -> LoadOutcome {
    let ticket = self
      .guard
      .begin((self.api_version.clone(), id.to_string()));

    let metadata = match self.api.metadata(id).await {
      Ok(metadata) => metadata,
      Err(err) => {
        log::error!("Failed to load metadata of workflow {}: {}", id, err);
        return LoadOutcome::Failed;
      }
    };

    let view = WorkflowView {
      id: id.to_string(),
      distilled: distill(&metadata),
      metadata,
    };

    let committed = self
      .guard
      .commit_if_current(&ticket, || *self.view.lock() = Some(view));
    if committed {
      LoadOutcome::Committed
    } else {
      log::debug!("Dropping stale metadata of workflow {}", id);
      LoadOutcome::Stale
    }
  }

  pub fn view(&self) -> Option<WorkflowView> {
    self.view.lock().clone()
  }
}

/// Rows of the workflow list, refreshed by `load`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowList {
  pub rows: Vec<WorkflowSummary>,
  pub total: Option<u64>,
}

impl WorkflowList {
  pub fn status_counts(&self) -> Vec<(String, usize)> {
    status_counts(&self.rows)
  }
}

pub struct WorkflowListLoader<A> {
  api: Arc<A>,
  api_version: String,
  guard: LatestRequest<(String, QueryParams)>,
  list: Mutex<WorkflowList>,
}

impl<A: WorkflowApi> WorkflowListLoader<A> {
  pub fn new(api: Arc<A>, api_version: impl Into<String>) -> Self {
    WorkflowListLoader {
      api,
      api_version: api_version.into(),
      guard: LatestRequest::new(),
      list: Mutex::new(WorkflowList::default()),
    }
  }

  pub async fn load(&self, params: &QueryParams) -> LoadOutcome {
    let ticket = self
      .guard
      .begin((self.api_version.clone(), params.clone()));

    let response = match self.api.query(params).await {
      Ok(response) => response,
      Err(err) => {
        log::error!("Failed to query workflows: {}", err);
        return LoadOutcome::Failed;
      }
    };

    let list = WorkflowList {
      rows: response.results,
      total: response.total_results_count,
    };

    if self
      .guard
      .commit_if_current(&ticket, || *self.list.lock() = list)
    {
      LoadOutcome::Committed
    } else {
      LoadOutcome::Stale
    }
  }

  pub fn list(&self) -> WorkflowList {
    self.list.lock().clone()
  }
}
