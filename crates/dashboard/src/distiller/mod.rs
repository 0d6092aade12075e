mod summary;
mod tables;
mod timeline;

pub use summary::*;
pub use tables::*;
pub use timeline::*;

use crate::WorkflowMetadata;
use serde::Serialize;

/// Everything the workflow detail view derives from one metadata document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distilled {
  pub summary: DistilledSummary,
  pub timeline: Timeline,
}

/// Turns a metadata document into its display summary and execution
/// timeline. Never fails: unusable fields show up as error text in the
/// summary and are left out of the timeline.
pub fn distill(metadata: &WorkflowMetadata) -> Distilled {
  let summary = summarize(metadata);
  let timeline = build_timeline(metadata);

  log::debug!(
    "Distilled workflow {}: {} calls, {} timed shards",
    metadata.id.as_deref().unwrap_or("unknown"),
    timeline.calls.len(),
    timeline.shard_count()
  );

  Distilled { summary, timeline }
}
