use crate::WorkflowSummary;
use std::collections::BTreeMap;

const UNKNOWN_STATUS: &str = "Unknown";

/// Number of workflows per status, statuses in descending order.
pub fn status_counts<'a, I>(rows: I) -> Vec<(String, usize)>
where
  I: IntoIterator<Item = &'a WorkflowSummary>,
{
  let mut counts: BTreeMap<String, usize> = BTreeMap::new();
  for row in rows {
    let status = row.status.as_deref().unwrap_or(UNKNOWN_STATUS);
    *counts.entry(status.to_string()).or_default() += 1;
  }

  counts.into_iter().rev().collect()
}
