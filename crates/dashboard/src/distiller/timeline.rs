use crate::{CallShard, ExecutionEvent, Time, WorkflowMetadata};
use serde::Serialize;

/// A named sub-interval of a shard's run (queued, running, delocalizing ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
  pub label: String,
  pub start: Time,
  pub end: Time,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardTimeline {
  pub shard_index: Option<i64>,
  pub start: Time,
  pub end: Time,
  pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallTimeline {
  pub call_name: String,
  pub start: Time,
  pub end: Time,
  pub shards: Vec<ShardTimeline>,
}

/// Call / shard / event hierarchy of one workflow, every level ordered by
/// ascending end time. `start` and `end` are `None` only when no call has a
/// timed event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
  pub start: Option<Time>,
  pub end: Option<Time>,
  pub calls: Vec<CallTimeline>,
}

impl Timeline {
  pub fn is_empty(&self) -> bool {
    self.calls.is_empty()
  }

  pub fn shard_count(&self) -> usize {
    self.calls.iter().map(|call| call.shards.len()).sum()
  }
}

fn timed_event(event: &ExecutionEvent) -> Option<Event> {
  Some(Event {
    label: event.description.clone().unwrap_or_default(),
    start: event.start()?,
    end: event.end()?,
  })
}

fn shard_timeline(shard: &CallShard) -> Option<ShardTimeline> {
  let mut events: Vec<Event> = shard.execution_events.iter().filter_map(timed_event).collect();
  if events.is_empty() {
    return None;
  }
  events.sort_by_key(|event| event.end);

  let start = events.iter().map(|event| event.start).min()?;
  let end = events.iter().map(|event| event.end).max()?;

  Some(ShardTimeline {
    shard_index: shard.shard_index,
    start,
    end,
    events,
  })
}

fn call_timeline(call_name: &str, shards: &[CallShard]) -> Option<CallTimeline> {
  let mut shards: Vec<ShardTimeline> = shards.iter().filter_map(shard_timeline).collect();
  if shards.is_empty() {
    log::debug!("Call {} has no timed execution events", call_name);
    return None;
  }
  shards.sort_by_key(|shard| shard.end);

  let start = shards.iter().map(|shard| shard.start).min()?;
  let end = shards.iter().map(|shard| shard.end).max()?;

  Some(CallTimeline {
    call_name: call_name.to_string(),
    start,
    end,
    shards,
  })
}

pub fn build_timeline(metadata: &WorkflowMetadata) -> Timeline {
  let mut calls: Vec<CallTimeline> = metadata
    .calls
    .iter()
    .filter_map(|(call_name, entry)| call_timeline(call_name, entry.shards()))
    .collect();
  // sort_by_key is stable: equal ends keep document order
  calls.sort_by_key(|call| call.end);

  Timeline {
    start: calls.iter().map(|call| call.start).min(),
    end: calls.iter().map(|call| call.end).max(),
    calls,
  }
}
