use parking_lot::Mutex;

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
  sequence: u64,
  context: K,
}

impl<K> Ticket<K> {
  pub fn context(&self) -> &K {
    &self.context
  }
}

#[derive(Debug)]
struct Latest<K> {
  sequence: u64,
  context: Option<K>,
}

/// Latest-request-wins bookkeeping: only the result of the newest fetch,
/// issued for the context still on screen, may be committed.
#[derive(Debug)]
pub struct LatestRequest<K> {
  latest: Mutex<Latest<K>>,
}

impl<K> Default for LatestRequest<K> {
  fn default() -> Self {
    LatestRequest {
      latest: Mutex::new(Latest {
        sequence: 0,
        context: None,
      }),
    }
  }
}

impl<K: Clone + PartialEq> LatestRequest<K> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts a fetch for `context`, superseding every earlier ticket.
  pub fn begin(&self, context: K) -> Ticket<K> {
    let mut latest = self.latest.lock();
    latest.sequence += 1;
    latest.context = Some(context.clone());

    Ticket {
      sequence: latest.sequence,
      context,
    }
  }

  pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
    let latest = self.latest.lock();
    latest.sequence == ticket.sequence && latest.context.as_ref() == Some(&ticket.context)
  }

  /// Runs `commit` only while `ticket` is current; the check and the commit
  /// happen under one lock so a newer `begin` cannot slip in between.
  pub fn commit_if_current<F>(&self, ticket: &Ticket<K>, commit: F) -> bool
  where
    F: FnOnce(),
  {
    let latest = self.latest.lock();
    let current =
      latest.sequence == ticket.sequence && latest.context.as_ref() == Some(&ticket.context);
    if current {
      commit();
    }
    current
  }

  pub fn current_context(&self) -> Option<K> {
    self.latest.lock().context.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_newest_ticket_wins() {
    let guard = LatestRequest::new();
    let first = guard.begin("wf-a".to_string());
    let second = guard.begin("wf-b".to_string());

    assert!(!guard.is_current(&first));
    assert!(guard.is_current(&second));
    assert_eq!(guard.current_context(), Some("wf-b".to_string()));
  }

  #[test]
  fn test_same_context_refetch() {
    let guard = LatestRequest::new();
    let first = guard.begin(("v1", "wf-a"));
    let second = guard.begin(("v1", "wf-a"));

    assert!(!guard.is_current(&first));
    assert!(guard.is_current(&second));
    assert_eq!(second.context(), &("v1", "wf-a"));
  }

  #[test]
  fn test_commit_if_current() {
    let guard = LatestRequest::new();
    let stale = guard.begin(1);
    let fresh = guard.begin(2);

    let mut committed = vec![];
    assert!(!guard.commit_if_current(&stale, || committed.push(1)));
    assert!(guard.commit_if_current(&fresh, || committed.push(2)));
    assert_eq!(committed, vec![2]);
  }
}
