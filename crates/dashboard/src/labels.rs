use serde::Serialize;
use std::collections::BTreeMap;

/// One editable label line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRow {
  pub key: String,
  pub value: String,
  /// Labels already on the workflow: the key is fixed and the row cannot
  /// be deleted.
  pub read_only_key: bool,
  pub key_conflict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelAction {
  Add {
    key: Option<String>,
    value: Option<String>,
  },
  UpdateKey {
    id: usize,
    key: String,
  },
  UpdateValue {
    id: usize,
    value: String,
  },
  Delete {
    id: usize,
  },
}

/// Label editor state: rows keyed by a stable id, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelRoster {
  rows: BTreeMap<usize, LabelRow>,
  next_id: usize,
}

impl LabelRoster {
  pub fn new(current: &BTreeMap<String, String>) -> Self {
    let rows: BTreeMap<usize, LabelRow> = current
      .iter()
      .enumerate()
      .map(|(id, (key, value))| {
        let row = LabelRow {
          key: key.clone(),
          value: value.clone(),
          read_only_key: true,
          key_conflict: false,
        };
        (id, row)
      })
      .collect();

    LabelRoster {
      next_id: rows.len(),
      rows,
    }
  }

  pub fn get(&self, id: usize) -> Option<&LabelRow> {
    self.rows.get(&id)
  }

  pub fn rows(&self) -> impl Iterator<Item = (usize, &LabelRow)> {
    self.rows.iter().map(|(id, row)| (*id, row))
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// Applies `action`. Refused actions are logged and leave the roster as
  /// it was.
  pub fn dispatch(&mut self, action: LabelAction) {
    match action {
      LabelAction::Add { key, value } => {
        let key = key.unwrap_or_default();
        self.rows.insert(
          self.next_id,
          LabelRow {
            key: key.clone(),
            value: value.unwrap_or_default(),
            read_only_key: false,
            key_conflict: false,
          },
        );
        self.next_id += 1;
        self.update_conflicts(&key);
      }
      LabelAction::UpdateKey { id, key } => {
        let previous = match self.rows.get_mut(&id) {
          Some(row) if row.read_only_key => {
            log::error!("Label {} key cannot be changed!", id);
            return;
          }
          Some(row) => std::mem::replace(&mut row.key, key.clone()),
          None => {
            log::error!("Label {} not in records!", id);
            return;
          }
        };
        self.update_conflicts(&previous);
        self.update_conflicts(&key);
      }
      LabelAction::UpdateValue { id, value } => match self.rows.get_mut(&id) {
        Some(row) => row.value = value,
        None => log::error!("Label {} not in records!", id),
      },
      LabelAction::Delete { id } => {
        let read_only = match self.rows.get(&id) {
          Some(row) => row.read_only_key,
          None => {
            log::error!("Label {} not in records!", id);
            return;
          }
        };
        if read_only {
          log::error!("Label {} cannot be deleted!", id);
          return;
        }
        if let Some(removed) = self.rows.remove(&id) {
          self.update_conflicts(&removed.key);
        }
      }
    }
  }

  fn update_conflicts(&mut self, key: &str) {
    let sharing = self.rows.values().filter(|row| row.key == key).count();
    let conflict = !key.is_empty() && sharing > 1;
    for row in self.rows.values_mut().filter(|row| row.key == key) {
      row.key_conflict = conflict;
    }
  }

  /// Submitting is blocked while any two rows share a key.
  pub fn has_conflict(&self) -> bool {
    self.rows.values().any(|row| row.key_conflict)
  }

  /// Labels to send: non-empty keys whose value is new or differs from
  /// `current`.
  pub fn changes(&self, current: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    self
      .rows
      .values()
      .filter(|row| !row.key.is_empty())
      .filter(|row| current.get(&row.key) != Some(&row.value))
      .map(|row| (row.key.clone(), row.value.clone()))
      .collect()
  }
}
