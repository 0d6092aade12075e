use super::column::{ColumnRegistry, ColumnSpec};
use super::value::CellValue;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
  /// Case-insensitive substring of the displayed text.
  Contains(String),
  /// Displayed text is one of the allowed values.
  OneOf(BTreeSet<String>),
  /// Inclusive numeric range; times compare as epoch milliseconds and
  /// durations as milliseconds.
  Range { min: Option<f64>, max: Option<f64> },
}

impl Filter {
  pub fn contains(text: impl Into<String>) -> Self {
    Filter::Contains(text.into())
  }

  pub fn one_of<I, S>(values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Filter::OneOf(values.into_iter().map(Into::into).collect())
  }

  pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
    Filter::Range { min, max }
  }

  /// A filter that lets every present value through.
  fn is_vacuous(&self) -> bool {
    match self {
      Filter::Contains(text) => text.is_empty(),
      Filter::Range { min, max } => min.is_none() && max.is_none(),
      Filter::OneOf(_) => false,
    }
  }

  /// Missing values never satisfy an active filter.
  pub fn matches(&self, value: &CellValue, display: &str) -> bool {
    if value.is_missing() {
      return false;
    }

    match self {
      Filter::Contains(text) => display.to_lowercase().contains(&text.to_lowercase()),
      Filter::OneOf(values) => values.contains(display),
      Filter::Range { min, max } => match value.as_number() {
        Some(n) => min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max),
        None => false,
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterState {
  #[default]
  Unset,
  Active(Filter),
}

impl FilterState {
  pub fn is_active(&self) -> bool {
    matches!(self, FilterState::Active(_))
  }
}

/// Per-column filters, combined with logical AND.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
  filters: BTreeMap<String, Filter>,
}

impl FilterSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self, key: &str) -> FilterState {
    match self.filters.get(key) {
      Some(filter) => FilterState::Active(filter.clone()),
      None => FilterState::Unset,
    }
  }

  pub fn set(&mut self, key: impl Into<String>, state: FilterState) {
    let key = key.into();
    match state {
      FilterState::Active(filter) if !filter.is_vacuous() => {
        self.filters.insert(key, filter);
      }
      _ => {
        self.filters.remove(&key);
      }
    }
  }

  pub fn activate(&mut self, key: impl Into<String>, filter: Filter) {
    self.set(key, FilterState::Active(filter));
  }

  pub fn clear(&mut self, key: &str) {
    self.filters.remove(key);
  }

  /// Set-membership selection. Selecting every known option leaves the
  /// column unfiltered, so options that appear later are not hidden.
  pub fn select<I, S>(&mut self, key: impl Into<String>, values: I, known: &BTreeSet<String>)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let selected: BTreeSet<String> = values.into_iter().map(Into::into).collect();
    if known.is_subset(&selected) && !known.is_empty() {
      self.set(key, FilterState::Unset);
    } else {
      self.set(key, FilterState::Active(Filter::OneOf(selected)));
    }
  }

  pub fn active(&self) -> impl Iterator<Item = (&str, &Filter)> {
    self
      .filters
      .iter()
      .map(|(key, filter)| (key.as_str(), filter))
  }

  pub fn is_empty(&self) -> bool {
    self.filters.is_empty()
  }

  pub fn len(&self) -> usize {
    self.filters.len()
  }

  /// Copy without the set-membership filters that allow every value the
  /// current rows have. Call again whenever the rows change.
  pub fn effective<R>(&self, registry: &ColumnRegistry<R>, rows: &[R]) -> FilterSet {
    let filters = self
      .filters
      .iter()
      .filter(|(key, filter)| match (filter, registry.get(key)) {
        (Filter::OneOf(values), Some(column)) => {
          !distinct_values(rows, column).is_subset(values)
        }
        _ => true,
      })
      .map(|(key, filter)| (key.clone(), filter.clone()))
      .collect();

    FilterSet { filters }
  }

  /// Drops, in place, selections that stopped narrowing the rows.
  pub fn reconcile<R>(&mut self, registry: &ColumnRegistry<R>, rows: &[R]) {
    *self = self.effective(registry, rows);
  }

  /// Whether `key` is narrowing the current rows at all.
  pub fn is_filtering<R>(&self, key: &str, registry: &ColumnRegistry<R>, rows: &[R]) -> bool {
    self.effective(registry, rows).state(key).is_active()
  }
}

/// Displayed texts of the present values of `column`, the option list of a
/// set-membership filter.
pub fn distinct_values<R, C>(rows: &[R], column: &C) -> BTreeSet<String>
where
  C: ColumnSpec<R> + ?Sized,
{
  rows
    .iter()
    .map(|row| column.value(row))
    .filter(|value| !value.is_missing())
    .map(|value| column.display(&value))
    .collect()
}

/// Rows passing every effective filter, in their original order. Filters on
/// keys the registry does not know are ignored.
pub fn apply_filters<'a, R>(
  rows: &'a [R],
  registry: &ColumnRegistry<R>,
  filters: &FilterSet,
) -> Vec<&'a R> {
  let filters = filters.effective(registry, rows);
  let active: Vec<(&(dyn ColumnSpec<R> + Send + Sync), &Filter)> = filters
    .active()
    .filter_map(|(key, filter)| match registry.get(key) {
      Some(column) => Some((column, filter)),
      None => {
        log::warn!("Ignoring filter on unknown column {}", key);
        None
      }
    })
    .collect();

  rows
    .iter()
    .filter(|row| {
      active.iter().all(|(column, filter)| {
        let value = column.value(row);
        let display = column.display(&value);
        filter.matches(&value, &display)
      })
    })
    .collect()
}
