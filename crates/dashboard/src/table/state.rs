use super::column::ColumnRegistry;
use super::filter::{apply_filters, Filter, FilterSet, FilterState};
use super::paginate::{page_count, paginate, PageSize};
use super::sort::sort_rows;
use super::value::Direction;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortState {
  pub key: String,
  pub direction: Direction,
}

/// One rendered page of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a, R> {
  pub rows: Vec<&'a R>,
  /// Rows passing the filters.
  pub matched: usize,
  pub total: usize,
  pub page: usize,
  pub page_count: usize,
}

/// Everything a table remembers between renders. The view is always
/// recomputed in full from this state and the current rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableState {
  pub filters: FilterSet,
  pub sort: Option<SortState>,
  pub page: usize,
  pub page_size: PageSize,
}

impl TableState {
  pub fn new(page_size: PageSize) -> Self {
    TableState {
      page_size,
      ..Default::default()
    }
  }

  pub fn with_sort(mut self, key: impl Into<String>, direction: Direction) -> Self {
    self.sort = Some(SortState {
      key: key.into(),
      direction,
    });
    self
  }

  /// Header click: flips the direction on the active column, otherwise
  /// switches to `key` in the column's default direction.
  pub fn sort_by<R>(&mut self, registry: &ColumnRegistry<R>, key: &str) -> Result<()> {
    let column = registry.require(key)?;

    let direction = match &self.sort {
      Some(sort) if sort.key == key => sort.direction.reverse(),
      _ => column.default_direction(),
    };

    self.sort = Some(SortState {
      key: key.to_string(),
      direction,
    });
    Ok(())
  }

  pub fn set_filter(&mut self, key: impl Into<String>, state: FilterState) {
    self.filters.set(key, state);
    self.page = 0;
  }

  pub fn filter(&mut self, key: impl Into<String>, filter: Filter) {
    self.set_filter(key, FilterState::Active(filter));
  }

  pub fn select<I, S>(&mut self, key: impl Into<String>, values: I, known: &BTreeSet<String>)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.filters.select(key, values, known);
    self.page = 0;
  }

  pub fn clear_filter(&mut self, key: &str) {
    self.filters.clear(key);
    self.page = 0;
  }

  pub fn set_page(&mut self, page: usize) {
    self.page = page;
  }

  pub fn set_page_size(&mut self, page_size: PageSize) {
    self.page_size = page_size;
    self.page = 0;
  }

  /// Filter, then sort, then paginate. A page past the end shows the last
  /// page instead.
  pub fn view<'a, R>(&self, rows: &'a [R], registry: &ColumnRegistry<R>) -> TableView<'a, R> {
    let mut matched = apply_filters(rows, registry, &self.filters);

    if let Some(sort) = &self.sort {
      match registry.get(&sort.key) {
        Some(column) => matched = sort_rows(matched, column, sort.direction),
        None => log::warn!("Ignoring sort on unknown column {}", sort.key),
      }
    }

    let page_count = page_count(matched.len(), self.page_size);
    let page = self.page.min(page_count - 1);

    TableView {
      rows: paginate(&matched, page, self.page_size).to_vec(),
      matched: matched.len(),
      total: rows.len(),
      page,
      page_count,
    }
  }
}
