use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
  Rows(usize),
  All,
}

impl Default for PageSize {
  fn default() -> Self {
    PageSize::Rows(25)
  }
}

/// Rows of page `page` (zero based). Pages past the end are empty.
pub fn paginate<T>(rows: &[T], page: usize, size: PageSize) -> &[T] {
  match size {
    PageSize::All if page == 0 => rows,
    PageSize::All | PageSize::Rows(0) => &[],
    PageSize::Rows(size) => {
      let start = page.saturating_mul(size).min(rows.len());
      let end = start.saturating_add(size).min(rows.len());
      &rows[start..end]
    }
  }
}

/// Number of pages needed for `total` rows; at least one.
pub fn page_count(total: usize, size: PageSize) -> usize {
  match size {
    PageSize::Rows(size) if size > 0 => ((total + size - 1) / size).max(1),
    _ => 1,
  }
}

/// "See more" style truncation: shows `step` rows and grows by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowLimit {
  step: usize,
  shown: usize,
}

impl Default for RowLimit {
  fn default() -> Self {
    RowLimit::new(5)
  }
}

impl RowLimit {
  pub fn new(step: usize) -> Self {
    RowLimit { step, shown: step }
  }

  pub fn shown(&self) -> usize {
    self.shown
  }

  pub fn step(&self) -> usize {
    self.step
  }

  pub fn more(&mut self) {
    self.shown = self.shown.saturating_add(self.step);
  }

  pub fn all(&mut self, total: usize) {
    self.shown = total.max(self.step);
  }

  pub fn reset(&mut self) {
    self.shown = self.step;
  }

  pub fn has_more(&self, total: usize) -> bool {
    total > self.shown
  }

  pub fn apply<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
    &rows[..self.shown.min(rows.len())]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_paginate() {
    let rows: Vec<u32> = (0..7).collect();
    assert_eq!(paginate(&rows, 0, PageSize::Rows(3)), &[0, 1, 2]);
    assert_eq!(paginate(&rows, 2, PageSize::Rows(3)), &[6]);
    assert!(paginate(&rows, 3, PageSize::Rows(3)).is_empty());
    assert_eq!(paginate(&rows, 0, PageSize::All).len(), 7);
    assert!(paginate(&rows, 1, PageSize::All).is_empty());
    assert!(paginate(&rows, usize::MAX, PageSize::Rows(3)).is_empty());
  }

  #[test]
  fn test_page_length_formula() {
    let rows: Vec<u32> = (0..23).collect();
    for size in 1..=10 {
      for page in 0..30 {
        let expected = size.min(rows.len().saturating_sub(page * size));
        assert_eq!(paginate(&rows, page, PageSize::Rows(size)).len(), expected);
      }
    }
  }

  #[test]
  fn test_page_count() {
    assert_eq!(page_count(0, PageSize::Rows(10)), 1);
    assert_eq!(page_count(10, PageSize::Rows(10)), 1);
    assert_eq!(page_count(11, PageSize::Rows(10)), 2);
    assert_eq!(page_count(11, PageSize::All), 1);
  }

  #[test]
  fn test_row_limit() {
    let rows: Vec<u32> = (0..12).collect();
    let mut limit = RowLimit::default();
    assert_eq!(limit.apply(&rows).len(), 5);
    assert!(limit.has_more(rows.len()));

    limit.more();
    assert_eq!(limit.apply(&rows).len(), 10);

    limit.all(rows.len());
    assert_eq!(limit.apply(&rows).len(), 12);
    assert!(!limit.has_more(rows.len()));

    limit.reset();
    assert_eq!(limit.shown(), 5);
  }
}
