use super::value::{generic_compare, CellValue, Direction};
use crate::{Error, Result};
use std::cmp::Ordering;

pub const DEFAULT_COLUMN_WIDTH: u32 = 150;

/// Raw field lookup for rows, used by columns without an extractor.
pub trait TableRow {
  fn field(&self, key: &str) -> CellValue;
}

/// A column of a table over rows of type `R`.
///
/// `compare` receives present values only and orders them ascending; the
/// table applies the sort direction and keeps missing values last.
pub trait ColumnSpec<R> {
  fn key(&self) -> &str;

  fn label(&self) -> &str;

  fn value(&self, row: &R) -> CellValue;

  fn display(&self, value: &CellValue) -> String {
    value.to_string()
  }

  fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
    generic_compare(a, b)
  }

  fn width(&self) -> u32 {
    DEFAULT_COLUMN_WIDTH
  }

  fn default_direction(&self) -> Direction {
    Direction::Descending
  }
}

pub type Extractor<R> = Box<dyn Fn(&R) -> CellValue + Send + Sync>;
pub type Formatter = Box<dyn Fn(&CellValue) -> String + Send + Sync>;
pub type Comparator = Box<dyn Fn(&CellValue, &CellValue) -> Ordering + Send + Sync>;

/// Declarative column: every behaviour is optional and falls back to the
/// row's raw field, plain display text and [`generic_compare`].
pub struct Column<R> {
  key: String,
  label: String,
  width: u32,
  default_direction: Direction,
  extractor: Option<Extractor<R>>,
  formatter: Option<Formatter>,
  comparator: Option<Comparator>,
}

impl<R> Column<R> {
  pub fn builder(key: impl Into<String>) -> ColumnBuilder<R> {
    ColumnBuilder::new(key)
  }
}

impl<R: TableRow> ColumnSpec<R> for Column<R> {
  fn key(&self) -> &str {
    &self.key
  }

  fn label(&self) -> &str {
    &self.label
  }

  fn value(&self, row: &R) -> CellValue {
    match &self.extractor {
      Some(extractor) => extractor(row),
      None => row.field(&self.key),
    }
  }

  fn display(&self, value: &CellValue) -> String {
    match &self.formatter {
      Some(formatter) => formatter(value),
      None => value.to_string(),
    }
  }

  fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
    match &self.comparator {
      Some(comparator) => comparator(a, b),
      None => generic_compare(a, b),
    }
  }

  fn width(&self) -> u32 {
    self.width
  }

  fn default_direction(&self) -> Direction {
    self.default_direction
  }
}

pub struct ColumnBuilder<R> {
  column: Column<R>,
}

impl<R> ColumnBuilder<R> {
  pub fn new(key: impl Into<String>) -> Self {
    let key = key.into();
    ColumnBuilder {
      column: Column {
        label: key.clone(),
        key,
        width: DEFAULT_COLUMN_WIDTH,
        default_direction: Direction::Descending,
        extractor: None,
        formatter: None,
        comparator: None,
      },
    }
  }

  pub fn label(mut self, label: impl Into<String>) -> Self {
    self.column.label = label.into();
    self
  }

  pub fn width(mut self, width: u32) -> Self {
    self.column.width = width;
    self
  }

  pub fn default_direction(mut self, direction: Direction) -> Self {
    self.column.default_direction = direction;
    self
  }

  pub fn value<F>(mut self, extractor: F) -> Self
  where
    F: Fn(&R) -> CellValue + Send + Sync + 'static,
  {
    self.column.extractor = Some(Box::new(extractor));
    self
  }

  pub fn display<F>(mut self, formatter: F) -> Self
  where
    F: Fn(&CellValue) -> String + Send + Sync + 'static,
  {
    self.column.formatter = Some(Box::new(formatter));
    self
  }

  pub fn comparator<F>(mut self, comparator: F) -> Self
  where
    F: Fn(&CellValue, &CellValue) -> Ordering + Send + Sync + 'static,
  {
    self.column.comparator = Some(Box::new(comparator));
    self
  }

  pub fn build(self) -> Column<R> {
    self.column
  }
}

pub type BoxedColumn<R> = Box<dyn ColumnSpec<R> + Send + Sync>;

/// Ordered set of columns, looked up by key.
pub struct ColumnRegistry<R> {
  columns: Vec<BoxedColumn<R>>,
}

impl<R> Default for ColumnRegistry<R> {
  fn default() -> Self {
    ColumnRegistry {
      columns: Vec::new(),
    }
  }
}

impl<R> ColumnRegistry<R> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a column, replacing any column with the same key in place.
  pub fn column<C>(mut self, column: C) -> Self
  where
    C: ColumnSpec<R> + Send + Sync + 'static,
  {
    let column: BoxedColumn<R> = Box::new(column);
    match self.columns.iter().position(|c| c.key() == column.key()) {
      Some(index) => self.columns[index] = column,
      None => self.columns.push(column),
    }
    self
  }

  pub fn get(&self, key: &str) -> Option<&(dyn ColumnSpec<R> + Send + Sync)> {
    self
      .columns
      .iter()
      .find(|column| column.key() == key)
      .map(|column| column.as_ref())
  }

  pub fn require(&self, key: &str) -> Result<&(dyn ColumnSpec<R> + Send + Sync)> {
    self.get(key).ok_or_else(|| Error::unknown_column(key))
  }

  pub fn iter(&self) -> impl Iterator<Item = &(dyn ColumnSpec<R> + Send + Sync)> {
    self.columns.iter().map(|column| column.as_ref())
  }

  pub fn keys(&self) -> Vec<&str> {
    self.columns.iter().map(|column| column.key()).collect()
  }

  pub fn len(&self) -> usize {
    self.columns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.columns.is_empty()
  }
}
