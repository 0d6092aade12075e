use super::column::ColumnSpec;
use super::value::{CellValue, Direction};
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Orders `rows` by `column`.
///
/// Each value is extracted once. Missing values go last in either
/// direction, and rows that compare equal keep their input order.
pub fn sort_rows<R, T, C>(rows: Vec<T>, column: &C, direction: Direction) -> Vec<T>
where
  T: Borrow<R>,
  C: ColumnSpec<R> + ?Sized,
{
  let mut decorated: Vec<(CellValue, usize, T)> = rows
    .into_iter()
    .enumerate()
    .map(|(index, row)| (column.value(row.borrow()), index, row))
    .collect();

  decorated.sort_by(|(a, a_index, _), (b, b_index, _)| {
    let ordering = match (a.is_missing(), b.is_missing()) {
      (true, true) => Ordering::Equal,
      (true, false) => Ordering::Greater,
      (false, true) => Ordering::Less,
      (false, false) => direction.apply(column.compare(a, b)),
    };
    ordering.then(a_index.cmp(b_index))
  });

  decorated.into_iter().map(|(_, _, row)| row).collect()
}
