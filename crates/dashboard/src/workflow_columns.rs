use crate::{elapsed_millis, CellValue, Column, ColumnRegistry, TableRow, Time, WorkflowSummary};

const LABEL_PREFIX: &str = "labels.";

fn duration(from: Option<Time>, to: Option<Time>) -> CellValue {
  match (from, to) {
    (Some(from), Some(to)) => CellValue::Duration(elapsed_millis(&from, &to)),
    _ => CellValue::Missing,
  }
}

impl TableRow for WorkflowSummary {
  /// Raw fields by wire name; `labels.<key>` reads a single label.
  fn field(&self, key: &str) -> CellValue {
    match key {
      "id" => CellValue::from(self.id.as_str()),
      "name" => CellValue::from(self.name.clone()),
      "submission" => CellValue::from(self.submission_time()),
      "start" => CellValue::from(self.start_time()),
      "end" => CellValue::from(self.end_time()),
      "status" => CellValue::from(self.status.clone()),
      "metadataArchiveStatus" => CellValue::from(self.metadata_archive_status.clone()),
      "waiting" => duration(self.submission_time(), self.start_time()),
      "elapse" => duration(self.start_time(), self.end_time()),
      _ => match key.strip_prefix(LABEL_PREFIX) {
        Some(label) => CellValue::from(
          self
            .labels
            .as_ref()
            .and_then(|labels| labels.get(label))
            .cloned(),
        ),
        None => CellValue::Missing,
      },
    }
  }
}

/// Columns of the workflow list, in display order.
pub fn workflow_columns() -> ColumnRegistry<WorkflowSummary> {
  ColumnRegistry::new()
    .column(Column::builder("id").label("ID").width(200).build())
    .column(Column::builder("name").label("Name").build())
    .column(Column::builder("submission").label("Submitted").build())
    .column(Column::builder("waiting").label("Waited").build())
    .column(Column::builder("start").label("Start").build())
    .column(Column::builder("end").label("End").build())
    .column(Column::builder("elapse").label("Elapse").build())
    .column(Column::builder("status").label("Status").build())
    .column(
      Column::builder("metadataArchiveStatus")
        .label("Metadata Archive")
        .build(),
    )
}
