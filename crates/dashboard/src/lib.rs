mod chart;
mod distiller;
mod labels;
mod status;
mod submission;
mod table;
mod types;
mod workflow_columns;

pub use chart::*;
pub use distiller::*;
pub use labels::*;
pub use status::*;
pub use submission::*;
pub use table::*;
pub use types::*;
pub use workflow_columns::*;
