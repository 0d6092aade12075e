mod error;
mod lenient;
mod metadata;
mod summary;
mod time;

pub use error::*;
pub use metadata::*;
pub use summary::*;
pub use time::*;
