mod column;
mod filter;
mod paginate;
mod sort;
mod state;
mod value;

pub use column::*;
pub use filter::*;
pub use paginate::*;
pub use sort::*;
pub use state::*;
pub use value::*;
