mod api;
mod client;
mod config;
mod error;
mod guard;
mod loader;

pub use api::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use guard::*;
pub use loader::*;
