pub mod task;
pub mod list;
pub mod document;
pub mod config;

pub use task::*;
pub use list::*;
pub use document::*;
pub use config::*;
