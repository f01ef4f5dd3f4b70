//! Named task lists kept in a single persisted document.
//!
//! [`io::store::StateStore`] owns the document and is the only way to change
//! it; [`ops::session::Session`] adds the single-slot undo and a dispatcher
//! over [`ops::session::Operation`]. The `tl` binary in `cli` is one input
//! surface over that core.

pub mod cli;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod util;

pub use io::store::{StateStore, StoreError};
pub use io::substrate::{FileSubstrate, MemorySubstrate, Substrate, SubstrateError};
pub use model::{Document, List, Task};
pub use ops::session::{Operation, Outcome, Session};
pub use ops::task_ops::{DeletedTask, TaskError};
pub use ops::undo::{UNDO_TIMEOUT_MS, UndoBuffer};
pub use util::clock::{Clock, ManualClock, SystemClock};
