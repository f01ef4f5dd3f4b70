pub mod list_ops;
pub mod session;
pub mod task_ops;
pub mod undo;
