pub mod config_io;
pub mod lock;
pub mod session_state;
pub mod store;
pub mod substrate;
