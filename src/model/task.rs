use serde::{Deserialize, Serialize};

/// A single entry in a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique id, fixed at creation
    pub id: String,
    /// Display text (never blank)
    pub text: String,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Create an open task with the given id and text
    pub fn new(id: String, text: String) -> Self {
        Task {
            id,
            text,
            done: false,
        }
    }
}
