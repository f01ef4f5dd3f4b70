use serde::{Deserialize, Serialize};

use super::task::Task;

/// A named, ordered list of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// Opaque unique id, fixed at creation
    pub id: String,
    /// Display name (never blank)
    pub name: String,
    /// Tasks in display order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl List {
    /// Create an empty list
    pub fn new(id: String, name: String) -> Self {
        List {
            id,
            name,
            tasks: Vec::new(),
        }
    }

    /// Position of a task within this list
    pub fn task_index(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn find_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Number of completed tasks
    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.done).count()
    }
}
