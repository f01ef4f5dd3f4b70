use serde::{Deserialize, Serialize};

use super::list::List;
use super::task::Task;

/// The persisted root: every list plus the current selection.
///
/// Serialized in camelCase (`{"lists": [...], "activeListId": ...}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Lists in display order
    #[serde(default)]
    pub lists: Vec<List>,
    /// Currently selected list, if any
    #[serde(default)]
    pub active_list_id: Option<String>,
}

impl Document {
    pub fn find_list(&self, list_id: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn find_list_mut(&mut self, list_id: &str) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    /// The list `active_list_id` points at (None if unset or dangling)
    pub fn active_list(&self) -> Option<&List> {
        let id = self.active_list_id.as_deref()?;
        self.find_list(id)
    }

    pub fn active_list_mut(&mut self) -> Option<&mut List> {
        let id = self.active_list_id.clone()?;
        self.find_list_mut(&id)
    }

    /// Whether any list or task already uses `id`
    pub fn contains_id(&self, id: &str) -> bool {
        self.lists
            .iter()
            .any(|l| l.id == id || l.tasks.iter().any(|t| t.id == id))
    }

    /// Find a task anywhere in the document, with the id of its list
    pub fn find_task(&self, task_id: &str) -> Option<(&str, &Task)> {
        self.lists
            .iter()
            .find_map(|l| l.find_task(task_id).map(|t| (l.id.as_str(), t)))
    }

    /// Selection invariant: no lists ⇔ no selection, otherwise the selection
    /// names an existing list.
    pub fn is_consistent(&self) -> bool {
        match &self.active_list_id {
            None => self.lists.is_empty(),
            Some(id) => self.find_list(id).is_some(),
        }
    }
}
