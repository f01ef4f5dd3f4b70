use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::document::Document;
use crate::model::task::Task;
use crate::util::ids::fresh_id;

/// Error type for task operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("no list selected: create or select a list first")]
    NoActiveList,
}

/// A task removed from a list, with enough context to put it back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTask {
    /// List the task was removed from
    pub list_id: String,
    pub task: Task,
    /// Position it held before removal
    pub original_index: usize,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Append a task to the active list, with an id outside `reserved`.
/// Returns the new task id, or None if the trimmed text is empty.
pub fn add_task(
    doc: &mut Document,
    text: &str,
    reserved: &[&str],
) -> Result<Option<String>, TaskError> {
    if doc.active_list().is_none() {
        return Err(TaskError::NoActiveList);
    }
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let id = fresh_id(doc, reserved);
    let list = doc.active_list_mut().ok_or(TaskError::NoActiveList)?;
    list.tasks.push(Task::new(id.clone(), text.to_string()));
    debug!("task added id={} list={}", id, list.id);
    Ok(Some(id))
}

/// Flip a task's done flag.
pub fn toggle_done(doc: &mut Document, task_id: &str) -> bool {
    let Some(task) = doc
        .active_list_mut()
        .and_then(|l| l.find_task_mut(task_id))
    else {
        return false;
    };
    task.done = !task.done;
    true
}

/// Replace a task's text. Blank text keeps the old text.
pub fn edit_task(doc: &mut Document, task_id: &str, new_text: &str) -> bool {
    let new_text = new_text.trim();
    if new_text.is_empty() {
        return false;
    }
    let Some(task) = doc
        .active_list_mut()
        .and_then(|l| l.find_task_mut(task_id))
    else {
        return false;
    };
    task.text = new_text.to_string();
    true
}

/// Remove a task from the active list.
pub fn delete_task(doc: &mut Document, task_id: &str) -> Option<DeletedTask> {
    let list = doc.active_list_mut()?;
    let idx = list.task_index(task_id)?;
    let task = list.tasks.remove(idx);
    debug!("task deleted id={} list={} index={}", task.id, list.id, idx);
    Some(DeletedTask {
        list_id: list.id.clone(),
        task,
        original_index: idx,
    })
}

/// Put a deleted task back into its list at its old position, clamped to
/// the list's current length. False if the list no longer exists.
pub fn restore_task(doc: &mut Document, deleted: &DeletedTask) -> bool {
    let Some(list) = doc.find_list_mut(&deleted.list_id) else {
        return false;
    };
    let idx = deleted.original_index.min(list.tasks.len());
    list.tasks.insert(idx, deleted.task.clone());
    debug!("task restored id={} list={} index={}", deleted.task.id, list.id, idx);
    true
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Move `from_id` to the slot `to_id` occupies. The target index is taken
/// before removal, so dragging down lands just past the target and dragging
/// up lands just before it.
pub fn reorder_task(doc: &mut Document, from_id: &str, to_id: &str) -> bool {
    if from_id == to_id {
        return false;
    }
    let Some(list) = doc.active_list_mut() else {
        return false;
    };
    let (Some(from), Some(to)) = (list.task_index(from_id), list.task_index(to_id)) else {
        return false;
    };
    let moved = list.tasks.remove(from);
    list.tasks.insert(to, moved);
    true
}

/// Move a task to the end of the active list.
pub fn move_task_to_end(doc: &mut Document, task_id: &str) -> bool {
    let Some(list) = doc.active_list_mut() else {
        return false;
    };
    let Some(from) = list.task_index(task_id) else {
        return false;
    };
    let moved = list.tasks.remove(from);
    list.tasks.push(moved);
    true
}
