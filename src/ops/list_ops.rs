use log::{debug, warn};

use crate::model::document::Document;
use crate::model::list::List;
use crate::util::ids::fresh_id;

// Every function here mutates the document in place and reports whether
// anything changed. Persisting is the caller's job (see `io::store`).

/// Create a list, append it and make it active. The new id avoids
/// `reserved` as well as every id in the document.
/// Returns the new list's id, or None if the trimmed name is empty.
pub fn create_list(doc: &mut Document, name: &str, reserved: &[&str]) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let id = fresh_id(doc, reserved);
    doc.lists.push(List::new(id.clone(), name.to_string()));
    doc.active_list_id = Some(id.clone());
    debug!("list created id={} name={:?}", id, name);
    Some(id)
}

/// Rename a list. A blank name keeps the old one.
pub fn rename_list(doc: &mut Document, list_id: &str, new_name: &str) -> bool {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return false;
    }
    let Some(list) = doc.find_list_mut(list_id) else {
        return false;
    };
    list.name = new_name.to_string();
    true
}

/// Remove a list with all its tasks. When the active list goes away the
/// selection moves to the first remaining list (or none).
pub fn delete_list(doc: &mut Document, list_id: &str) -> Option<List> {
    let idx = doc.lists.iter().position(|l| l.id == list_id)?;
    let removed = doc.lists.remove(idx);
    if doc.active_list_id.as_deref() == Some(list_id) {
        doc.active_list_id = doc.lists.first().map(|l| l.id.clone());
    }
    debug!(
        "list deleted id={} tasks={} active={:?}",
        list_id,
        removed.tasks.len(),
        doc.active_list_id
    );
    Some(removed)
}

/// Select a list. The id is taken as given.
pub fn set_active_list(doc: &mut Document, list_id: &str) {
    if doc.find_list(list_id).is_none() {
        warn!("selecting unknown list id={}", list_id);
    }
    doc.active_list_id = Some(list_id.to_string());
}

/// Repair an unset or dangling selection by pointing it at the first list.
/// Returns true if the selection changed.
pub fn ensure_active_consistent(doc: &mut Document) -> bool {
    if doc.active_list().is_some() {
        return false;
    }
    let Some(first) = doc.lists.first() else {
        if doc.active_list_id.is_some() {
            doc.active_list_id = None;
            return true;
        }
        return false;
    };
    doc.active_list_id = Some(first.id.clone());
    true
}
