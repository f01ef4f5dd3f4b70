use log::{debug, warn};

use crate::io::substrate::{Substrate, SubstrateError};
use crate::model::document::Document;
use crate::model::list::List;
use crate::ops::list_ops;
use crate::ops::task_ops::{self, DeletedTask, TaskError};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("storage error: {0}")]
    Substrate(#[from] SubstrateError),
    #[error("could not encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read the document stored under `key`. Missing, unreadable or malformed
/// values all come back as the empty document.
pub fn load_document<S: Substrate>(substrate: &S, key: &str) -> Document {
    let bytes = match substrate.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Document::default(),
        Err(e) => {
            warn!("could not read stored document key={}: {}", key, e);
            return Document::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("stored document is malformed key={}: {}", key, e);
            Document::default()
        }
    }
}

/// Owner of the document and the only way to change it.
///
/// Every mutating method applies its change to a working copy, writes that
/// copy to the substrate, and only then makes it the live document. A failed
/// write leaves the live document untouched. Calls that change nothing do
/// not write.
#[derive(Debug)]
pub struct StateStore<S: Substrate> {
    substrate: S,
    key: String,
    doc: Document,
}

impl<S: Substrate> StateStore<S> {
    /// Load the document under `key` and repair a missing or dangling
    /// selection (persisting the repair).
    pub fn open(substrate: S, key: &str) -> Result<Self, StoreError> {
        let doc = load_document(&substrate, key);
        let mut store = StateStore {
            substrate,
            key: key.to_string(),
            doc,
        };
        store.commit(|doc| list_ops::ensure_active_consistent(doc).then_some(()))?;
        Ok(store)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn substrate_mut(&mut self) -> &mut S {
        &mut self.substrate
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Re-read the document from the substrate, discarding in-memory state.
    pub fn reload(&mut self) {
        self.doc = load_document(&self.substrate, &self.key);
    }

    /// Write the live document.
    pub fn save(&mut self) -> Result<(), StoreError> {
        write_document(&mut self.substrate, &self.key, &self.doc)
    }

    fn try_commit<R>(
        &mut self,
        f: impl FnOnce(&mut Document) -> Result<Option<R>, TaskError>,
    ) -> Result<Option<R>, StoreError> {
        let mut draft = self.doc.clone();
        let Some(result) = f(&mut draft)? else {
            return Ok(None);
        };
        write_document(&mut self.substrate, &self.key, &draft)?;
        self.doc = draft;
        Ok(Some(result))
    }

    fn commit<R>(
        &mut self,
        f: impl FnOnce(&mut Document) -> Option<R>,
    ) -> Result<Option<R>, StoreError> {
        self.try_commit(|doc| Ok(f(doc)))
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    /// `reserved` ids are kept out of the new list's id.
    pub fn create_list(
        &mut self,
        name: &str,
        reserved: &[&str],
    ) -> Result<Option<String>, StoreError> {
        self.commit(|doc| list_ops::create_list(doc, name, reserved))
    }

    pub fn rename_list(&mut self, list_id: &str, new_name: &str) -> Result<bool, StoreError> {
        let changed =
            self.commit(|doc| list_ops::rename_list(doc, list_id, new_name).then_some(()))?;
        Ok(changed.is_some())
    }

    pub fn delete_list(&mut self, list_id: &str) -> Result<Option<List>, StoreError> {
        self.commit(|doc| list_ops::delete_list(doc, list_id))
    }

    pub fn set_active_list(&mut self, list_id: &str) -> Result<(), StoreError> {
        self.commit(|doc| {
            list_ops::set_active_list(doc, list_id);
            Some(())
        })?;
        Ok(())
    }

    /// Drop the stored document entirely and start over empty.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.substrate.remove(&self.key)?;
        self.doc = Document::default();
        debug!("document cleared key={}", self.key);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// `reserved` ids are kept out of the new task's id.
    pub fn add_task(
        &mut self,
        text: &str,
        reserved: &[&str],
    ) -> Result<Option<String>, StoreError> {
        self.try_commit(|doc| task_ops::add_task(doc, text, reserved))
    }

    pub fn toggle_done(&mut self, task_id: &str) -> Result<bool, StoreError> {
        let changed = self.commit(|doc| task_ops::toggle_done(doc, task_id).then_some(()))?;
        Ok(changed.is_some())
    }

    pub fn edit_task(&mut self, task_id: &str, new_text: &str) -> Result<bool, StoreError> {
        let changed =
            self.commit(|doc| task_ops::edit_task(doc, task_id, new_text).then_some(()))?;
        Ok(changed.is_some())
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<Option<DeletedTask>, StoreError> {
        self.commit(|doc| task_ops::delete_task(doc, task_id))
    }

    pub fn restore_task(&mut self, deleted: &DeletedTask) -> Result<bool, StoreError> {
        let changed = self.commit(|doc| task_ops::restore_task(doc, deleted).then_some(()))?;
        Ok(changed.is_some())
    }

    pub fn reorder_task(&mut self, from_id: &str, to_id: &str) -> Result<bool, StoreError> {
        let changed =
            self.commit(|doc| task_ops::reorder_task(doc, from_id, to_id).then_some(()))?;
        Ok(changed.is_some())
    }

    pub fn move_task_to_end(&mut self, task_id: &str) -> Result<bool, StoreError> {
        let changed = self.commit(|doc| task_ops::move_task_to_end(doc, task_id).then_some(()))?;
        Ok(changed.is_some())
    }
}

fn write_document<S: Substrate>(
    substrate: &mut S,
    key: &str,
    doc: &Document,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(doc)?;
    substrate.set(key, &bytes)?;
    debug!("document saved key={} lists={}", key, doc.lists.len());
    Ok(())
}
