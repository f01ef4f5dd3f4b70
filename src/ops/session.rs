//! A running session: the store, the undo slot and a clock behind one
//! dispatcher.
//!
//! Input surfaces translate their gestures into [`Operation`] values and
//! hand them to [`Session::dispatch`]; each call runs to completion and
//! leaves the document persisted. The host's event loop calls
//! [`Session::tick`] so a pending undo expires on time.

use log::info;
use serde::{Deserialize, Serialize};

use crate::io::store::{StateStore, StoreError};
use crate::io::substrate::Substrate;
use crate::model::document::Document;
use crate::model::task::Task;
use crate::ops::task_ops::DeletedTask;
use crate::ops::undo::{UNDO_TIMEOUT_MS, UndoBuffer};
use crate::util::clock::Clock;

/// Every request the core accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreateList { name: String },
    RenameList { id: String, name: String },
    DeleteList { id: String },
    SelectList { id: String },
    /// Wipe every list and the stored document
    ClearAll,
    AddTask { text: String },
    ToggleTask { id: String },
    EditTask { id: String, text: String },
    DeleteTask { id: String },
    /// Drop `from` onto `to`
    ReorderTask { from: String, to: String },
    /// Drop onto the list background
    MoveTaskToEnd { id: String },
    Undo,
    DismissUndo,
}

/// What a dispatched operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed (blank input, unknown id, empty undo slot, ...)
    Unchanged,
    /// The document changed
    Updated,
    ListCreated { id: String },
    TaskAdded { id: String },
    /// The task left its list and is recoverable until the undo expires
    TaskDeleted { task: Task },
    TaskRestored { task: Task },
}

impl Outcome {
    fn updated(changed: bool) -> Self {
        if changed {
            Outcome::Updated
        } else {
            Outcome::Unchanged
        }
    }
}

pub struct Session<S: Substrate, C: Clock> {
    store: StateStore<S>,
    undo: UndoBuffer,
    clock: C,
    undo_timeout_ms: u64,
}

impl<S: Substrate, C: Clock> Session<S, C> {
    pub fn new(store: StateStore<S>, clock: C) -> Self {
        Session {
            store,
            undo: UndoBuffer::new(),
            clock,
            undo_timeout_ms: UNDO_TIMEOUT_MS,
        }
    }

    pub fn with_undo_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.undo_timeout_ms = timeout_ms;
        self
    }

    /// Resume with an undo slot carried over from an earlier run. An entry
    /// whose deadline already passed is dropped.
    pub fn with_undo(mut self, undo: UndoBuffer) -> Self {
        self.undo = undo;
        self.tick();
        self
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn undo_buffer(&self) -> &UndoBuffer {
        &self.undo
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_parts(self) -> (StateStore<S>, UndoBuffer) {
        (self.store, self.undo)
    }

    /// Expire the pending undo if its deadline has passed.
    pub fn tick(&mut self) -> Option<DeletedTask> {
        self.undo.poll(self.clock.now())
    }

    /// Apply one operation.
    pub fn dispatch(&mut self, op: Operation) -> Result<Outcome, StoreError> {
        self.tick();
        let outcome = match op {
            Operation::CreateList { name } => {
                let reserved = pending_ids(&self.undo);
                match self.store.create_list(&name, &reserved)? {
                    Some(id) => Outcome::ListCreated { id },
                    None => Outcome::Unchanged,
                }
            }
            Operation::RenameList { id, name } => {
                Outcome::updated(self.store.rename_list(&id, &name)?)
            }
            Operation::DeleteList { id } => {
                Outcome::updated(self.store.delete_list(&id)?.is_some())
            }
            Operation::SelectList { id } => {
                self.store.set_active_list(&id)?;
                Outcome::Updated
            }
            Operation::ClearAll => {
                self.store.clear_all()?;
                self.undo.dismiss();
                Outcome::Updated
            }
            Operation::AddTask { text } => {
                let reserved = pending_ids(&self.undo);
                match self.store.add_task(&text, &reserved)? {
                    Some(id) => Outcome::TaskAdded { id },
                    None => Outcome::Unchanged,
                }
            }
            Operation::ToggleTask { id } => Outcome::updated(self.store.toggle_done(&id)?),
            Operation::EditTask { id, text } => {
                Outcome::updated(self.store.edit_task(&id, &text)?)
            }
            Operation::DeleteTask { id } => match self.delete_task(&id)? {
                Some(task) => Outcome::TaskDeleted { task },
                None => Outcome::Unchanged,
            },
            Operation::ReorderTask { from, to } => {
                Outcome::updated(self.store.reorder_task(&from, &to)?)
            }
            Operation::MoveTaskToEnd { id } => {
                Outcome::updated(self.store.move_task_to_end(&id)?)
            }
            Operation::Undo => match self.restore()? {
                Some(task) => Outcome::TaskRestored { task },
                None => Outcome::Unchanged,
            },
            Operation::DismissUndo => Outcome::updated(self.dismiss()),
        };
        Ok(outcome)
    }

    /// Delete a task and arm the undo slot with it, replacing any earlier
    /// pending deletion. Returns the removed task.
    pub fn delete_task(&mut self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let Some(deleted) = self.store.delete_task(task_id)? else {
            return Ok(None);
        };
        let task = deleted.task.clone();
        if let Some(lost) = self
            .undo
            .record(deleted, self.undo_timeout_ms, self.clock.now())
        {
            info!("undo superseded task={}", lost.task.id);
        }
        Ok(Some(task))
    }

    /// Put the pending deleted task back. None if nothing is pending, the
    /// entry expired, or its list is gone (the task is then lost).
    /// The slot is only emptied once the restore has been written, so a
    /// failed write leaves the deletion recoverable.
    pub fn restore(&mut self) -> Result<Option<Task>, StoreError> {
        self.tick();
        let Some(entry) = self.undo.pending().map(|p| p.entry.clone()) else {
            return Ok(None);
        };
        let restored = self.store.restore_task(&entry)?;
        self.undo.dismiss();
        if !restored {
            info!(
                "undo dropped task={}: list {} no longer exists",
                entry.task.id, entry.list_id
            );
            return Ok(None);
        }
        Ok(Some(entry.task))
    }

    /// Forget the pending deletion. True if there was one.
    pub fn dismiss(&mut self) -> bool {
        self.undo.dismiss().is_some()
    }
}

/// Ids a restore could bring back, kept out of newly minted ids.
fn pending_ids(undo: &UndoBuffer) -> Vec<&str> {
    undo.pending()
        .map(|p| vec![p.entry.task.id.as_str()])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::substrate::{MemorySubstrate, SubstrateError};
    use crate::util::clock::ManualClock;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const KEY: &str = "multiTodo_v1";

    fn session() -> Session<MemorySubstrate, ManualClock> {
        let store = StateStore::open(MemorySubstrate::new(), KEY).unwrap();
        Session::new(store, ManualClock::default())
    }

    fn add(session: &mut Session<MemorySubstrate, ManualClock>, text: &str) -> String {
        match session
            .dispatch(Operation::AddTask { text: text.into() })
            .unwrap()
        {
            Outcome::TaskAdded { id } => id,
            other => panic!("expected TaskAdded, got {:?}", other),
        }
    }

    fn texts(session: &Session<MemorySubstrate, ManualClock>) -> Vec<String> {
        session
            .document()
            .active_list()
            .map(|l| l.tasks.iter().map(|t| t.text.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn groceries_delete_and_undo() {
        let mut s = session();
        s.dispatch(Operation::CreateList {
            name: "Groceries".into(),
        })
        .unwrap();
        add(&mut s, "Milk");
        let eggs = add(&mut s, "Eggs");
        add(&mut s, "Bread");

        let outcome = s.dispatch(Operation::DeleteTask { id: eggs }).unwrap();
        assert!(matches!(outcome, Outcome::TaskDeleted { ref task } if task.text == "Eggs"));
        assert_eq!(texts(&s), vec!["Milk", "Bread"]);
        let pending = s.undo_buffer().pending().unwrap();
        assert_eq!(pending.entry.task.text, "Eggs");
        assert_eq!(pending.entry.original_index, 1);

        let outcome = s.dispatch(Operation::Undo).unwrap();
        assert!(matches!(outcome, Outcome::TaskRestored { ref task } if task.text == "Eggs"));
        assert_eq!(texts(&s), vec!["Milk", "Eggs", "Bread"]);

        // second undo finds nothing
        assert_eq!(s.dispatch(Operation::Undo).unwrap(), Outcome::Unchanged);
        assert_eq!(texts(&s), vec!["Milk", "Eggs", "Bread"]);
    }

    #[test]
    fn undo_after_expiry_is_noop() {
        let mut s = session().with_undo_timeout_ms(1000);
        s.dispatch(Operation::CreateList { name: "L".into() }).unwrap();
        let a = add(&mut s, "a");
        s.dispatch(Operation::DeleteTask { id: a }).unwrap();

        s.clock().advance_ms(1000);
        assert_eq!(s.tick().map(|e| e.task.text), Some("a".to_string()));
        assert_eq!(s.dispatch(Operation::Undo).unwrap(), Outcome::Unchanged);
        assert!(texts(&s).is_empty());
    }

    #[test]
    fn second_delete_supersedes_first() {
        let mut s = session();
        s.dispatch(Operation::CreateList { name: "L".into() }).unwrap();
        let a = add(&mut s, "a");
        let b = add(&mut s, "b");
        s.dispatch(Operation::DeleteTask { id: a }).unwrap();
        s.dispatch(Operation::DeleteTask { id: b }).unwrap();

        s.dispatch(Operation::Undo).unwrap();
        assert_eq!(texts(&s), vec!["b"]);
        assert_eq!(s.dispatch(Operation::Undo).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn undo_into_deleted_list_loses_task() {
        let mut s = session();
        s.dispatch(Operation::CreateList { name: "L".into() }).unwrap();
        let list_id = s.document().active_list_id.clone().unwrap();
        let a = add(&mut s, "a");
        s.dispatch(Operation::DeleteTask { id: a }).unwrap();
        s.dispatch(Operation::DeleteList { id: list_id }).unwrap();

        assert_eq!(s.dispatch(Operation::Undo).unwrap(), Outcome::Unchanged);
        assert!(s.undo_buffer().is_empty());
        assert_eq!(s.document(), &Document::default());
    }

    #[test]
    fn restore_goes_to_origin_list_even_if_inactive() {
        let mut s = session();
        s.dispatch(Operation::CreateList { name: "A".into() }).unwrap();
        let a_id = s.document().active_list_id.clone().unwrap();
        let x = add(&mut s, "x");
        s.dispatch(Operation::DeleteTask { id: x }).unwrap();
        s.dispatch(Operation::CreateList { name: "B".into() }).unwrap();

        s.dispatch(Operation::Undo).unwrap();
        assert!(texts(&s).is_empty());
        assert_eq!(s.document().find_list(&a_id).unwrap().tasks.len(), 1);
    }

    #[test]
    fn dismiss_forgets_deletion() {
        let mut s = session();
        s.dispatch(Operation::CreateList { name: "L".into() }).unwrap();
        let a = add(&mut s, "a");
        s.dispatch(Operation::DeleteTask { id: a }).unwrap();
        assert_eq!(s.dispatch(Operation::DismissUndo).unwrap(), Outcome::Updated);
        assert_eq!(s.dispatch(Operation::DismissUndo).unwrap(), Outcome::Unchanged);
        assert_eq!(s.dispatch(Operation::Undo).unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn add_without_list_reports_no_active_list() {
        let mut s = session();
        let err = s
            .dispatch(Operation::AddTask { text: "Milk".into() })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no list selected: create or select a list first"
        );
    }

    #[test]
    fn clear_all_resets_everything() {
        let mut s = session();
        s.dispatch(Operation::CreateList { name: "L".into() }).unwrap();
        let a = add(&mut s, "a");
        s.dispatch(Operation::DeleteTask { id: a }).unwrap();
        s.dispatch(Operation::ClearAll).unwrap();
        assert_eq!(s.document(), &Document::default());
        assert!(s.undo_buffer().is_empty());
        assert!(s.store().substrate().raw(KEY).is_none());
    }

    #[test]
    fn resumed_undo_respects_deadline() {
        let mut s = session();
        s.dispatch(Operation::CreateList { name: "L".into() }).unwrap();
        let a = add(&mut s, "a");
        s.dispatch(Operation::DeleteTask { id: a }).unwrap();
        let (store, undo) = s.into_parts();

        let clock = ManualClock::default();
        clock.advance_ms(UNDO_TIMEOUT_MS + 1);
        let resumed = Session::new(store, clock).with_undo(undo);
        assert!(resumed.undo_buffer().is_empty());
    }

    /// Refuses writes while `fail_writes` is set.
    #[derive(Default)]
    struct FlakySubstrate {
        inner: MemorySubstrate,
        fail_writes: bool,
    }

    impl Substrate for FlakySubstrate {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> Result<(), SubstrateError> {
            if self.fail_writes {
                return Err(SubstrateError::Io {
                    path: PathBuf::from(key),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), SubstrateError> {
            self.inner.remove(key)
        }
    }

    fn set_writes_failing(
        s: Session<FlakySubstrate, ManualClock>,
        fail: bool,
    ) -> Session<FlakySubstrate, ManualClock> {
        let (mut store, undo) = s.into_parts();
        store.substrate_mut().fail_writes = fail;
        Session::new(store, ManualClock::default()).with_undo(undo)
    }

    #[test]
    fn failed_restore_write_keeps_deletion_recoverable() {
        let store = StateStore::open(FlakySubstrate::default(), KEY).unwrap();
        let mut s = Session::new(store, ManualClock::default());
        s.dispatch(Operation::CreateList {
            name: "Groceries".into(),
        })
        .unwrap();
        let Outcome::TaskAdded { id: eggs } = s
            .dispatch(Operation::AddTask {
                text: "Eggs".into(),
            })
            .unwrap()
        else {
            panic!("Eggs not added");
        };
        s.dispatch(Operation::DeleteTask { id: eggs.clone() })
            .unwrap();

        let mut s = set_writes_failing(s, true);
        assert!(s.dispatch(Operation::Undo).is_err());
        assert!(s.document().active_list().unwrap().tasks.is_empty());
        assert_eq!(
            s.undo_buffer().pending().map(|p| p.entry.task.id.clone()),
            Some(eggs.clone())
        );

        let mut s = set_writes_failing(s, false);
        let outcome = s.dispatch(Operation::Undo).unwrap();
        assert!(matches!(outcome, Outcome::TaskRestored { ref task } if task.id == eggs));
        assert!(s.undo_buffer().is_empty());
    }

    #[test]
    fn pending_task_id_is_reserved() {
        let mut s = session();
        s.dispatch(Operation::CreateList { name: "L".into() }).unwrap();
        let a = add(&mut s, "a");
        assert!(pending_ids(s.undo_buffer()).is_empty());

        s.dispatch(Operation::DeleteTask { id: a.clone() }).unwrap();
        assert_eq!(pending_ids(s.undo_buffer()), vec![a.as_str()]);

        s.dispatch(Operation::Undo).unwrap();
        assert!(pending_ids(s.undo_buffer()).is_empty());
    }

    #[test]
    fn operations_read_from_json() {
        let op: Operation =
            serde_json::from_str(r#"{"op":"reorder_task","from":"a","to":"b"}"#).unwrap();
        assert_eq!(
            op,
            Operation::ReorderTask {
                from: "a".into(),
                to: "b".into()
            }
        );
        let op: Operation = serde_json::from_str(r#"{"op":"undo"}"#).unwrap();
        assert_eq!(op, Operation::Undo);
    }
}
