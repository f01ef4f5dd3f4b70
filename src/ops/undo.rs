//! Single-slot undo for task deletion.
//!
//! The slot holds at most one deleted task together with the instant it
//! expires. Recording a new deletion replaces whatever was pending; there is
//! no history. Expiry is driven by whoever owns the clock: `poll` is the
//! timer callback, and `take` refuses an entry whose deadline has passed, so
//! a restore can never race an expiry.

use chrono::{DateTime, TimeDelta, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use super::task_ops::DeletedTask;

/// Default time a deleted task stays recoverable
pub const UNDO_TIMEOUT_MS: u64 = 6000;

/// A recoverable deletion and its deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUndo {
    pub entry: DeletedTask,
    pub expires_at: DateTime<Utc>,
}

impl PendingUndo {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UndoBuffer {
    #[default]
    Empty,
    Holding(PendingUndo),
}

impl UndoBuffer {
    pub fn new() -> Self {
        UndoBuffer::Empty
    }

    /// Hold `entry` until `now + delay_ms`. Returns the entry it displaced, if any.
    pub fn record(
        &mut self,
        entry: DeletedTask,
        delay_ms: u64,
        now: DateTime<Utc>,
    ) -> Option<DeletedTask> {
        let delay = TimeDelta::milliseconds(i64::try_from(delay_ms).unwrap_or(i64::MAX));
        let expires_at = now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC);
        info!(
            "undo armed task={} list={} index={} expires_at={}",
            entry.task.id, entry.list_id, entry.original_index, expires_at
        );
        let displaced = self.dismiss();
        *self = UndoBuffer::Holding(PendingUndo { entry, expires_at });
        displaced
    }

    /// Fire the expiry if its deadline has passed. Returns the entry that
    /// was dropped.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<DeletedTask> {
        if !matches!(self, UndoBuffer::Holding(pending) if pending.is_expired(now)) {
            return None;
        }
        let expired = self.dismiss();
        if let Some(entry) = &expired {
            info!("undo expired task={}", entry.task.id);
        }
        expired
    }

    /// Take the pending entry for restoration. None if empty or expired.
    pub fn take(&mut self, now: DateTime<Utc>) -> Option<DeletedTask> {
        self.poll(now);
        self.dismiss()
    }

    /// Drop the pending entry without restoring it.
    pub fn dismiss(&mut self) -> Option<DeletedTask> {
        match std::mem::take(self) {
            UndoBuffer::Holding(pending) => Some(pending.entry),
            UndoBuffer::Empty => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingUndo> {
        match self {
            UndoBuffer::Holding(pending) => Some(pending),
            UndoBuffer::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, UndoBuffer::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Task;
    use crate::util::clock::{Clock, ManualClock};

    fn deleted(text: &str, index: usize) -> DeletedTask {
        DeletedTask {
            list_id: "l1".into(),
            task: Task::new(format!("id-{}", text), text.into()),
            original_index: index,
        }
    }

    #[test]
    fn record_then_take() {
        let clock = ManualClock::default();
        let mut undo = UndoBuffer::new();
        assert!(undo.record(deleted("Eggs", 1), 6000, clock.now()).is_none());
        assert!(!undo.is_empty());

        clock.advance_ms(5999);
        assert_eq!(undo.take(clock.now()), Some(deleted("Eggs", 1)));
        assert!(undo.is_empty());
        assert_eq!(undo.take(clock.now()), None);
    }

    #[test]
    fn expires_at_deadline() {
        let clock = ManualClock::default();
        let mut undo = UndoBuffer::new();
        undo.record(deleted("Eggs", 1), 6000, clock.now());

        clock.advance_ms(5999);
        assert!(undo.poll(clock.now()).is_none());
        clock.advance_ms(1);
        assert_eq!(undo.poll(clock.now()), Some(deleted("Eggs", 1)));
        assert!(undo.is_empty());
    }

    #[test]
    fn take_after_deadline_without_poll() {
        let clock = ManualClock::default();
        let mut undo = UndoBuffer::new();
        undo.record(deleted("Eggs", 1), 100, clock.now());
        clock.advance_ms(250);
        assert!(undo.take(clock.now()).is_none());
        assert!(undo.is_empty());
    }

    #[test]
    fn new_record_supersedes_and_restarts_timer() {
        let clock = ManualClock::default();
        let mut undo = UndoBuffer::new();
        undo.record(deleted("Eggs", 1), 6000, clock.now());
        clock.advance_ms(4000);
        let displaced = undo.record(deleted("Milk", 0), 6000, clock.now());
        assert_eq!(displaced, Some(deleted("Eggs", 1)));

        // the first deadline passing does nothing to the second entry
        clock.advance_ms(3000);
        assert!(undo.poll(clock.now()).is_none());
        assert_eq!(undo.take(clock.now()), Some(deleted("Milk", 0)));
    }

    #[test]
    fn dismiss_empties() {
        let clock = ManualClock::default();
        let mut undo = UndoBuffer::new();
        assert!(undo.dismiss().is_none());
        undo.record(deleted("Eggs", 1), 6000, clock.now());
        assert_eq!(undo.dismiss(), Some(deleted("Eggs", 1)));
        assert!(undo.take(clock.now()).is_none());
    }

    #[test]
    fn zero_delay_expires_immediately() {
        let clock = ManualClock::default();
        let mut undo = UndoBuffer::new();
        undo.record(deleted("Eggs", 1), 0, clock.now());
        assert!(undo.take(clock.now()).is_none());
    }

    #[test]
    fn serde_tagged_states() {
        let empty = serde_json::to_value(UndoBuffer::Empty).unwrap();
        assert_eq!(empty, serde_json::json!({"state": "empty"}));

        let clock = ManualClock::default();
        let mut undo = UndoBuffer::new();
        undo.record(deleted("Eggs", 1), 6000, clock.now());
        let json = serde_json::to_string(&undo).unwrap();
        let back: UndoBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, undo);
        assert_eq!(back.pending().unwrap().entry.original_index, 1);
    }
}
