//! Change notifications emitted after every local write.
//!
//! The presentation layer subscribes via [`TaskTide::change_rx`](crate::TaskTide::change_rx)
//! and refreshes its view when a notification arrives. Notifications carry
//! only the kind of change and the affected id; the authoritative list is
//! re-read through the normal query path.

/// What kind of local write occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Deleted,
    /// The whole list was replaced by a reconciliation pass.
    Reconciled,
}

/// A lightweight event emitted after a write to the local task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    /// The affected task id, or `None` for whole-list changes.
    pub task_id: Option<i64>,
}

impl ChangeNotification {
    pub fn single(kind: ChangeKind, task_id: i64) -> Self {
        ChangeNotification {
            kind,
            task_id: Some(task_id),
        }
    }

    pub fn reconciled() -> Self {
        ChangeNotification {
            kind: ChangeKind::Reconciled,
            task_id: None,
        }
    }
}
