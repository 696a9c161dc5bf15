//! The reconciler: the presentation-facing API over the store, the remote
//! source, and the connectivity probe.
//!
//! Each operation is a read-modify-write of the persisted collections,
//! serialized by an internal lock so a delete fired back-to-back with a
//! reconcile cannot interleave. Mutations touch only local state and flag
//! the affected task as not synced; deletions additionally record a
//! tombstone so a later fetch cannot resurrect the task.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::{Mutex, broadcast};

use crate::connectivity::ConnectivityProbe;
use crate::messages::{ChangeKind, ChangeNotification};
use crate::reconcile;
use crate::remote::TaskSource;
use crate::store::{KeyValueStore, StoreError, TaskStore};
use crate::task::Task;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to persist task list: {0}")]
    Store(#[from] StoreError),

    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error("A task with id {0} already exists")]
    DuplicateId(i64),
}

/// Offline-first task list engine.
///
/// Built via [`TaskTideBuilder`]. All methods take `&self`; wrap in an
/// [`Arc`] to share with the presentation layer and the connectivity
/// watcher.
pub struct TaskTide<S> {
    store: TaskStore<S>,
    source: Arc<dyn TaskSource>,
    probe: Arc<dyn ConnectivityProbe>,
    change_tx: broadcast::Sender<ChangeNotification>,
    loading: AtomicBool,
    online: AtomicBool,
    // Serializes each operation's read-modify-write of the stored
    // collections.
    op_lock: Mutex<()>,
}

/// Configures and builds a [`TaskTide`] engine.
pub struct TaskTideBuilder<S> {
    store: S,
    source: Arc<dyn TaskSource>,
    probe: Arc<dyn ConnectivityProbe>,
    channel_capacity: usize,
}

impl<S: KeyValueStore> TaskTideBuilder<S> {
    pub fn new(store: S, source: Arc<dyn TaskSource>, probe: Arc<dyn ConnectivityProbe>) -> Self {
        TaskTideBuilder {
            store,
            source,
            probe,
            channel_capacity: 16,
        }
    }

    /// Capacity of the change-notification broadcast channel.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> TaskTide<S> {
        let (change_tx, _rx) = broadcast::channel(self.channel_capacity);
        TaskTide {
            store: TaskStore::new(self.store),
            source: self.source,
            probe: self.probe,
            change_tx,
            loading: AtomicBool::new(false),
            online: AtomicBool::new(false),
            op_lock: Mutex::new(()),
        }
    }
}

impl<S: KeyValueStore> TaskTide<S> {
    /// Load the authoritative task list, reconciling against the remote
    /// source when connectivity allows.
    ///
    /// Offline (or on fetch failure, which is treated the same way) this
    /// returns the local list unchanged and writes nothing. Online, remote
    /// tasks are tagged as synced, filtered against the tombstone set and
    /// the local ids, appended after the local list, and the merged result
    /// is persisted before being returned.
    pub async fn load_and_reconcile(&self) -> Result<Vec<Task>, SyncError> {
        let _guard = self.op_lock.lock().await;
        self.loading.store(true, Ordering::SeqCst);
        let result = self.reconcile_locked().await;
        self.loading.store(false, Ordering::SeqCst);
        result
    }

    async fn reconcile_locked(&self) -> Result<Vec<Task>, SyncError> {
        let local = self.store.load_tasks().await;
        let deleted = self.store.load_deleted_ids().await;

        if !self.probe.is_connected() {
            self.online.store(false, Ordering::SeqCst);
            log::debug!("offline, returning {} local tasks", local.len());
            return Ok(local);
        }

        let remote = match self.source.fetch().await {
            Ok(remote) => remote,
            Err(e) => {
                // A failed fetch collapses into offline behavior.
                log::warn!("remote fetch failed, falling back to local data: {e}");
                self.online.store(false, Ordering::SeqCst);
                return Ok(local);
            }
        };
        self.online.store(true, Ordering::SeqCst);

        // A successful fetch confirms which deleted ids the remote still
        // serves; the rest of the tombstones have nothing left to suppress.
        let kept = reconcile::prune_tombstones(&deleted, &remote);
        if kept.len() != deleted.len() {
            log::info!(
                "pruned {} tombstones no longer served by the remote",
                deleted.len() - kept.len()
            );
            self.store.save_deleted_ids(&kept).await?;
        }

        let merged = reconcile::merge(&local, &kept, remote);
        self.store.save_tasks(&merged).await?;
        log::info!(
            "reconciled {} local tasks into {} total",
            local.len(),
            merged.len()
        );
        self.notify(ChangeNotification::reconciled());
        Ok(merged)
    }

    /// Add a task to the front of the local list. The task is stored with
    /// `is_synced = false` regardless of what the caller set.
    pub async fn add_task(&self, mut task: Task) -> Result<Task, SyncError> {
        if task.title.trim().is_empty() {
            return Err(SyncError::EmptyTitle);
        }
        let _guard = self.op_lock.lock().await;
        let mut tasks = self.store.load_tasks().await;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(SyncError::DuplicateId(task.id));
        }
        task.is_synced = false;
        tasks.insert(0, task.clone());
        self.store.save_tasks(&tasks).await?;
        self.notify(ChangeNotification::single(ChangeKind::Added, task.id));
        Ok(task)
    }

    /// Replace the stored task with the same id. Returns `Ok(false)` when
    /// no task has that id, leaving storage untouched.
    pub async fn update_task(&self, mut task: Task) -> Result<bool, SyncError> {
        if task.title.trim().is_empty() {
            return Err(SyncError::EmptyTitle);
        }
        let _guard = self.op_lock.lock().await;
        let mut tasks = self.store.load_tasks().await;
        let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) else {
            log::debug!("update for unknown task id {}", task.id);
            return Ok(false);
        };
        task.is_synced = false;
        let id = task.id;
        *slot = task;
        self.store.save_tasks(&tasks).await?;
        self.notify(ChangeNotification::single(ChangeKind::Updated, id));
        Ok(true)
    }

    /// Remove the task and record a tombstone so a later reconciliation
    /// cannot bring it back. The tombstone is recorded even when no local
    /// task has that id (the id may exist only on the remote); the return
    /// value is `Ok(false)` in that case.
    pub async fn delete_task(&self, id: i64) -> Result<bool, SyncError> {
        let _guard = self.op_lock.lock().await;
        let mut tasks = self.store.load_tasks().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        let removed = tasks.len() != before;
        if removed {
            self.store.save_tasks(&tasks).await?;
        } else {
            log::debug!("delete for unknown task id {id}, recording tombstone only");
        }
        self.store.append_deleted_id(id).await?;
        if removed {
            self.notify(ChangeNotification::single(ChangeKind::Deleted, id));
        }
        Ok(removed)
    }

    /// Invert `completed` on the task with this id, re-flagging it as not
    /// synced. Returns `Ok(false)` when no task has that id.
    pub async fn toggle_complete(&self, id: i64) -> Result<bool, SyncError> {
        let _guard = self.op_lock.lock().await;
        let mut tasks = self.store.load_tasks().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            log::debug!("toggle for unknown task id {id}");
            return Ok(false);
        };
        task.completed = !task.completed;
        task.is_synced = false;
        self.store.save_tasks(&tasks).await?;
        self.notify(ChangeNotification::single(ChangeKind::Updated, id));
        Ok(true)
    }

    /// Whether a `load_and_reconcile` call is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Last known connectivity outcome: `true` after a reconcile that
    /// reached the remote, `false` after an offline or failed one.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Subscribe to change notifications.
    pub fn change_rx(&self) -> broadcast::Receiver<ChangeNotification> {
        self.change_tx.subscribe()
    }

    fn notify(&self, notification: ChangeNotification) {
        // Nobody listening is fine.
        let _ = self.change_tx.send(notification);
    }
}

impl<S: KeyValueStore + 'static> TaskTide<S> {
    /// Spawn a task that reconciles whenever connectivity is regained.
    ///
    /// This is the only background trigger; reconciliation otherwise runs
    /// only when [`load_and_reconcile`](TaskTide::load_and_reconcile) is
    /// called explicitly.
    pub fn watch_connectivity(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut rx = engine.probe.subscribe();
        // Baseline must be read before the task is spawned: a transition
        // that lands before the task's first poll still flips the
        // receiver's changed flag, so the loop wakes and sees the edge
        // against this baseline instead of swallowing it.
        let mut was_connected = *rx.borrow();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let connected = *rx.borrow_and_update();
                if connected && !was_connected {
                    log::info!("connectivity regained, reconciling");
                    if let Err(e) = engine.load_and_reconcile().await {
                        log::error!("reconciliation after reconnect failed: {e}");
                    }
                }
                was_connected = connected;
            }
        })
    }
}
