//! # tasktide
//!
//! Offline-first task list engine with opportunistic remote reconciliation.
//!
//! Tasks live in a durable key-value store and are edited locally; when
//! connectivity is available, [`TaskTide::load_and_reconcile`] merges the
//! local list with a freshly fetched remote collection. Local edits always
//! win, locally-deleted ids are tombstoned so a fetch cannot resurrect
//! them, and remote-originated tasks are tagged as synced.
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tasktide::{ConnectivityHandle, HttpTaskSource, JsonFileStore, Task, TaskTideBuilder};
//!
//! let connectivity = Arc::new(ConnectivityHandle::new(true));
//! let engine = Arc::new(
//!     TaskTideBuilder::new(
//!         JsonFileStore::new("./tasktide.json"),
//!         Arc::new(HttpTaskSource::new("https://example.com/todos")),
//!         connectivity.clone(),
//!     )
//!     .build(),
//! );
//! engine.watch_connectivity();
//!
//! let tasks = engine.load_and_reconcile().await?;
//! engine.add_task(Task::new(1724967000000, "Buy milk")).await?;
//! ```
//!
//! ## Key types
//!
//! - [`TaskTide`] — the engine: load/reconcile plus local mutations
//! - [`TaskTideBuilder`] — wires store, remote source, and connectivity probe
//! - [`TaskStore`] / [`KeyValueStore`] — durable persistence seam
//! - [`TaskSource`] — remote fetch seam
//! - [`ConnectivityProbe`] / [`ConnectivityHandle`] — network state seam
//! - [`ChangeNotification`] — lightweight event emitted after every write

pub mod connectivity;
pub mod messages;
pub mod reconcile;
pub mod remote;
pub mod store;
pub mod sync;
pub mod task;

pub use connectivity::{ConnectivityHandle, ConnectivityProbe};
pub use messages::{ChangeKind, ChangeNotification};
pub use remote::{FetchError, HttpTaskSource, TaskSource};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, TaskStore};
pub use sync::{SyncError, TaskTide, TaskTideBuilder};
pub use task::{RemoteTask, Task};
