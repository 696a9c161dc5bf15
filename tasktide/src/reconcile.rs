//! Merge of the local and remote task collections into one authoritative list.
//!
//! Local always wins: a remote task whose id already exists locally is
//! dropped without any field comparison, and a remote task whose id is in
//! the tombstone set stays deleted. Previously-unseen remote tasks are
//! appended after the local list, tagged as synced. Running the merge twice
//! against an unchanged remote is a no-op, since first-merge remote ids
//! become local ids and are thereafter excluded by the collision filter.

use std::collections::HashSet;

use crate::task::{RemoteTask, Task};

/// Produce the authoritative task list from local state plus a remote fetch.
///
/// Order is preserved: local tasks first, in their stored order, then the
/// surviving remote tasks in fetch order.
pub fn merge(local: &[Task], deleted_ids: &[i64], remote: Vec<RemoteTask>) -> Vec<Task> {
    let tombstones: HashSet<i64> = deleted_ids.iter().copied().collect();
    let local_ids: HashSet<i64> = local.iter().map(|t| t.id).collect();

    let mut merged: Vec<Task> = local.to_vec();
    merged.extend(
        remote
            .into_iter()
            .filter(|r| !tombstones.contains(&r.id))
            .filter(|r| !local_ids.contains(&r.id))
            .map(Task::from),
    );
    merged
}

/// Drop tombstones for ids the remote source no longer serves.
///
/// A tombstone exists only to stop a remote fetch from resurrecting a
/// locally-deleted task; once the remote has stopped returning that id
/// there is nothing left to suppress. Tombstones for ids still served by
/// the remote are kept, so the set stays bounded by the remote collection
/// size instead of growing forever.
pub fn prune_tombstones(deleted_ids: &[i64], remote: &[RemoteTask]) -> Vec<i64> {
    let remote_ids: HashSet<i64> = remote.iter().map(|t| t.id).collect();
    deleted_ids
        .iter()
        .copied()
        .filter(|id| remote_ids.contains(id))
        .collect()
}
