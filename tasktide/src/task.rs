use serde::{Deserialize, Serialize};

/// A single task in the local list.
///
/// Serialized field names are camelCase (`isSynced`) so task lists written
/// by earlier versions of the app parse unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Caller-assigned identifier, unique within the local list. The app
    /// conventionally uses a creation timestamp in milliseconds, which is
    /// not guaranteed globally unique across devices.
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    /// Whether this exact record state is known to match the remote source.
    /// Absent in older stored data, which defaults to `false`.
    #[serde(default)]
    pub is_synced: bool,
}

impl Task {
    /// Create a new, not-yet-synced task.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Task {
            id,
            title: title.into(),
            description: None,
            completed: false,
            is_synced: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A task as served by the remote source: a flat JSON object with `id`,
/// `title` and `completed`. The source provides no description field, and
/// extra fields (e.g. `userId`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

impl From<RemoteTask> for Task {
    /// Remote-originated tasks enter the local list already synced.
    fn from(remote: RemoteTask) -> Self {
        Task {
            id: remote.id,
            title: remote.title,
            description: None,
            completed: remote.completed,
            is_synced: true,
        }
    }
}
