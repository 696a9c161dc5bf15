//! Read-only remote task source.
//!
//! The remote serves the full task collection as a JSON array on a single
//! GET endpoint. No authentication, no pagination, no retry: a failed fetch
//! is reported once and the caller falls back to local data.

use async_trait::async_trait;
use thiserror::Error;

use crate::task::RemoteTask;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to task source failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Task source returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Something that can produce the remote task collection.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RemoteTask>, FetchError>;
}

/// HTTP implementation over a fixed endpoint.
pub struct HttpTaskSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTaskSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpTaskSource {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        HttpTaskSource {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn fetch(&self) -> Result<Vec<RemoteTask>, FetchError> {
        log::debug!("fetching remote tasks from {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let tasks: Vec<RemoteTask> = response.json().await?;
        log::debug!("remote source returned {} tasks", tasks.len());
        Ok(tasks)
    }
}
