//! TaskRouter task creation.

mod client;

pub use client::TaskRouterClient;

use crate::remote::RemoteError;
use async_trait::async_trait;
use serde::Deserialize;

/// A task to create in `workspace_sid`, routed by `workflow_sid`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub workspace_sid: String,
    pub workflow_sid: String,
    pub attributes: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTask {
    pub sid: String,
    #[serde(default)]
    pub assignment_status: Option<String>,
}

#[async_trait]
pub trait TaskRouter: Send + Sync {
    async fn create_task(&self, task: &NewTask) -> Result<CreatedTask, RemoteError>;
}
