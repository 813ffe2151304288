use super::{CreatedTask, NewTask, TaskRouter};
use crate::config::Config;
use crate::remote::{self, Credentials, RemoteError};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

pub struct TaskRouterClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl TaskRouterClient {
    pub fn new(client: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            remote::http_client(config.twilio.request_timeout_seconds)?,
            &config.twilio.taskrouter_base_url,
            Credentials::from_config(&config.twilio),
        ))
    }
}

#[async_trait]
impl TaskRouter for TaskRouterClient {
    async fn create_task(&self, task: &NewTask) -> Result<CreatedTask, RemoteError> {
        let url = format!("{}/Workspaces/{}/Tasks", self.base_url, task.workspace_sid);
        let attributes = task.attributes.to_string();
        debug!("POST {} attributes={}", url, attributes);

        let builder = self.credentials.apply(self.client.post(&url)).form(&[
            ("Attributes", attributes.as_str()),
            ("WorkflowSid", task.workflow_sid.as_str()),
        ]);

        remote::send_json("POST /Tasks", builder, |status| (200..300).contains(&status)).await
    }
}
