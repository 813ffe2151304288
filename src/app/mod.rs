use crate::api::ApiServer;
use crate::config::Config;
use crate::intelligence::{IntelligenceClient, TranscriptService};
use crate::recording::{Eligibility, RecordingGate};
use crate::taskrouter::{TaskRouter, TaskRouterClient};
use crate::transcript::TranscriptEvaluator;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Both handlers wired to their remote clients. Built once at startup and
/// shared by every request; holds no per-event state.
pub struct Pipeline {
    pub gate: RecordingGate,
    pub evaluator: TranscriptEvaluator,
}

impl Pipeline {
    /// Validates `config` and builds the real REST clients.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        Self::with_services(
            Arc::new(IntelligenceClient::from_config(config)?),
            Arc::new(TaskRouterClient::from_config(config)?),
            config,
        )
    }

    /// Wires the handlers to the given services. `config` is validated here
    /// too, so a pipeline never exists with an unusable participant mapping
    /// or missing credentials.
    pub fn with_services(
        service: Arc<dyn TranscriptService>,
        router: Arc<dyn TaskRouter>,
        config: &Config,
    ) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let eligibility = Eligibility::from_config(&config.recording);
        info!("Recording eligibility rules: {:?}", eligibility.rule_names());

        Ok(Self {
            gate: RecordingGate::new(
                service.clone(),
                eligibility,
                config.recording.participants.clone(),
            ),
            evaluator: TranscriptEvaluator::new(
                service,
                router,
                config.escalation.clone(),
                config.analysis.clone(),
            ),
        })
    }
}

pub async fn run_service(config: Config) -> Result<()> {
    info!("Starting crash-escalator service");

    let pipeline = Arc::new(Pipeline::from_config(&config)?);
    info!(
        "Escalating transcripts matching {:?} to workspace {}",
        config.escalation.target_model, config.escalation.workspace_sid
    );

    ApiServer::new(pipeline, &config.server).start().await
}
