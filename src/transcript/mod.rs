//! Transcript evaluator: escalates calls whose analysis matches the target
//! model.
//!
//! Handles the Intelligence webhook sent once language operator results are
//! ready. The analysis is fetched, the target model is located by its
//! description, and a positive match creates one TaskRouter task pointing
//! back at the transcript.
//!
//! Every outcome maps to an explicit [`Evaluation`]; errors never escape
//! [`TranscriptEvaluator::handle`] and their detail stays in the logs.

pub mod escalation;
pub mod poll;

pub use escalation::EscalationAttributes;

use crate::config::{AnalysisConfig, EscalationConfig};
use crate::intelligence::TranscriptService;
use crate::remote::RemoteError;
use crate::taskrouter::{NewTask, TaskRouter};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// The only event type that carries finished classification results.
pub const LIT_RESULTS_AVAILABLE: &str = "lit_results_available";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptReadyEvent {
    pub event_type: String,
    pub service_sid: String,
    pub transcript_sid: String,
    pub sentences_url: String,
    pub transcription_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Ignored { event_type: String },
    ModelNotFound { model: String },
    NotMatched { model_sid: String },
    Created { task_sid: String },
    Failed,
}

impl Evaluation {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ModelNotFound { .. } => 404,
            Self::Failed => 500,
            _ => 200,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Self::Ignored { .. } => json!({ "status": "ignored" }),
            Self::ModelNotFound { model } => json!({
                "status": "model_not_found",
                "message": format!("Model not found - {model}"),
            }),
            Self::NotMatched { model_sid } => json!({
                "status": "not_matched",
                "model": model_sid,
            }),
            Self::Created { .. } => json!({ "status": "created" }),
            Self::Failed => json!({ "status": "error" }),
        }
    }
}

#[derive(Debug, Error)]
enum EvaluationError {
    #[error("fetching analysis: {0}")]
    Fetch(#[source] RemoteError),
    #[error("encoding task attributes: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("creating task: {0}")]
    CreateTask(#[source] RemoteError),
}

pub struct TranscriptEvaluator {
    service: Arc<dyn TranscriptService>,
    router: Arc<dyn TaskRouter>,
    escalation: EscalationConfig,
    schedule: AnalysisConfig,
}

impl TranscriptEvaluator {
    pub fn new(
        service: Arc<dyn TranscriptService>,
        router: Arc<dyn TaskRouter>,
        escalation: EscalationConfig,
        schedule: AnalysisConfig,
    ) -> Self {
        Self {
            service,
            router,
            escalation,
            schedule,
        }
    }

    pub async fn handle(&self, event: &TranscriptReadyEvent) -> Evaluation {
        if event.event_type != LIT_RESULTS_AVAILABLE {
            info!(
                "[{}] Ignoring event - type: {}",
                event.transcript_sid, event.event_type
            );
            return Evaluation::Ignored {
                event_type: event.event_type.clone(),
            };
        }

        debug!("Transcript event: {:?}", event);

        match self.evaluate(event).await {
            Ok(evaluation) => evaluation,
            Err(err) => {
                error!(
                    "[{}] Failed to retrieve transcription SID: {}: {}",
                    event.service_sid, event.transcript_sid, err
                );
                Evaluation::Failed
            }
        }
    }

    async fn evaluate(&self, event: &TranscriptReadyEvent) -> Result<Evaluation, EvaluationError> {
        let analysis =
            poll::fetch_when_ready(self.service.as_ref(), &event.transcription_url, &self.schedule)
                .await
                .map_err(EvaluationError::Fetch)?;

        let target = &self.escalation.target_model;
        let Some(model_sid) = analysis.model_sid_for(target) else {
            warn!(
                "[{}] Model {:?} was not applied to transcript",
                event.transcript_sid, target
            );
            return Ok(Evaluation::ModelNotFound {
                model: target.clone(),
            });
        };

        let output = analysis.output_for(model_sid);
        let matched = output.map(|o| o.r#match).unwrap_or(false);
        info!(
            "[{}] Model {} matched: {} (probability {:?})",
            event.transcript_sid,
            model_sid,
            matched,
            output.and_then(|o| o.clf_match_prob)
        );

        if !matched {
            return Ok(Evaluation::NotMatched {
                model_sid: model_sid.to_string(),
            });
        }

        info!("[{}] Transcript matches model, creating task", event.transcript_sid);
        let task = NewTask {
            workspace_sid: self.escalation.workspace_sid.clone(),
            workflow_sid: self.escalation.workflow_sid.clone(),
            attributes: serde_json::to_value(EscalationAttributes::new(&self.escalation, event))?,
        };
        let created = self
            .router
            .create_task(&task)
            .await
            .map_err(EvaluationError::CreateTask)?;

        info!("[{}] Created task {}", event.transcript_sid, created.sid);
        Ok(Evaluation::Created {
            task_sid: created.sid,
        })
    }
}
