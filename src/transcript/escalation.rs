use super::TranscriptReadyEvent;
use crate::config::EscalationConfig;
use serde::Serialize;

/// Attributes blob of the training task. Identifiers and URLs are copied
/// verbatim from the triggering event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationAttributes {
    #[serde(rename = "type")]
    pub task_type: String,
    pub training_reason: String,
    pub name: String,
    pub transcription_service_sid: String,
    pub transcript_sid: String,
    pub transcript_url: String,
    pub sentences_url: String,
    pub uri: String,
}

impl EscalationAttributes {
    pub fn new(config: &EscalationConfig, event: &TranscriptReadyEvent) -> Self {
        Self {
            task_type: config.task_type.clone(),
            training_reason: config.target_model.clone(),
            name: config.task_name.clone(),
            transcription_service_sid: event.service_sid.clone(),
            transcript_sid: event.transcript_sid.clone(),
            transcript_url: event.transcription_url.clone(),
            sentences_url: event.sentences_url.clone(),
            uri: config.task_uri.clone(),
        }
    }
}
