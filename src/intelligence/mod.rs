//! Conversational Intelligence: transcript creation and analysis retrieval.
//!
//! The Intelligence APIs have no helper-library support, so the crate talks
//! to them over plain REST via [`IntelligenceClient`]. Handlers depend on the
//! [`TranscriptService`] trait so they can be exercised without a network.

mod client;

pub use client::IntelligenceClient;

use crate::remote::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker role attached to one channel of a diarized recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Agent,
    Customer,
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

/// One entry of the `Participants` array: a 1-based channel and its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub channel: u8,
    #[serde(rename = "type")]
    pub role: ParticipantRole,
}

impl Participant {
    pub fn new(channel: u8, role: ParticipantRole) -> Self {
        Self { channel, role }
    }
}

/// Body of a transcript creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub recording_sid: String,
    pub participants: Vec<Participant>,
}

impl TranscriptionRequest {
    /// `Participants` form value, a JSON array of `{channel, type}`.
    pub fn participants_json(&self) -> String {
        serde_json::to_string(&self.participants).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Response to a successful transcript creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTranscript {
    pub sid: String,
}

/// Catalog of models applied to a transcript and their outputs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptAnalysis {
    #[serde(default)]
    pub lup_applied_models: Vec<AppliedModel>,
    #[serde(default)]
    pub lup_outputs: Vec<ModelOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppliedModel {
    #[serde(default)]
    pub description: String,
    pub primitive_sid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelOutput {
    pub primitive_sid: String,
    #[serde(default)]
    pub model_sid: Option<String>,
    #[serde(default)]
    pub classify_extract_transcript_output: Option<ClassifyOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyOutput {
    #[serde(default)]
    pub clf_match_prob: Option<f64>,
    #[serde(default)]
    pub r#match: bool,
}

impl TranscriptAnalysis {
    /// SID of the applied model whose description equals `label`.
    pub fn model_sid_for(&self, label: &str) -> Option<&str> {
        self.lup_applied_models
            .iter()
            .find(|model| model.description == label)
            .map(|model| model.primitive_sid.as_str())
    }

    /// Classification output produced by the model `primitive_sid`.
    pub fn output_for(&self, primitive_sid: &str) -> Option<&ClassifyOutput> {
        self.lup_outputs
            .iter()
            .find(|output| output.primitive_sid == primitive_sid)
            .and_then(|output| output.classify_extract_transcript_output.as_ref())
    }
}

#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Submit a recording for transcription. Only HTTP 201 is success.
    async fn create_transcript(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<CreatedTranscript, RemoteError>;

    /// Fetch the analysis behind a `transcription_url`.
    async fn fetch_analysis(&self, url: &str) -> Result<TranscriptAnalysis, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANALYSIS: &str = r#"{
        "lup_applied_models": [
            {"description": "Greeting", "primitive_sid": "LY001", "other": 1},
            {"description": "System Crash", "primitive_sid": "LY002"}
        ],
        "lup_outputs": [
            {"primitive_sid": "LY001", "model_sid": "GM1",
             "classify_extract_transcript_output": {"clf_match_prob": 0.2, "match": false}},
            {"primitive_sid": "LY002", "model_sid": "GM2",
             "classify_extract_transcript_output": {"clf_match_prob": 0.93, "match": true, "spans": []}}
        ],
        "sid": "GT123"
    }"#;

    #[test]
    fn test_participants_serialize_with_type_key() {
        let request = TranscriptionRequest {
            recording_sid: "RE123".to_string(),
            participants: vec![
                Participant::new(2, ParticipantRole::Customer),
                Participant::new(1, ParticipantRole::Agent),
            ],
        };
        assert_eq!(
            request.participants_json(),
            r#"[{"channel":2,"type":"customer"},{"channel":1,"type":"agent"}]"#
        );
    }

    #[test]
    fn test_analysis_lookup_by_description_then_sid() {
        let analysis: TranscriptAnalysis = serde_json::from_str(ANALYSIS).unwrap();

        let sid = analysis.model_sid_for("System Crash").unwrap();
        assert_eq!(sid, "LY002");

        let output = analysis.output_for(sid).unwrap();
        assert!(output.r#match);
        assert_eq!(output.clf_match_prob, Some(0.93));

        assert!(analysis.model_sid_for("system crash").is_none());
        assert!(analysis.output_for("LY999").is_none());
    }

    #[test]
    fn test_analysis_tolerates_missing_lists() {
        let analysis: TranscriptAnalysis = serde_json::from_str(r#"{"sid": "GT1"}"#).unwrap();
        assert!(analysis.lup_applied_models.is_empty());
        assert!(analysis.model_sid_for("System Crash").is_none());
    }
}
