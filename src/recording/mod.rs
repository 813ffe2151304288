//! Recording gate: turns a completed, diarized recording into a transcript
//! request.
//!
//! Receives the `recordingStatusCallback` for a call recording and, when the
//! recording passes [`Eligibility`], asks Intelligence to transcribe it. The
//! transcript-ready event Intelligence emits afterwards is handled by
//! [`crate::transcript`].

pub mod eligibility;

pub use eligibility::{Eligibility, EligibilityRule, Verdict};

use crate::intelligence::{Participant, TranscriptService, TranscriptionRequest};
use crate::remote::RemoteError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Recording status callback as posted by Programmable Voice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingEvent {
    #[serde(rename = "RecordingStatus", default)]
    pub recording_status: String,
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(
        rename = "RecordingChannels",
        default,
        deserialize_with = "string_or_number"
    )]
    pub recording_channels: String,
    #[serde(rename = "RecordingSid", default)]
    pub recording_sid: String,
    /// Any other params on the callback, e.g. values appended to the
    /// callback URL's query string.
    /// Values keep their JSON type; [`RecordingEvent::param`] renders them
    /// as text.
    #[serde(flatten)]
    pub params: HashMap<String, Value>,
}

impl RecordingEvent {
    pub fn is_completed(&self) -> bool {
        self.recording_status == "completed"
    }

    /// Channel count as sent. Only plain decimal digits without a leading
    /// zero or surrounding whitespace are accepted, so `"02"` or `" 2"` is
    /// not a stereo recording.
    pub fn channel_count(&self) -> Option<u8> {
        let raw = self.recording_channels.as_str();
        if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse().ok()
    }

    pub fn param(&self, name: &str) -> Option<String> {
        match self.params.get(name)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GateOutcome {
    Ignored { reason: String },
    Submitted { transcript_sid: String },
}

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("[{call_sid}] Failed to create transcription for {recording_sid}: {source}")]
    TranscriptionFailed {
        call_sid: String,
        recording_sid: String,
        #[source]
        source: RemoteError,
    },
}

pub struct RecordingGate {
    service: Arc<dyn TranscriptService>,
    eligibility: Eligibility,
    participants: Vec<Participant>,
}

impl RecordingGate {
    pub fn new(
        service: Arc<dyn TranscriptService>,
        eligibility: Eligibility,
        participants: Vec<Participant>,
    ) -> Self {
        Self {
            service,
            eligibility,
            participants,
        }
    }

    /// Process one recording status callback.
    ///
    /// Ineligible recordings are a successful no-op. A transcript request
    /// that does not come back `201 Created` is reported as
    /// [`RecordingError::TranscriptionFailed`]; it is not retried here, the
    /// callback sender's redelivery is the retry mechanism.
    pub async fn handle(&self, event: &RecordingEvent) -> Result<GateOutcome, RecordingError> {
        debug!("Recording event: {:?}", event);

        if let Verdict::Reject(reason) = self.eligibility.evaluate(event) {
            info!("[{}] Ignoring event - {}", event.call_sid, reason);
            return Ok(GateOutcome::Ignored { reason });
        }

        let request = TranscriptionRequest {
            recording_sid: event.recording_sid.clone(),
            participants: self.participants.clone(),
        };
        debug!(
            "[{}] Requesting transcript with participants {}",
            event.call_sid,
            request.participants_json()
        );

        match self.service.create_transcript(&request).await {
            Ok(transcript) => {
                info!(
                    "[{}] Created transcript {} for {}",
                    event.call_sid, transcript.sid, event.recording_sid
                );
                Ok(GateOutcome::Submitted {
                    transcript_sid: transcript.sid,
                })
            }
            Err(source) => {
                error!(
                    "[{}] Failed to create transcription for {}: {}",
                    event.call_sid, event.recording_sid, source
                );
                Err(RecordingError::TranscriptionFailed {
                    call_sid: event.call_sid.clone(),
                    recording_sid: event.recording_sid.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::{CreatedTranscript, ParticipantRole, TranscriptAnalysis};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every transcript request and answers with a fixed result.
    struct FakeService {
        requests: Mutex<Vec<TranscriptionRequest>>,
        fail_with: Option<(u16, &'static str, &'static str)>,
    }

    impl FakeService {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                fail_with: None,
            })
        }

        fn failing(status: u16, code: &'static str, message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                fail_with: Some((status, code, message)),
            })
        }

        fn requests(&self) -> Vec<TranscriptionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TranscriptService for FakeService {
        async fn create_transcript(
            &self,
            request: &TranscriptionRequest,
        ) -> Result<CreatedTranscript, RemoteError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.fail_with {
                Some((status, code, message)) => Err(RemoteError::Status {
                    operation: "POST /Transcripts",
                    status,
                    code: code.to_string(),
                    message: message.to_string(),
                }),
                None => Ok(CreatedTranscript {
                    sid: "GT123".to_string(),
                }),
            }
        }

        async fn fetch_analysis(&self, _url: &str) -> Result<TranscriptAnalysis, RemoteError> {
            unreachable!("the gate never fetches analyses")
        }
    }

    fn gate(service: Arc<FakeService>) -> RecordingGate {
        RecordingGate::new(
            service,
            Eligibility::standard(),
            vec![
                Participant::new(2, ParticipantRole::Customer),
                Participant::new(1, ParticipantRole::Agent),
            ],
        )
    }

    fn event(status: &str, channels: &str) -> RecordingEvent {
        RecordingEvent {
            recording_status: status.to_string(),
            call_sid: "CA123".to_string(),
            recording_channels: channels.to_string(),
            recording_sid: "RE123".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_incomplete_recordings_issue_no_request() {
        let service = FakeService::succeeding();
        let gate = gate(service.clone());

        for status in ["in-progress", "absent", "failed", ""] {
            let outcome = gate.handle(&event(status, "2")).await.unwrap();
            assert!(matches!(outcome, GateOutcome::Ignored { .. }));
        }
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_stereo_recordings_issue_no_request() {
        let service = FakeService::succeeding();
        let gate = gate(service.clone());

        for (status, channels) in [("completed", "1"), ("completed", "3"), ("absent", "1")] {
            let outcome = gate.handle(&event(status, channels)).await.unwrap();
            assert!(matches!(outcome, GateOutcome::Ignored { .. }));
        }
        assert!(service.requests().is_empty());
    }

    #[tokio::test]
    async fn test_eligible_recording_sends_one_request_covering_both_channels() {
        let service = FakeService::succeeding();
        let outcome = gate(service.clone())
            .handle(&event("completed", "2"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            GateOutcome::Submitted {
                transcript_sid: "GT123".to_string()
            }
        );

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].recording_sid, "RE123");
        let mut channels: Vec<u8> = requests[0].participants.iter().map(|p| p.channel).collect();
        channels.sort();
        assert_eq!(channels, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_remote_failure_names_call_and_remote_error() {
        let service = FakeService::failing(400, "20001", "Invalid RecordingSid");
        let err = gate(service.clone())
            .handle(&event("completed", "2"))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("CA123"), "{message}");
        assert!(message.contains("RE123"), "{message}");
        assert!(message.contains("20001"), "{message}");
        assert!(message.contains("Invalid RecordingSid"), "{message}");
        assert_eq!(service.requests().len(), 1);
    }

    #[test]
    fn test_event_parses_form_callback_with_extra_params() {
        let body = "RecordingStatus=completed&CallSid=CA1&RecordingChannels=2\
                    &RecordingSid=RE1&FromCountry=US&RecordingDuration=42";
        let fields: HashMap<&str, &str> = body
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        let event: RecordingEvent =
            serde_json::from_value(serde_json::to_value(fields).unwrap()).unwrap();

        assert!(event.is_completed());
        assert_eq!(event.channel_count(), Some(2));
        assert_eq!(event.param("FromCountry").as_deref(), Some("US"));
        assert_eq!(event.param("RecordingDuration").as_deref(), Some("42"));
    }

    #[test]
    fn test_event_accepts_numeric_channels() {
        let event: RecordingEvent = serde_json::from_str(
            r#"{"RecordingStatus":"completed","CallSid":"CA1","RecordingChannels":2,"RecordingSid":"RE1"}"#,
        )
        .unwrap();
        assert_eq!(event.recording_channels, "2");
        assert!(event.params.is_empty());
    }

    #[test]
    fn test_event_keeps_non_string_extra_fields() {
        let event: RecordingEvent = serde_json::from_str(
            r#"{"RecordingStatus":"completed","CallSid":"CA1","RecordingChannels":"2",
                "RecordingSid":"RE1","RecordingDuration":42,"Trimmed":false,"Note":null}"#,
        )
        .unwrap();

        assert_eq!(event.param("RecordingDuration").as_deref(), Some("42"));
        assert_eq!(event.param("Trimmed").as_deref(), Some("false"));
        assert_eq!(event.param("Note"), None);
        assert_eq!(event.param("Missing"), None);
    }

    #[test]
    fn test_channel_count_requires_exact_digits() {
        for raw in ["02", "+2", " 2", "2 ", "", "0", "-1", "2.0"] {
            assert_eq!(event("completed", raw).channel_count(), None, "{raw:?}");
        }
        assert_eq!(event("completed", "2").channel_count(), Some(2));
        assert_eq!(event("completed", "1").channel_count(), Some(1));
    }

    #[tokio::test]
    async fn test_padded_channel_counts_issue_no_request() {
        let service = FakeService::succeeding();
        let gate = gate(service.clone());

        for channels in ["02", "+2", " 2"] {
            let outcome = gate.handle(&event("completed", channels)).await.unwrap();
            assert!(matches!(outcome, GateOutcome::Ignored { .. }), "{channels:?}");
        }
        assert!(service.requests().is_empty());
    }
}
