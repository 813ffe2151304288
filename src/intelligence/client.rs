use super::{CreatedTranscript, TranscriptAnalysis, TranscriptService, TranscriptionRequest};
use crate::config::Config;
use crate::remote::{self, Credentials, RemoteError};
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// REST client for the Intelligence `Transcripts` resource.
pub struct IntelligenceClient {
    client: reqwest::Client,
    base_url: String,
    service_sid: String,
    credentials: Credentials,
}

impl IntelligenceClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        service_sid: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_sid: service_sid.into(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            remote::http_client(config.twilio.request_timeout_seconds)?,
            &config.twilio.intelligence_base_url,
            &config.recording.service_sid,
            Credentials::from_config(&config.twilio),
        ))
    }

    fn transcripts_url(&self) -> String {
        format!("{}/Services/{}/Transcripts", self.base_url, self.service_sid)
    }
}

#[async_trait]
impl TranscriptService for IntelligenceClient {
    async fn create_transcript(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<CreatedTranscript, RemoteError> {
        let url = self.transcripts_url();
        let participants = request.participants_json();
        debug!("POST {} participants={}", url, participants);

        let builder = self.credentials.apply(self.client.post(&url)).form(&[
            ("RecordingSid", request.recording_sid.as_str()),
            ("Participants", participants.as_str()),
        ]);

        remote::send_json("POST /Transcripts", builder, |status| status == 201).await
    }

    async fn fetch_analysis(&self, url: &str) -> Result<TranscriptAnalysis, RemoteError> {
        debug!("Getting transcript from url: {}", url);

        let builder = self.credentials.apply(self.client.get(url));
        remote::send_json("GET transcript", builder, |status| (200..300).contains(&status)).await
    }
}
