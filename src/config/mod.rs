use crate::global;
use crate::intelligence::{Participant, ParticipantRole};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable names that override the config file.
pub mod env_keys {
    pub const ACCOUNT_SID: &str = "ACCOUNT_SID";
    pub const AUTH_TOKEN: &str = "AUTH_TOKEN";
    pub const EIP_SERVICE_SID: &str = "EIP_SERVICE_SID";
    pub const WORKSPACE_SID: &str = "WORKSPACE_SID";
    pub const WORKFLOW_SID: &str = "WORKFLOW_SID";
    pub const TRAINING_TASK_TYPE: &str = "TRAINING_TASK_TYPE";
    pub const TRAINING_TASK_URI: &str = "TRAINING_TASK_URI";
}

pub const DEFAULT_TARGET_MODEL: &str = "System Crash";
pub const DEFAULT_TASK_NAME: &str = "Micro Training";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    #[error("participant mapping must have exactly one entry per channel, got {0} entries")]
    ParticipantCount(usize),
    #[error("participant channel {0} is outside 1..={1}")]
    ChannelOutOfRange(u8, u8),
    #[error("participant channel {0} is mapped more than once")]
    DuplicateChannel(u8),
    #[error("analysis.max_attempts must be at least 1")]
    NoAttempts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub twilio: TwilioConfig,
    pub recording: RecordingConfig,
    pub escalation: EscalationConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub intelligence_base_url: String,
    pub taskrouter_base_url: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Intelligence service that transcripts are created under.
    pub service_sid: String,
    /// Channel to role assignment sent with every transcript request.
    pub participants: Vec<Participant>,
    /// ISO country codes accepted from the `FromCountry` callback param.
    /// Empty means every caller is accepted.
    pub allowed_countries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    pub workspace_sid: String,
    pub workflow_sid: String,
    pub task_type: String,
    pub task_uri: String,
    pub target_model: String,
    pub task_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub initial_delay_ms: u64,
    pub max_attempts: u32,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            intelligence_base_url: "https://ai.twilio.com/v1".to_string(),
            taskrouter_base_url: "https://taskrouter.twilio.com/v1".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            service_sid: String::new(),
            participants: vec![
                Participant::new(2, ParticipantRole::Customer),
                Participant::new(1, ParticipantRole::Agent),
            ],
            allowed_countries: Vec::new(),
        }
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            workspace_sid: String::new(),
            workflow_sid: String::new(),
            task_type: "training".to_string(),
            task_uri: String::new(),
            target_model: DEFAULT_TARGET_MODEL.to_string(),
            task_name: DEFAULT_TASK_NAME.to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 3000,
            max_attempts: 5,
            backoff_multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl AnalysisConfig {
    /// Delay before poll `attempt` (1-based). The first attempt waits the
    /// initial delay, later attempts grow by the multiplier up to the cap.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        Duration::from_millis(millis.min(self.max_delay_ms as f64) as u64)
    }
}

impl Config {
    /// Load from the default config path, writing defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&global::config_file()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
            info!("Loaded config from {:?}", config_path);
            config
        } else {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(config_path)?;
            config
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Apply environment-style overrides. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 7] = [
            (env_keys::ACCOUNT_SID, &mut self.twilio.account_sid),
            (env_keys::AUTH_TOKEN, &mut self.twilio.auth_token),
            (env_keys::EIP_SERVICE_SID, &mut self.recording.service_sid),
            (env_keys::WORKSPACE_SID, &mut self.escalation.workspace_sid),
            (env_keys::WORKFLOW_SID, &mut self.escalation.workflow_sid),
            (env_keys::TRAINING_TASK_TYPE, &mut self.escalation.task_type),
            (env_keys::TRAINING_TASK_URI, &mut self.escalation.task_uri),
        ];

        for (key, slot) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }

    /// Checks the settings both handlers need before serving traffic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("twilio.account_sid", &self.twilio.account_sid),
            ("twilio.auth_token", &self.twilio.auth_token),
            ("recording.service_sid", &self.recording.service_sid),
            ("escalation.workspace_sid", &self.escalation.workspace_sid),
            ("escalation.workflow_sid", &self.escalation.workflow_sid),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }

        validate_participants(&self.recording.participants, REQUIRED_CHANNELS)?;

        if self.analysis.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        Ok(())
    }

    /// Copy with credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.twilio.auth_token = redact(&copy.twilio.auth_token);
        copy
    }
}

/// Recordings must be split into exactly this many channels.
pub const REQUIRED_CHANNELS: u8 = 2;

pub fn validate_participants(participants: &[Participant], channels: u8) -> Result<(), ConfigError> {
    if participants.len() != channels as usize {
        return Err(ConfigError::ParticipantCount(participants.len()));
    }

    let mut seen = HashSet::new();
    for participant in participants {
        if participant.channel == 0 || participant.channel > channels {
            return Err(ConfigError::ChannelOutOfRange(participant.channel, channels));
        }
        if !seen.insert(participant.channel) {
            return Err(ConfigError::DuplicateChannel(participant.channel));
        }
    }
    Ok(())
}

fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
