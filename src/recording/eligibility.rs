//! Ordered eligibility rules deciding whether a recording gets transcribed.
//!
//! Rules run in order and the first rejection wins. Extra callback params
//! (anything appended to the `recordingStatusCallback` query string) are
//! available to rules through [`RecordingEvent::param`].

use super::RecordingEvent;
use crate::config::{RecordingConfig, REQUIRED_CHANNELS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(String),
}

pub trait EligibilityRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, event: &RecordingEvent) -> Verdict;
}

/// Partial and in-progress recordings are not actionable.
pub struct CompletedStatus;

impl EligibilityRule for CompletedStatus {
    fn name(&self) -> &'static str {
        "completed-status"
    }

    fn check(&self, event: &RecordingEvent) -> Verdict {
        if event.is_completed() {
            Verdict::Accept
        } else {
            Verdict::Reject(format!("status: {}", event.recording_status))
        }
    }
}

/// Only diarized recordings can be attributed to agent and customer.
pub struct ChannelCount(pub u8);

impl EligibilityRule for ChannelCount {
    fn name(&self) -> &'static str {
        "channel-count"
    }

    fn check(&self, event: &RecordingEvent) -> Verdict {
        match event.channel_count() {
            Some(channels) if channels == self.0 => Verdict::Accept,
            Some(1) => Verdict::Reject("mono-channel".to_string()),
            _ => Verdict::Reject(format!("channels: {}", event.recording_channels)),
        }
    }
}

/// Limits transcription to callers from the listed countries, read from the
/// `FromCountry` callback param.
pub struct CallerCountry {
    allowed: Vec<String>,
}

impl CallerCountry {
    pub const PARAM: &'static str = "FromCountry";

    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .collect(),
        }
    }
}

impl EligibilityRule for CallerCountry {
    fn name(&self) -> &'static str {
        "caller-country"
    }

    fn check(&self, event: &RecordingEvent) -> Verdict {
        match event.param(Self::PARAM) {
            Some(country) if self.allowed.contains(&country.trim().to_uppercase()) => {
                Verdict::Accept
            }
            Some(country) => Verdict::Reject(format!("caller country {country} not allowed")),
            None => Verdict::Reject(format!("missing {}", Self::PARAM)),
        }
    }
}

pub struct Eligibility {
    rules: Vec<Box<dyn EligibilityRule>>,
}

impl Eligibility {
    /// Completed status, then exactly two channels.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                Box::new(CompletedStatus),
                Box::new(ChannelCount(REQUIRED_CHANNELS)),
            ],
        }
    }

    /// Standard rules followed by whatever the config enables.
    pub fn from_config(config: &RecordingConfig) -> Self {
        let eligibility = Self::standard();
        if config.allowed_countries.is_empty() {
            eligibility
        } else {
            eligibility.with_rule(CallerCountry::new(&config.allowed_countries))
        }
    }

    pub fn with_rule(mut self, rule: impl EligibilityRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn evaluate(&self, event: &RecordingEvent) -> Verdict {
        self.rules
            .iter()
            .map(|rule| rule.check(event))
            .find(|verdict| *verdict != Verdict::Accept)
            .unwrap_or(Verdict::Accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: &str, channels: &str) -> RecordingEvent {
        RecordingEvent {
            recording_status: status.to_string(),
            call_sid: "CA123".to_string(),
            recording_channels: channels.to_string(),
            recording_sid: "RE123".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_standard_rules_accept_completed_stereo() {
        assert_eq!(Eligibility::standard().evaluate(&event("completed", "2")), Verdict::Accept);
    }

    #[test]
    fn test_status_checked_before_channels() {
        assert_eq!(
            Eligibility::standard().evaluate(&event("in-progress", "1")),
            Verdict::Reject("status: in-progress".to_string())
        );
    }

    #[test]
    fn test_channel_rejections() {
        let eligibility = Eligibility::standard();
        for (channels, reason) in [
            ("1", "mono-channel"),
            ("3", "channels: 3"),
            ("", "channels: "),
            ("two", "channels: two"),
        ] {
            assert_eq!(
                eligibility.evaluate(&event("completed", channels)),
                Verdict::Reject(reason.to_string())
            );
        }
    }

    #[test]
    fn test_country_rule_runs_after_standard_rules() {
        let config = RecordingConfig {
            allowed_countries: vec!["us".to_string()],
            ..Default::default()
        };
        let eligibility = Eligibility::from_config(&config);
        assert_eq!(
            eligibility.rule_names(),
            vec!["completed-status", "channel-count", "caller-country"]
        );

        let mut us_call = event("completed", "2");
        us_call
            .params
            .insert("FromCountry".to_string(), "US".into());
        assert_eq!(eligibility.evaluate(&us_call), Verdict::Accept);

        let mut gb_call = event("completed", "2");
        gb_call
            .params
            .insert("FromCountry".to_string(), "GB".into());
        assert_eq!(
            eligibility.evaluate(&gb_call),
            Verdict::Reject("caller country GB not allowed".to_string())
        );

        assert_eq!(
            eligibility.evaluate(&event("completed", "2")),
            Verdict::Reject("missing FromCountry".to_string())
        );
    }

    #[test]
    fn test_no_country_rule_without_allowlist() {
        let eligibility = Eligibility::from_config(&RecordingConfig::default());
        assert_eq!(eligibility.rule_names(), vec!["completed-status", "channel-count"]);
    }
}
