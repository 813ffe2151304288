//! Waits out the lag between the transcript-ready event and the analysis
//! being retrievable.

use crate::config::AnalysisConfig;
use crate::intelligence::{TranscriptAnalysis, TranscriptService};
use crate::remote::RemoteError;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Fetch the analysis at `url`, sleeping before every attempt and retrying
/// while the remote answers 404. Other errors end the wait immediately.
pub async fn fetch_when_ready(
    service: &dyn TranscriptService,
    url: &str,
    schedule: &AnalysisConfig,
) -> Result<TranscriptAnalysis, RemoteError> {
    let max_attempts = schedule.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let delay = schedule.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!(
                "Waiting {}ms before fetching analysis (attempt {}/{})",
                delay.as_millis(),
                attempt,
                max_attempts
            );
            sleep(delay).await;
        }

        match service.fetch_analysis(url).await {
            Ok(analysis) => return Ok(analysis),
            Err(err) if err.is_not_found() && attempt < max_attempts => {
                warn!(
                    "Analysis not available yet (attempt {}/{}): {}",
                    attempt, max_attempts, err
                );
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
