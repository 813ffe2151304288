//! One-shot handler invocation from the command line.
//!
//! Mirrors what the webhook server does for a single delivery, which makes
//! replaying a captured callback straightforward.

use crate::app::Pipeline;
use crate::config::Config;
use crate::recording::RecordingEvent;
use crate::transcript::TranscriptReadyEvent;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

use super::args::EventCliArgs;

pub async fn handle_recording_command(args: EventCliArgs, config: &Config) -> Result<()> {
    let event: RecordingEvent = read_event(&args.event)?;
    let pipeline = Pipeline::from_config(config)?;

    let outcome = pipeline.gate.handle(&event).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn handle_transcript_command(args: EventCliArgs, config: &Config) -> Result<()> {
    let event: TranscriptReadyEvent = read_event(&args.event)?;
    let pipeline = Pipeline::from_config(config)?;

    let evaluation = pipeline.evaluator.handle(&event).await;
    println!("{}", serde_json::to_string_pretty(&evaluation.body())?);

    if evaluation.status_code() >= 500 {
        bail!("Transcript evaluation failed for {}", event.transcript_sid);
    }
    Ok(())
}

fn read_event<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read event from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {:?}", path))?
    };

    serde_json::from_str(&content).context("Failed to parse event JSON")
}
