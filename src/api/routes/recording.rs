//! Recording status callback endpoint.
//!
//! - `POST /recording-status` - form-encoded `recordingStatusCallback`

use crate::api::error::ApiResult;
use crate::app::Pipeline;
use crate::recording::{GateOutcome, RecordingEvent};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::post,
    Form, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/recording-status", post(recording_status))
        .with_state(pipeline)
}

/// Runs the recording gate.
///
/// Params appended to the callback URL arrive in the query string and are
/// merged into the event, so eligibility rules can see them. Body fields
/// win on conflict.
///
/// # Response
/// `200` with `{status: "ignored" | "submitted", ...}`, or `500` when the
/// transcript request failed so the sender can redeliver.
async fn recording_status(
    State(pipeline): State<Arc<Pipeline>>,
    Query(query): Query<HashMap<String, String>>,
    Form(mut event): Form<RecordingEvent>,
) -> ApiResult<Json<GateOutcome>> {
    for (name, value) in query {
        event.params.entry(name).or_insert(Value::String(value));
    }

    let outcome = pipeline.gate.handle(&event).await?;
    Ok(Json(outcome))
}
