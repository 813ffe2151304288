//! Transcript-ready webhook endpoint.
//!
//! - `POST /transcript-events` - JSON event from Intelligence

use crate::app::Pipeline;
use crate::transcript::TranscriptReadyEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use std::sync::Arc;

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/transcript-events", post(transcript_event))
        .with_state(pipeline)
}

async fn transcript_event(
    State(pipeline): State<Arc<Pipeline>>,
    Json(event): Json<TranscriptReadyEvent>,
) -> Response {
    let evaluation = pipeline.evaluator.handle(&event).await;
    let status =
        StatusCode::from_u16(evaluation.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(evaluation.body())).into_response()
}
