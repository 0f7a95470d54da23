use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::any::Any;
use std::time::Instant;

use crate::error::PipelineError;
use crate::state::AppState;

use super::models::{ChatResponse, message_from};

/// POST /chat. Always answers 200 with a `response` string; failures are
/// described inside it.
pub async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Json<ChatResponse> {
    let start = Instant::now();

    let request: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("unreadable chat request body: {e}");
            return Json(ChatResponse::from_result(
                Err(PipelineError::Internal(e.to_string())),
                state.structured_errors,
            ));
        }
    };

    let message = message_from(&request);
    let result = state.pipeline.answer(message).await;
    if let Err(e) = &result {
        log::info!("chat request ended with {:?}", e.kind());
    }
    log::info!("chat handled in {} ms", start.elapsed().as_millis());

    Json(ChatResponse::from_result(result, state.structured_errors))
}

/// Turns a handler panic into the usual 200 `[Server Error]` body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    log::error!("handler panicked: {detail}");
    Json(ChatResponse::from_result(
        Err(PipelineError::Internal(detail)),
        false,
    ))
    .into_response()
}
