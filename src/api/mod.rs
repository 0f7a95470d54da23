use axum::{Router, routing::post};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
};

use crate::state::AppState;

pub mod handlers;
pub mod models;

pub fn create_router(state: AppState) -> Router {
    // Public demo endpoint: no origin restriction
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handlers::chat_handler))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(cors)
}
