use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use reloadq_core::ReloadStats;
use serde::Serialize;
use tracing::error;

use super::HttpState;

#[derive(Serialize)]
pub(crate) struct Health {
    status: &'static str,
}

pub(crate) async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub(crate) async fn stats(State(state): State<HttpState>) -> Json<ReloadStats> {
    Json(state.queue.stats())
}

pub(crate) async fn prometheus(State(state): State<HttpState>) -> Response {
    let Some(metrics) = state.prometheus.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics.content_type())], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render prometheus metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
