use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::metrics::exposition::render_prometheus;
use crate::metrics::worker_metrics::WorkerMetrics;

pub async fn metrics(State(m): State<Arc<WorkerMetrics>>) -> impl IntoResponse {
    let body = render_prometheus(&m);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
