use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use super::server::AppState;
use crate::throttle::ThrottleSettings;

#[derive(Serialize)]
pub struct TestResponse {
    pub rule_id: String,
    pub allowed: bool,
}

#[derive(Serialize)]
pub struct ClearResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub cleared: usize,
}

pub async fn test_throttle(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Json<TestResponse> {
    let allowed = state.throttle.test(&rule_id);
    Json(TestResponse { rule_id, allowed })
}

pub async fn clear_throttle(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Json<ClearResponse> {
    let cleared = state.throttle.clear(&rule_id);
    Json(ClearResponse {
        rule_id: Some(rule_id),
        cleared,
    })
}

pub async fn clear_all(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(ClearResponse {
        rule_id: None,
        cleared: state.throttle.clear_all(),
    })
}

pub async fn config(State(state): State<AppState>) -> Json<ThrottleSettings> {
    Json(state.throttle.defaults())
}
