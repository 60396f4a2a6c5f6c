use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::server::AppState;

#[derive(Serialize)]
pub struct SubscriptionsResponse {
    pub consumer_group: String,
    pub topics: Vec<String>,
}

pub async fn list_subscriptions(State(state): State<AppState>) -> Json<SubscriptionsResponse> {
    Json(SubscriptionsResponse {
        consumer_group: state.manager.consumer_group().to_string(),
        topics: state.manager.active_subscriptions().into_iter().collect(),
    })
}
