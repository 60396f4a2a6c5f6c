use axum::extract::{Path, State};
use axum::http::StatusCode;
use tripwire_common::nats_config::is_valid_topic;

use super::error::ApiError;
use super::server::AppState;
use crate::store::ConfigError;

pub async fn topic_added(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<StatusCode, ApiError> {
    ensure_valid(&topic)?;
    state.hints.notify_topic_added(&topic);
    Ok(StatusCode::ACCEPTED)
}

pub async fn topic_removed(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<StatusCode, ApiError> {
    ensure_valid(&topic)?;
    state.hints.notify_topic_removed(&topic);
    Ok(StatusCode::ACCEPTED)
}

fn ensure_valid(topic: &str) -> Result<(), ApiError> {
    if is_valid_topic(topic) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTopic(topic.to_string()).into())
    }
}
