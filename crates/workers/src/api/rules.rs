use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tripwire_common::rule::{NewRule, RuleConfiguration};

use super::error::ApiError;
use super::server::AppState;
use crate::store::RuleChange;
use crate::subscription::TopicHints;

#[derive(Deserialize)]
pub struct ListQuery {
    pub topic: Option<String>,
}

pub async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<RuleConfiguration>> {
    let rules = match query.topic {
        Some(topic) => state.rules.list_by_topic(&topic),
        None => state.rules.list(),
    };
    Json(rules)
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<Json<RuleConfiguration>, StatusCode> {
    state
        .rules
        .get(&rule_id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn create_rule(
    State(state): State<AppState>,
    Json(body): Json<NewRule>,
) -> Result<(StatusCode, Json<RuleConfiguration>), ApiError> {
    let created = state.rules.create(body).await?;
    if created.enabled {
        state.hints.notify_topic_added(&created.topic);
    }
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    Json(body): Json<NewRule>,
) -> Result<Json<RuleConfiguration>, ApiError> {
    let change = state.rules.update(&rule_id, body).await?;
    announce(&change, &state.hints);
    if let Some(after) = &change.after {
        let current = state
            .throttle
            .effective(after.throttle_period(), after.throttle_permits);
        state.throttle.forget_stale(&after.id, current);
    }
    change
        .after
        .map(Json)
        .ok_or_else(|| crate::store::ConfigError::NotFound(rule_id).into())
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let change = state.rules.delete(&rule_id).await?;
    announce(&change, &state.hints);
    state.throttle.clear(&rule_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<Json<RuleConfiguration>, ApiError> {
    let change = state.rules.toggle(&rule_id).await?;
    announce(&change, &state.hints);
    change
        .after
        .map(Json)
        .ok_or_else(|| crate::store::ConfigError::NotFound(rule_id).into())
}

fn announce(change: &RuleChange, hints: &TopicHints) {
    if let Some(topic) = change.topic_added() {
        hints.notify_topic_added(topic);
    }
    if let Some(topic) = change.topic_removed() {
        hints.notify_topic_removed(topic);
    }
}
