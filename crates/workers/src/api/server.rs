use axum::extract::FromRef;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::{health, hints, metrics, rules, subscriptions, throttle};
use crate::metrics::worker_metrics::WorkerMetrics;
use crate::store::RuleStore;
use crate::subscription::{SubscriptionManager, TopicHints};
use crate::throttle::ThrottleRegistry;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<WorkerMetrics>,
    pub manager: Arc<SubscriptionManager>,
    pub throttle: Arc<ThrottleRegistry>,
    pub rules: RuleStore,
    pub hints: TopicHints,
}

impl FromRef<AppState> for Arc<WorkerMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::metrics))
        .route("/v1/subscriptions", get(subscriptions::list_subscriptions))
        .route("/v1/hints/topic-added/{topic}", post(hints::topic_added))
        .route("/v1/hints/topic-removed/{topic}", post(hints::topic_removed))
        .route("/v1/throttle", delete(throttle::clear_all))
        .route("/v1/throttle/config", get(throttle::config))
        .route("/v1/throttle/{rule_id}/test", post(throttle::test_throttle))
        .route("/v1/throttle/{rule_id}/clear", post(throttle::clear_throttle))
        .route("/v1/rules", get(rules::list_rules).post(rules::create_rule))
        .route(
            "/v1/rules/{rule_id}",
            get(rules::get_rule)
                .put(rules::update_rule)
                .delete(rules::delete_rule),
        )
        .route("/v1/rules/{rule_id}/toggle", post(rules::toggle_rule))
        .with_state(state)
}

pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
