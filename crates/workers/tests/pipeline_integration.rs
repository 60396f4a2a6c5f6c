use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use tripwire_common::rule::NewRule;
use tripwire_workers::broker::InMemoryBroker;
use tripwire_workers::config::WorkerConfig;
use tripwire_workers::notifier::SlackNotifier;
use tripwire_workers::run::Components;

type Inbox = Arc<Mutex<Vec<Value>>>;

async fn record(State(inbox): State<Inbox>, Json(body): Json<Value>) -> StatusCode {
    inbox.lock().await.push(body);
    StatusCode::OK
}

async fn reject() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn fake_slack() -> (SocketAddr, Inbox) {
    let inbox: Inbox = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/hook", post(record))
        .route("/broken", post(reject))
        .with_state(inbox.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, inbox)
}

fn slack_rule(name: &str, topic: &str, rule: Value, webhook: &str, message: &str) -> NewRule {
    serde_json::from_value(json!({
        "name": name,
        "topic": topic,
        "rule": rule,
        "actions": [{
            "type": "call",
            "params": {"provider": "SLACK", "webhookURL": webhook, "message": message}
        }]
    }))
    .unwrap()
}

fn components(broker: &InMemoryBroker) -> Components {
    let mut config = WorkerConfig::default();
    config.reconcile.interval_seconds = 3600;
    config.reconcile.stop_timeout_seconds = 2;
    let slack = Arc::new(SlackNotifier::new(Duration::from_secs(2)).unwrap());
    Components::build(&config, Arc::new(broker.clone()), slack)
}

async fn eventually<F: Fn() -> bool>(what: &str, check: F) {
    let ok = tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(ok.is_ok(), "timed out waiting for {what}");
}

#[tokio::test]
async fn matching_message_reaches_webhook_once_per_window() {
    let (addr, inbox) = fake_slack().await;
    let broker = InMemoryBroker::new();
    let c = components(&broker);

    c.rules
        .create(slack_rule(
            "high-cpu",
            "metrics.cpu",
            json!({"$gt": {"$field": "cpu", "$value": 80}}),
            &format!("http://{addr}/hook"),
            "CPU ${cpu} on ${host.name}",
        ))
        .await
        .unwrap();

    let shutdown = CancellationToken::new();
    let manager = c.manager.clone();
    let metrics = c.metrics.clone();
    let handle = c.reconciler.spawn(shutdown.clone());
    eventually("subscription", || manager.is_subscribed("metrics.cpu")).await;

    assert_eq!(broker.publish("metrics.cpu", r#"{"cpu": 50, "host": {"name": "web-1"}}"#), 1);
    assert_eq!(broker.publish("metrics.cpu", r#"{"cpu": 91, "host": {"name": "web-1"}}"#), 1);
    assert_eq!(broker.publish("metrics.cpu", r#"{"cpu": 95, "host": {"name": "web-1"}}"#), 1);

    eventually("third message throttled", || metrics.notifications_throttled_val() == 1).await;
    assert_eq!(metrics.messages_received_val(), 3);
    assert_eq!(metrics.rules_matched_val(), 2);
    assert_eq!(metrics.notifications_sent_val(), 1);
    assert_eq!(metrics.notifications_throttled_val(), 1);

    let received = inbox.lock().await.clone();
    assert_eq!(received, vec![json!({"text": "CPU 91 on web-1"})]);

    shutdown.cancel();
    handle.await.unwrap();
    manager.shutdown().await;
}

#[tokio::test]
async fn disabling_rule_via_hint_stops_consumption() {
    let (addr, _inbox) = fake_slack().await;
    let broker = InMemoryBroker::new();
    let c = components(&broker);

    let rule = c
        .rules
        .create(slack_rule(
            "any",
            "events",
            json!({"$contains": {"$value": "error"}}),
            &format!("http://{addr}/hook"),
            "${value}",
        ))
        .await
        .unwrap();

    let shutdown = CancellationToken::new();
    let manager = c.manager.clone();
    let handle = c.reconciler.spawn(shutdown.clone());
    eventually("subscription", || manager.is_subscribed("events")).await;

    let change = c.rules.toggle(&rule.id).await.unwrap();
    c.hints.notify_topic_removed(change.topic_removed().unwrap());
    eventually("unsubscribe", || !manager.is_subscribed("events")).await;
    assert_eq!(broker.subscriber_count("events"), 0);
    assert_eq!(broker.publish("events", "error again"), 0);

    c.rules.toggle(&rule.id).await.unwrap();
    c.hints.notify_topic_added("events");
    eventually("resubscribe", || manager.is_subscribed("events")).await;

    shutdown.cancel();
    handle.await.unwrap();
    manager.shutdown().await;
}

#[tokio::test]
async fn webhook_failure_is_counted_and_flow_continues() {
    let (addr, inbox) = fake_slack().await;
    let broker = InMemoryBroker::new();
    let c = components(&broker);

    c.rules
        .create(slack_rule(
            "broken",
            "logs",
            json!({"$in": {"$field": "level", "$values": ["ERROR", "FATAL"]}}),
            &format!("http://{addr}/broken"),
            "${level}",
        ))
        .await
        .unwrap();
    c.rules
        .create(slack_rule(
            "working",
            "logs",
            json!({"$eq": {"$field": "level", "$value": "FATAL"}}),
            &format!("http://{addr}/hook"),
            "fatal: ${msg}",
        ))
        .await
        .unwrap();

    let shutdown = CancellationToken::new();
    let manager = c.manager.clone();
    let metrics = c.metrics.clone();
    let handle = c.reconciler.spawn(shutdown.clone());
    eventually("subscription", || manager.is_subscribed("logs")).await;

    broker.publish("logs", r#"{"level": "FATAL", "msg": "disk gone"}"#);
    eventually("both actions attempted", || {
        metrics.notifications_failed_val() + metrics.notifications_sent_val() == 2
    })
    .await;

    assert_eq!(metrics.notifications_failed_val(), 1);
    assert_eq!(metrics.notifications_sent_val(), 1);
    assert_eq!(inbox.lock().await.clone(), vec![json!({"text": "fatal: disk gone"})]);

    shutdown.cancel();
    handle.await.unwrap();
    manager.shutdown().await;
}

#[tokio::test]
async fn topics_are_consumed_independently() {
    let (addr, inbox) = fake_slack().await;
    let broker = InMemoryBroker::new();
    broker.reject_topic("down");
    let c = components(&broker);

    for topic in ["up", "down"] {
        c.rules
            .create(slack_rule(
                topic,
                topic,
                json!({"$gte": {"$value": 1}}),
                &format!("http://{addr}/hook"),
                "${value}",
            ))
            .await
            .unwrap();
    }

    let report = c.reconciler.reconcile_once().await.unwrap();
    assert_eq!(report.added, vec!["up".to_string()]);
    assert_eq!(report.failed, vec!["down".to_string()]);
    assert_eq!(c.metrics.subscribe_failures_val(), 1);

    broker.publish("up", "7");
    let metrics = c.metrics.clone();
    eventually("delivery", || metrics.notifications_sent_val() == 1).await;
    assert_eq!(inbox.lock().await.clone(), vec![json!({"text": "7"})]);

    broker.accept_topic("down");
    let report = c.reconciler.reconcile_once().await.unwrap();
    assert_eq!(report.added, vec!["down".to_string()]);
    assert_eq!(c.manager.active_subscriptions().len(), 2);

    c.manager.shutdown().await;
}
