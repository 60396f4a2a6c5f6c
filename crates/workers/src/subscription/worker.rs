use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::MessageHandler;
use crate::broker::TopicStream;

pub struct TopicWorker {
    topic: String,
    cancel: CancellationToken,
    finished: CancellationToken,
    handle: JoinHandle<()>,
    started_at: Instant,
}

impl TopicWorker {
    pub fn spawn(
        topic: String,
        mut stream: Box<dyn TopicStream>,
        handler: Arc<dyn MessageHandler>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();

        let task_cancel = cancel.clone();
        let done = finished.clone().drop_guard();
        let task_topic = topic.clone();
        let handle = tokio::spawn(async move {
            let _done = done;
            loop {
                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => break,
                    next = stream.next_message() => match next {
                        Some(message) => handler.handle(message).await,
                        None => {
                            tracing::warn!(topic = %task_topic, "topic stream ended");
                            break;
                        }
                    },
                }
            }
            stream.close().await;
            tracing::debug!(topic = %task_topic, "topic worker stopped");
        });

        Self {
            topic,
            cancel,
            finished,
            handle,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }

    pub async fn stop(&self, timeout: Duration) -> bool {
        self.cancel.cancel();
        if tokio::time::timeout(timeout, self.finished.cancelled())
            .await
            .is_ok()
        {
            return true;
        }

        tracing::warn!(
            topic = %self.topic,
            timeout_ms = timeout.as_millis() as u64,
            "topic worker did not stop in time, aborting"
        );
        self.handle.abort();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{Broker, BrokerMessage, InMemoryBroker};
    use tokio::sync::{mpsc, Notify};

    struct Forward(mpsc::UnboundedSender<BrokerMessage>);

    #[async_trait::async_trait]
    impl MessageHandler for Forward {
        async fn handle(&self, message: BrokerMessage) {
            let _ = self.0.send(message);
        }
    }

    struct Stuck(Arc<Notify>);

    #[async_trait::async_trait]
    impl MessageHandler for Stuck {
        async fn handle(&self, _message: BrokerMessage) {
            self.0.notify_one();
            std::future::pending::<()>().await;
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_stops() {
        let broker = InMemoryBroker::new();
        let stream = broker.subscribe("t", "g").await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = TopicWorker::spawn("t".into(), stream, Arc::new(Forward(tx)));

        for i in 0..5 {
            broker.publish("t", i.to_string());
        }
        for i in 0..5 {
            assert_eq!(rx.recv().await.unwrap().text(), i.to_string());
        }

        assert!(worker.stop(Duration::from_secs(1)).await);
        assert!(worker.is_finished());
        assert_eq!(broker.subscriber_count("t"), 0);
        assert_eq!(broker.close_calls(), 1);
    }

    #[tokio::test]
    async fn stream_end_marks_worker_finished() {
        let broker = InMemoryBroker::new();
        let stream = broker.subscribe("t", "g").await.unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let worker = TopicWorker::spawn("t".into(), stream, Arc::new(Forward(tx)));

        broker.disconnect("t");
        tokio::time::timeout(Duration::from_secs(1), async {
            while !worker.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn hung_handler_is_aborted_after_timeout() {
        let broker = InMemoryBroker::new();
        let stream = broker.subscribe("t", "g").await.unwrap();
        let entered = Arc::new(Notify::new());
        let worker = TopicWorker::spawn("t".into(), stream, Arc::new(Stuck(entered.clone())));

        broker.publish("t", "x");
        entered.notified().await;

        assert!(!worker.stop(Duration::from_millis(50)).await);
        tokio::time::timeout(Duration::from_secs(1), async {
            while !worker.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }
}
