use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::mpsc;

use super::stream::{Broker, BrokerError, BrokerMessage, TopicStream};

#[derive(Clone, Default)]
pub struct InMemoryBroker {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    topics: DashMap<String, TopicState>,
    rejected: DashSet<String>,
    next_id: AtomicU64,
    subscribe_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

#[derive(Default)]
struct TopicState {
    members: Vec<Member>,
    cursor: usize,
}

struct Member {
    id: u64,
    group: String,
    tx: mpsc::UnboundedSender<BrokerMessage>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, topic: &str, payload: impl Into<Vec<u8>>) -> usize {
        let Some(mut state) = self.inner.topics.get_mut(topic) else {
            return 0;
        };
        state.members.retain(|m| !m.tx.is_closed());

        let mut groups: Vec<String> = state.members.iter().map(|m| m.group.clone()).collect();
        groups.sort();
        groups.dedup();

        let cursor = state.cursor;
        state.cursor = state.cursor.wrapping_add(1);

        let message = BrokerMessage::new(topic, payload);
        let mut delivered = 0;
        for group in &groups {
            let members: Vec<&Member> = state.members.iter().filter(|m| &m.group == group).collect();
            let Some(member) = members.get(cursor % members.len().max(1)) else {
                continue;
            };
            if member.tx.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn reject_topic(&self, topic: &str) {
        self.inner.rejected.insert(topic.to_string());
    }

    pub fn accept_topic(&self, topic: &str) {
        self.inner.rejected.remove(topic);
    }

    pub fn disconnect(&self, topic: &str) {
        self.inner.topics.remove(topic);
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .topics
            .get(topic)
            .map(|s| s.members.iter().filter(|m| !m.tx.is_closed()).count())
            .unwrap_or(0)
    }

    pub fn subscribe_calls(&self) -> usize {
        self.inner.subscribe_calls.load(Ordering::Relaxed)
    }

    pub fn close_calls(&self) -> usize {
        self.inner.close_calls.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl Broker for InMemoryBroker {
    async fn subscribe(
        &self,
        topic: &str,
        consumer_group: &str,
    ) -> Result<Box<dyn TopicStream>, BrokerError> {
        self.inner.subscribe_calls.fetch_add(1, Ordering::Relaxed);
        if self.inner.rejected.contains(topic) {
            return Err(BrokerError(format!("topic '{topic}' unavailable")));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .topics
            .entry(topic.to_string())
            .or_default()
            .members
            .push(Member {
                id,
                group: consumer_group.to_string(),
                tx,
            });

        Ok(Box::new(InMemoryTopicStream {
            id,
            topic: topic.to_string(),
            rx,
            inner: self.inner.clone(),
        }))
    }
}

struct InMemoryTopicStream {
    id: u64,
    topic: String,
    rx: mpsc::UnboundedReceiver<BrokerMessage>,
    inner: Arc<Inner>,
}

#[async_trait::async_trait]
impl TopicStream for InMemoryTopicStream {
    async fn next_message(&mut self) -> Option<BrokerMessage> {
        self.rx.recv().await
    }

    async fn close(&mut self) {
        self.rx.close();
        if let Some(mut state) = self.inner.topics.get_mut(&self.topic) {
            state.members.retain(|m| m.id != self.id);
        }
        self.inner.close_calls.fetch_add(1, Ordering::Relaxed);
    }
}
