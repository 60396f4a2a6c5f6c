use async_nats::{Client, Subscriber};
use futures::StreamExt;

use super::stream::{Broker, BrokerError, BrokerMessage, TopicStream};

#[derive(Clone)]
pub struct NatsBroker {
    client: Client,
}

impl NatsBroker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BrokerError(e.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait::async_trait]
impl Broker for NatsBroker {
    async fn subscribe(
        &self,
        topic: &str,
        consumer_group: &str,
    ) -> Result<Box<dyn TopicStream>, BrokerError> {
        let subscriber = self
            .client
            .queue_subscribe(topic.to_string(), consumer_group.to_string())
            .await
            .map_err(|e| BrokerError(e.to_string()))?;
        Ok(Box::new(NatsTopicStream { subscriber }))
    }
}

struct NatsTopicStream {
    subscriber: Subscriber,
}

#[async_trait::async_trait]
impl TopicStream for NatsTopicStream {
    async fn next_message(&mut self) -> Option<BrokerMessage> {
        let msg = self.subscriber.next().await?;
        Some(BrokerMessage::new(msg.subject.to_string(), msg.payload.to_vec()))
    }

    async fn close(&mut self) {
        if let Err(e) = self.subscriber.unsubscribe().await {
            tracing::warn!(error = %e, "NATS unsubscribe failed");
        }
    }
}
