#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl BrokerMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

#[async_trait::async_trait]
pub trait Broker: Send + Sync {
    async fn subscribe(
        &self,
        topic: &str,
        consumer_group: &str,
    ) -> Result<Box<dyn TopicStream>, BrokerError>;
}

#[async_trait::async_trait]
pub trait TopicStream: Send {
    async fn next_message(&mut self) -> Option<BrokerMessage>;
    async fn close(&mut self);
}

#[derive(Debug)]
pub struct BrokerError(pub String);

impl std::fmt::Display for BrokerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "broker: {}", self.0)
    }
}

impl std::error::Error for BrokerError {}
