mod manager;
mod reconciler;
mod worker;

pub use manager::{ReconcileReport, SubscriptionManager};
pub use reconciler::{Reconciler, TopicHint, TopicHints};
pub use worker::TopicWorker;

use crate::broker::BrokerMessage;

#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: BrokerMessage);
}
