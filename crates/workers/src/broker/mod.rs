mod in_memory;
mod nats;
mod stream;

pub use in_memory::InMemoryBroker;
pub use nats::NatsBroker;
pub use stream::{Broker, BrokerError, BrokerMessage, TopicStream};
