pub const DEFAULT_NATS_URL: &str = "nats://127.0.0.1:4222";
pub const DEFAULT_CONSUMER_GROUP: &str = "tripwire-notifier";

pub fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && !topic.chars().any(|c| c.is_whitespace() || c == '*' || c == '>')
        && topic.split('.').all(|token| !token.is_empty())
}
