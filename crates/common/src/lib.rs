pub mod evaluator;
pub mod expression;
pub mod message;
pub mod nats_config;
pub mod rule;
pub mod template;
