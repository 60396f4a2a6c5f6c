pub mod api;
pub mod broker;
pub mod config;
pub mod metrics;
pub mod notifier;
pub mod processor;
pub mod run;
pub mod shutdown;
pub mod store;
pub mod subscription;
pub mod throttle;
