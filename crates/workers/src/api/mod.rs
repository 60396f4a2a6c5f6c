mod error;
mod health;
mod hints;
mod metrics;
mod rules;
mod server;
mod subscriptions;
mod throttle;

pub use error::ApiError;
pub use server::{router, serve, AppState};
