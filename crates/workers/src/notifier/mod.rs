mod channel;
mod dispatcher;
mod slack;

pub use channel::{Notifier, NotifyError};
pub use dispatcher::{ActionDispatcher, DispatchOutcome, MESSAGE_PARAM, WEBHOOK_URL_PARAM};
pub use slack::SlackNotifier;
