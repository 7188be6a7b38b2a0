//! Notifier port: human-facing messages (chat, push, …).

use std::future::Future;
use std::sync::Arc;

use climatehub_domain::error::ClimateError;

/// Delivers a message to the household.
pub trait Notifier {
    /// Send `message` to every recipient.
    fn notify(&self, message: String) -> impl Future<Output = Result<(), ClimateError>> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for Arc<T> {
    fn notify(&self, message: String) -> impl Future<Output = Result<(), ClimateError>> + Send {
        (**self).notify(message)
    }
}
