//! Notifier that writes messages to the log.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use climatehub_app::ports::Notifier;
use climatehub_domain::error::ClimateError;

/// Number of recent messages kept by [`TracingNotifier`].
pub const HISTORY_CAPACITY: usize = 32;

/// Logs every message at `info` and keeps the most recent ones.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    delivered: Mutex<VecDeque<String>>,
}

impl TracingNotifier {
    /// The last [`HISTORY_CAPACITY`] messages, oldest first.
    #[must_use]
    pub fn delivered(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, message: String) -> impl Future<Output = Result<(), ClimateError>> + Send {
        tracing::info!(%message, "notification");
        let mut delivered = self
            .delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if delivered.len() == HISTORY_CAPACITY {
            delivered.pop_front();
        }
        delivered.push_back(message);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_keep_delivered_messages() {
        let notifier = TracingNotifier::default();
        notifier.notify("Mode set to away".to_string()).await.unwrap();
        notifier.notify("Mode set to home".to_string()).await.unwrap();
        assert_eq!(
            notifier.delivered(),
            vec!["Mode set to away".to_string(), "Mode set to home".to_string()]
        );
    }

    #[tokio::test]
    async fn should_keep_only_recent_messages() {
        let notifier = TracingNotifier::default();
        for n in 0..HISTORY_CAPACITY + 5 {
            notifier.notify(format!("message {n}")).await.unwrap();
        }
        let delivered = notifier.delivered();
        assert_eq!(delivered.len(), HISTORY_CAPACITY);
        assert_eq!(delivered[0], "message 5");
        assert_eq!(
            delivered.last().map(String::as_str),
            Some(format!("message {}", HISTORY_CAPACITY + 4).as_str())
        );
    }
}
