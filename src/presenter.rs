//! Failure-message extraction and display.
//!
//! Loader failures are never silently swallowed: they are reduced to a
//! list of human-readable messages and handed to an [`ErrorPresenter`].
//! Hosts with a toast/banner surface implement the trait; the default
//! [`TracingPresenter`] logs each message.

use crate::error::LoaderError;

/// Displays failure messages to the user.
pub trait ErrorPresenter: Send + Sync {
    fn show(&self, messages: &[String]);
}

/// Reduce a loader failure to its constituent human-readable messages.
///
/// Service failures carry a message list already; everything else
/// reduces to a single message. Blank messages are dropped.
pub fn reduce_errors(error: &LoaderError) -> Vec<String> {
    let messages = match error {
        LoaderError::Service { messages } => messages.clone(),
        other => vec![other.to_string()],
    };
    messages
        .into_iter()
        .filter(|m| !m.trim().is_empty())
        .collect()
}

/// Default presenter: one `tracing::error!` per message.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPresenter;

impl ErrorPresenter for TracingPresenter {
    fn show(&self, messages: &[String]) {
        for message in messages {
            tracing::error!(%message, "field catalog load failed");
        }
    }
}
