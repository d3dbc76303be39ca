use async_trait::async_trait;
use std::fmt::Debug;
use tracing::info;

use crate::{error::RequestError, model::SentMessage};

pub mod twilio;

#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Send `message` to the configured destination.
    async fn send(&self, message: &str) -> Result<SentMessage, RequestError>;
}

/// Logs the message instead of sending it. Used for `--dry-run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<SentMessage, RequestError> {
        info!(%message, "dry run, message not sent");
        Ok(SentMessage {
            sid: "dry-run".to_string(),
            status: "skipped".to_string(),
            created_at: None,
        })
    }
}
