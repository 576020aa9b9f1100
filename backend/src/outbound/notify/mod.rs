//! Notification adapters.
//!
//! Email delivery is an external collaborator; the shipped adapter records
//! each notification as a structured log event that a log shipper can route.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{SwapNotification, SwapNotifier, SwapNotifierError};

/// Notifier that emits one `info` event per notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSwapNotifier;

#[async_trait]
impl SwapNotifier for LoggingSwapNotifier {
    async fn notify(&self, notification: &SwapNotification) -> Result<(), SwapNotifierError> {
        let SwapNotification {
            swap_id,
            recipient,
            actor,
            event,
        } = notification;
        info!(
            swap_id = %swap_id,
            recipient = %recipient,
            actor = %actor,
            event = event.as_str(),
            "swap notification"
        );
        Ok(())
    }
}
