//! Port for notifying users about swap activity.
//!
//! Delivery is fire-and-forget: services spawn the call and only log
//! failures.

use async_trait::async_trait;

use crate::domain::{SwapId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum SwapNotifierError {
        /// The delivery channel rejected or dropped the notification.
        Delivery { message: String } => "swap notification failed: {message}",
    }
}

/// What happened to the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapEvent {
    Requested,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl SwapEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

/// A notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapNotification {
    pub swap_id: SwapId,
    pub recipient: UserId,
    pub actor: UserId,
    pub event: SwapEvent,
}

/// Port for delivering swap notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapNotifier: Send + Sync {
    async fn notify(&self, notification: &SwapNotification) -> Result<(), SwapNotifierError>;
}

/// Notifier that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSwapNotifier;

#[async_trait]
impl SwapNotifier for NoOpSwapNotifier {
    async fn notify(&self, _notification: &SwapNotification) -> Result<(), SwapNotifierError> {
        Ok(())
    }
}
