//! Port for platform message persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageParams, Paginated};
use tracing::warn;

use crate::domain::{AdminMessage, Error, MessageId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by platform message repository adapters.
    pub enum AdminMessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "message repository query failed: {message}",
    }
}

impl From<AdminMessageRepositoryError> for Error {
    fn from(value: AdminMessageRepositoryError) -> Self {
        match value {
            AdminMessageRepositoryError::Connection { message } => {
                warn!(%message, "message store unavailable");
                Error::service_unavailable("message store unavailable")
            }
            AdminMessageRepositoryError::Query { message } => {
                Error::internal(format!("message store error: {message}"))
            }
        }
    }
}

/// Selection criteria for platform message listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Only messages live at this instant.
    pub live_at: Option<DateTime<Utc>>,
}

impl MessageFilter {
    pub fn matches(&self, message: &AdminMessage) -> bool {
        self.live_at.is_none_or(|now| message.is_live(now))
    }
}

/// Port for reading and writing platform messages.
///
/// Listings are ordered newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminMessageRepository: Send + Sync {
    async fn insert(&self, message: &AdminMessage) -> Result<(), AdminMessageRepositoryError>;

    async fn find_by_id(
        &self,
        id: &MessageId,
    ) -> Result<Option<AdminMessage>, AdminMessageRepositoryError>;

    async fn update(&self, message: &AdminMessage) -> Result<(), AdminMessageRepositoryError>;

    /// Remove a message. Returns whether it existed.
    async fn delete(&self, id: &MessageId) -> Result<bool, AdminMessageRepositoryError>;

    /// One page of matching messages.
    async fn search(
        &self,
        filter: MessageFilter,
        page: PageParams,
    ) -> Result<Paginated<AdminMessage>, AdminMessageRepositoryError>;

    /// The newest `limit` messages live at `now`.
    async fn latest_live(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AdminMessage>, AdminMessageRepositoryError>;
}
