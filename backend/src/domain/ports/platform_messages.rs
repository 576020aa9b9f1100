//! Driving port for platform messages.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::{Actor, AdminMessage, AdminMessageUpdate, Error, MessageId, NewAdminMessage};

/// Driving port for managing and reading platform messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformMessages: Send + Sync {
    async fn create(&self, actor: &Actor, input: NewAdminMessage) -> Result<AdminMessage, Error>;

    /// All messages, or only live ones, newest first. Admin only.
    async fn list(
        &self,
        actor: &Actor,
        live_only: bool,
        page: PageParams,
    ) -> Result<Paginated<AdminMessage>, Error>;

    async fn update(
        &self,
        actor: &Actor,
        message_id: &MessageId,
        update: AdminMessageUpdate,
    ) -> Result<AdminMessage, Error>;

    async fn delete(&self, actor: &Actor, message_id: &MessageId) -> Result<(), Error>;

    /// The newest live messages, shown to everyone.
    async fn public(&self) -> Result<Vec<AdminMessage>, Error>;
}
