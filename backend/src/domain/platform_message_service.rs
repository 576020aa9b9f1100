//! Platform message service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use tracing::info;

use crate::domain::admin_message::PUBLIC_MESSAGE_LIMIT;
use crate::domain::ports::{AdminMessageRepository, MessageFilter, PlatformMessages};
use crate::domain::{
    Actor, AdminMessage, AdminMessageUpdate, Error, MessageId, NewAdminMessage,
};

fn message_not_found(message_id: &MessageId) -> Error {
    Error::not_found(format!("message {message_id} not found"))
}

/// Service implementing [`PlatformMessages`].
#[derive(Clone)]
pub struct PlatformMessageService {
    messages: Arc<dyn AdminMessageRepository>,
    clock: Arc<dyn Clock>,
}

impl PlatformMessageService {
    pub fn new(messages: Arc<dyn AdminMessageRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { messages, clock }
    }
}

#[async_trait]
impl PlatformMessages for PlatformMessageService {
    async fn create(&self, actor: &Actor, input: NewAdminMessage) -> Result<AdminMessage, Error> {
        actor.require_admin()?;
        let message = AdminMessage::create(
            MessageId::random(),
            *actor.user_id(),
            input,
            self.clock.utc(),
        );
        self.messages.insert(&message).await?;
        info!(
            message_id = %message.id,
            message_type = %message.message_type,
            "platform message created"
        );
        Ok(message)
    }

    async fn list(
        &self,
        actor: &Actor,
        live_only: bool,
        page: PageParams,
    ) -> Result<Paginated<AdminMessage>, Error> {
        actor.require_admin()?;
        let filter = MessageFilter {
            live_at: live_only.then(|| self.clock.utc()),
        };
        Ok(self.messages.search(filter, page).await?)
    }

    async fn update(
        &self,
        actor: &Actor,
        message_id: &MessageId,
        update: AdminMessageUpdate,
    ) -> Result<AdminMessage, Error> {
        actor.require_admin()?;
        let mut message = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| message_not_found(message_id))?;
        message.apply_update(update, self.clock.utc());
        self.messages.update(&message).await?;
        info!(message_id = %message.id, "platform message updated");
        Ok(message)
    }

    async fn delete(&self, actor: &Actor, message_id: &MessageId) -> Result<(), Error> {
        actor.require_admin()?;
        if !self.messages.delete(message_id).await? {
            return Err(message_not_found(message_id));
        }
        info!(message_id = %message_id, "platform message deleted");
        Ok(())
    }

    async fn public(&self) -> Result<Vec<AdminMessage>, Error> {
        Ok(self
            .messages
            .latest_live(self.clock.utc(), PUBLIC_MESSAGE_LIMIT)
            .await?)
    }
}
