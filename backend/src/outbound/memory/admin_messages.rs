//! In-memory `AdminMessageRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageParams, Paginated};

use crate::domain::ports::{AdminMessageRepository, AdminMessageRepositoryError, MessageFilter};
use crate::domain::{AdminMessage, MessageId};

use super::{PoisonedStore, Store, newest_first};

#[derive(Debug, Default)]
pub struct InMemoryAdminMessageRepository {
    messages: Store<MessageId, AdminMessage>,
}

impl InMemoryAdminMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(
        &self,
        filter: MessageFilter,
    ) -> Result<Vec<AdminMessage>, AdminMessageRepositoryError> {
        let mut messages = self
            .messages
            .collect(|message| filter.matches(message))
            .map_err(poisoned)?;
        newest_first(&mut messages, |message| (message.created_at, message.id));
        Ok(messages)
    }
}

fn poisoned(error: PoisonedStore) -> AdminMessageRepositoryError {
    AdminMessageRepositoryError::query(error.to_string())
}

#[async_trait]
impl AdminMessageRepository for InMemoryAdminMessageRepository {
    async fn insert(&self, message: &AdminMessage) -> Result<(), AdminMessageRepositoryError> {
        self.messages
            .with(|messages| {
                messages.insert(message.id, message.clone());
            })
            .map_err(poisoned)
    }

    async fn find_by_id(
        &self,
        id: &MessageId,
    ) -> Result<Option<AdminMessage>, AdminMessageRepositoryError> {
        self.messages
            .with(|messages| messages.get(id).cloned())
            .map_err(poisoned)
    }

    async fn update(&self, message: &AdminMessage) -> Result<(), AdminMessageRepositoryError> {
        self.messages
            .with(|messages| {
                if let Some(stored) = messages.get_mut(&message.id) {
                    *stored = message.clone();
                }
            })
            .map_err(poisoned)
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, AdminMessageRepositoryError> {
        self.messages
            .with(|messages| messages.remove(id).is_some())
            .map_err(poisoned)
    }

    async fn search(
        &self,
        filter: MessageFilter,
        page: PageParams,
    ) -> Result<Paginated<AdminMessage>, AdminMessageRepositoryError> {
        Ok(Paginated::from_all(self.matching(filter)?, page))
    }

    async fn latest_live(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AdminMessage>, AdminMessageRepositoryError> {
        let mut live = self.matching(MessageFilter { live_at: Some(now) })?;
        live.truncate(limit);
        Ok(live)
    }
}
