//! PostgreSQL-backed `AdminMessageRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{PageParams, Paginated};

use crate::domain::ports::{AdminMessageRepository, AdminMessageRepositoryError, MessageFilter};
use crate::domain::{AdminMessage, MessageContent, MessageId, MessageTitle, MessageType, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error, to_i64, to_u64};
use super::models::{AdminMessageChangeset, AdminMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::admin_messages;

/// Diesel-backed implementation of the platform message repository port.
#[derive(Clone)]
pub struct DieselAdminMessageRepository {
    pool: DbPool,
}

impl DieselAdminMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AdminMessageRepositoryError {
    map_pool_error(error, AdminMessageRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AdminMessageRepositoryError {
    map_diesel_error(
        error,
        AdminMessageRepositoryError::query,
        AdminMessageRepositoryError::connection,
    )
}

fn corrupt(error: impl std::fmt::Display) -> AdminMessageRepositoryError {
    AdminMessageRepositoryError::query(format!("invalid stored message: {error}"))
}

fn row_to_message(row: AdminMessageRow) -> Result<AdminMessage, AdminMessageRepositoryError> {
    let AdminMessageRow {
        id,
        title,
        content,
        message_type,
        is_active,
        expires_at,
        created_by,
        created_at,
        updated_at,
    } = row;
    Ok(AdminMessage {
        id: MessageId::from_uuid(id),
        title: MessageTitle::new(title).map_err(corrupt)?,
        content: MessageContent::new(content).map_err(corrupt)?,
        message_type: message_type.parse::<MessageType>().map_err(corrupt)?,
        is_active,
        expires_at,
        created_by: UserId::from_uuid(created_by),
        created_at,
        updated_at,
    })
}

fn message_to_row(message: &AdminMessage) -> AdminMessageRow {
    AdminMessageRow {
        id: *message.id.as_uuid(),
        title: message.title.as_ref().to_owned(),
        content: message.content.as_ref().to_owned(),
        message_type: message.message_type.as_str().to_owned(),
        is_active: message.is_active,
        expires_at: message.expires_at,
        created_by: *message.created_by.as_uuid(),
        created_at: message.created_at,
        updated_at: message.updated_at,
    }
}

/// Messages that are active and unexpired at `now`.
fn live_at(now: DateTime<Utc>) -> admin_messages::BoxedQuery<'static, Pg> {
    admin_messages::table
        .filter(admin_messages::is_active.eq(true))
        .filter(
            admin_messages::expires_at
                .is_null()
                .or(admin_messages::expires_at.assume_not_null().gt(now)),
        )
        .into_boxed()
}

fn filtered(filter: MessageFilter) -> admin_messages::BoxedQuery<'static, Pg> {
    match filter.live_at {
        Some(now) => live_at(now),
        None => admin_messages::table.into_boxed(),
    }
}

#[async_trait]
impl AdminMessageRepository for DieselAdminMessageRepository {
    async fn insert(&self, message: &AdminMessage) -> Result<(), AdminMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(admin_messages::table)
            .values(&message_to_row(message))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &MessageId,
    ) -> Result<Option<AdminMessage>, AdminMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        admin_messages::table
            .find(*id.as_uuid())
            .select(AdminMessageRow::as_select())
            .first::<AdminMessageRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_message)
            .transpose()
    }

    async fn update(&self, message: &AdminMessage) -> Result<(), AdminMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = AdminMessageChangeset {
            title: message.title.as_ref(),
            content: message.content.as_ref(),
            message_type: message.message_type.as_str(),
            is_active: message.is_active,
            expires_at: message.expires_at,
            updated_at: message.updated_at,
        };
        diesel::update(admin_messages::table.find(*message.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, AdminMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(admin_messages::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(removed > 0)
    }

    async fn search(
        &self,
        filter: MessageFilter,
        page: PageParams,
    ) -> Result<Paginated<AdminMessage>, AdminMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;
        let items = filtered(filter)
            .select(AdminMessageRow::as_select())
            .order_by((admin_messages::created_at.desc(), admin_messages::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(to_i64(page.offset()))
            .load::<AdminMessageRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, to_u64(total), page))
    }

    async fn latest_live(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AdminMessage>, AdminMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        live_at(now)
            .select(AdminMessageRow::as_select())
            .order_by((admin_messages::created_at.desc(), admin_messages::id.desc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load::<AdminMessageRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_message)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewAdminMessage;
    use crate::test_support::fixed_now;
    use rstest::rstest;

    #[rstest]
    fn rows_round_trip_through_the_domain() {
        let message = AdminMessage::create(
            MessageId::random(),
            UserId::random(),
            NewAdminMessage {
                title: MessageTitle::new("Maintenance").expect("valid title"),
                content: MessageContent::new("Down for ten minutes at noon").expect("valid content"),
                message_type: MessageType::Warning,
                expires_at: Some(fixed_now()),
            },
            fixed_now(),
        );
        let row = message_to_row(&message);
        assert_eq!(row.message_type, "warning");
        assert_eq!(row_to_message(row).expect("valid row"), message);
    }

    #[rstest]
    fn blank_titles_are_query_errors() {
        let mut row = message_to_row(&AdminMessage::create(
            MessageId::random(),
            UserId::random(),
            NewAdminMessage {
                title: MessageTitle::new("Hello").expect("valid title"),
                content: MessageContent::new("Welcome").expect("valid content"),
                message_type: MessageType::Info,
                expires_at: None,
            },
            fixed_now(),
        ));
        row.title = "   ".to_owned();
        assert!(matches!(
            row_to_message(row),
            Err(AdminMessageRepositoryError::Query { .. })
        ));
    }
}
