//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{PageParams, Paginated};
use uuid::Uuid;

use crate::domain::ports::{UserFilter, UserRepository, UserRepositoryError};
use crate::domain::{
    CredentialHash, DisplayName, EmailAddress, RatingAggregate, User, UserId, UserRole,
};

use super::error_mapping::{
    contains_pattern, is_unique_violation, map_diesel_error, map_pool_error, to_i64, to_u64,
};
use super::models::{UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn corrupt(error: impl std::fmt::Display) -> UserRepositoryError {
    UserRepositoryError::query(format!("invalid stored user: {error}"))
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let UserRow {
        id,
        name,
        email,
        credential_hash,
        location,
        is_public,
        is_banned,
        ban_reason,
        role,
        availability,
        rating_average,
        rating_count,
        last_active,
        created_at,
        updated_at,
    } = row;
    Ok(User {
        id: UserId::from_uuid(id),
        name: DisplayName::new(name).map_err(corrupt)?,
        email: EmailAddress::new(email).map_err(corrupt)?,
        credential_hash: CredentialHash::new(credential_hash),
        location,
        is_public,
        is_banned,
        ban_reason,
        role: role.parse::<UserRole>().map_err(corrupt)?,
        availability,
        rating: RatingAggregate::from_parts(
            rating_average,
            u32::try_from(rating_count).unwrap_or_default(),
        ),
        last_active,
        created_at,
        updated_at,
    })
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: *user.id.as_uuid(),
        name: user.name.as_ref().to_owned(),
        email: user.email.as_ref().to_owned(),
        credential_hash: user.credential_hash.expose().to_owned(),
        location: user.location.clone(),
        is_public: user.is_public,
        is_banned: user.is_banned,
        ban_reason: user.ban_reason.clone(),
        role: user.role.as_str().to_owned(),
        availability: user.availability.clone(),
        rating_average: user.rating.average(),
        rating_count: i32::try_from(user.rating.count()).unwrap_or(i32::MAX),
        last_active: user.last_active,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn uuids(ids: &[UserId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

/// Translate a filter into a boxed `WHERE` clause.
fn filtered(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(exclude) = filter.exclude {
        query = query.filter(users::id.ne(*exclude.as_uuid()));
    }
    if let Some(ids) = &filter.ids {
        query = query.filter(users::id.eq_any(uuids(ids)));
    }
    if filter.public_only {
        query = query.filter(users::is_public.eq(true));
    }
    if let Some(banned) = filter.banned {
        query = query.filter(users::is_banned.eq(banned));
    }
    if !filter.include_admins {
        query = query.filter(users::role.ne(UserRole::Admin.as_str()));
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = contains_pattern(term);
        let name_or_location = users::name
            .ilike(pattern.clone())
            .or(users::location.assume_not_null().ilike(pattern.clone()));
        query = if filter.search_email {
            query.filter(name_or_location.or(users::email.ilike(pattern)))
        } else {
            query.filter(name_or_location)
        };
    }
    if let Some(location) = filter.location.as_deref() {
        query = query.filter(
            users::location
                .assume_not_null()
                .ilike(contains_pattern(location)),
        );
    }
    if let Some(since) = filter.active_since {
        query = query.filter(users::last_active.ge(since));
    }
    if let Some(range) = filter.created_between {
        query = query.filter(
            users::created_at
                .ge(range.start())
                .and(users::created_at.le(range.end())),
        );
    }
    query
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(users::table)
            .values(&user_to_row(user))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email.as_ref())
                } else {
                    diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .filter(users::id.eq_any(uuids(ids)))
            .select(UserRow::as_select())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_user)
            .collect()
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = UserProfileChangeset {
            name: user.name.as_ref(),
            location: user.location.as_deref(),
            is_public: user.is_public,
            is_banned: user.is_banned,
            ban_reason: user.ban_reason.as_deref(),
            role: user.role.as_str(),
            availability: &user.availability,
            updated_at: user.updated_at,
        };
        diesel::update(users::table.find(*user.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn update_rating(
        &self,
        id: &UserId,
        rating: RatingAggregate,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(*id.as_uuid()))
            .set((
                users::rating_average.eq(rating.average()),
                users::rating_count.eq(i32::try_from(rating.count()).unwrap_or(i32::MAX)),
            ))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn touch_last_active(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(*id.as_uuid()))
            .set(users::last_active.eq(at))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn search(
        &self,
        filter: &UserFilter,
        page: PageParams,
    ) -> Result<Paginated<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;
        let rows = filtered(filter)
            .select(UserRow::as_select())
            .order_by((users::created_at.desc(), users::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(to_i64(page.offset()))
            .load::<UserRow>(&mut conn)
            .await
            .map_err(diesel_error)?;
        let items = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, to_u64(total), page))
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        filtered(filter)
            .select(UserRow::as_select())
            .order_by((users::created_at.desc(), users::id.desc()))
            .load::<UserRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_user)
            .collect()
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_u64(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_user;
    use rstest::rstest;

    #[rstest]
    fn rows_round_trip_through_the_domain() {
        let mut user = sample_user("Ada Lovelace");
        user.location = Some("London".to_owned());
        user.availability = vec!["weekends".to_owned()];
        user.rating = RatingAggregate::from_parts(4.5, 2);

        let restored = row_to_user(user_to_row(&user)).expect("valid row");
        assert_eq!(restored, user);
    }

    #[rstest]
    fn unknown_roles_are_reported_as_query_errors() {
        let mut row = user_to_row(&sample_user("Grace Hopper"));
        row.role = "superuser".to_owned();
        let err = row_to_user(row).expect_err("role rejected");
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn negative_counts_decode_as_zero() {
        let mut row = user_to_row(&sample_user("Alan Turing"));
        row.rating_count = -3;
        let user = row_to_user(row).expect("valid row");
        assert_eq!(user.rating.count(), 0);
    }
}
