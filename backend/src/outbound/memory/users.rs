//! In-memory `UserRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageParams, Paginated};

use crate::domain::ports::{UserFilter, UserRepository, UserRepositoryError};
use crate::domain::{RatingAggregate, User, UserId};

use super::{PoisonedStore, Store, newest_first};

/// Users keyed by id. Email addresses are unique ignoring case.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Store<UserId, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(error: PoisonedStore) -> UserRepositoryError {
    UserRepositoryError::query(error.to_string())
}

impl InMemoryUserRepository {
    fn matching(&self, filter: &UserFilter) -> Result<Vec<User>, UserRepositoryError> {
        let mut users = self
            .users
            .collect(|user| filter.matches(user))
            .map_err(poisoned)?;
        newest_first(&mut users, |user| (user.created_at, user.id));
        Ok(users)
    }

    fn modify(
        &self,
        id: &UserId,
        change: impl FnOnce(&mut User),
    ) -> Result<(), UserRepositoryError> {
        self.users
            .with(|users| {
                if let Some(user) = users.get_mut(id) {
                    change(user);
                }
            })
            .map_err(poisoned)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.users
            .with(|users| {
                let taken = users
                    .values()
                    .any(|other| other.email.as_ref().eq_ignore_ascii_case(user.email.as_ref()));
                if taken {
                    return Err(UserRepositoryError::duplicate_email(user.email.as_ref()));
                }
                users.insert(user.id, user.clone());
                Ok(())
            })
            .map_err(poisoned)?
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        self.users
            .with(|users| users.get(id).cloned())
            .map_err(poisoned)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        self.users
            .with(|users| ids.iter().filter_map(|id| users.get(id).cloned()).collect())
            .map_err(poisoned)
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.modify(&user.id, |stored| {
            stored.name = user.name.clone();
            stored.location = user.location.clone();
            stored.is_public = user.is_public;
            stored.is_banned = user.is_banned;
            stored.ban_reason = user.ban_reason.clone();
            stored.role = user.role;
            stored.availability = user.availability.clone();
            stored.updated_at = user.updated_at;
        })
    }

    async fn update_rating(
        &self,
        id: &UserId,
        rating: RatingAggregate,
    ) -> Result<(), UserRepositoryError> {
        self.modify(id, |stored| stored.rating = rating)
    }

    async fn touch_last_active(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        self.modify(id, |stored| stored.last_active = at)
    }

    async fn search(
        &self,
        filter: &UserFilter,
        page: PageParams,
    ) -> Result<Paginated<User>, UserRepositoryError> {
        Ok(Paginated::from_all(self.matching(filter)?, page))
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserRepositoryError> {
        self.matching(filter)
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64, UserRepositoryError> {
        let count = self
            .users
            .with(|users| users.values().filter(|user| filter.matches(user)).count())
            .map_err(poisoned)?;
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
