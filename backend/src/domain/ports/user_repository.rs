//! Port for user persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageParams, Paginated};
use tracing::warn;

use crate::domain::reports::DateRange;
use crate::domain::{Error, RatingAggregate, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

impl From<UserRepositoryError> for Error {
    fn from(value: UserRepositoryError) -> Self {
        match value {
            UserRepositoryError::Connection { message } => {
                warn!(%message, "user store unavailable");
                Error::service_unavailable("user store unavailable")
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
            UserRepositoryError::DuplicateEmail { .. } => {
                Error::conflict("email already registered")
            }
        }
    }
}

/// Selection criteria for user listings.
///
/// Text matches are case-insensitive substring matches. All criteria are
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Leave this user out.
    pub exclude: Option<UserId>,
    /// Restrict to these users.
    pub ids: Option<Vec<UserId>>,
    /// Only users with public profiles.
    pub public_only: bool,
    /// Restrict by ban flag.
    pub banned: Option<bool>,
    /// Include administrator accounts.
    pub include_admins: bool,
    /// Matches name or location, and email when `search_email` is set.
    pub search: Option<String>,
    pub search_email: bool,
    /// Matches location.
    pub location: Option<String>,
    /// Only users active at or after this instant.
    pub active_since: Option<DateTime<Utc>>,
    /// Only users created inside the window.
    pub created_between: Option<DateRange>,
}

fn contains_ignoring_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl UserFilter {
    /// Whether `user` satisfies every criterion.
    pub fn matches(&self, user: &User) -> bool {
        if self.exclude.as_ref() == Some(&user.id) {
            return false;
        }
        if self.ids.as_ref().is_some_and(|ids| !ids.contains(&user.id)) {
            return false;
        }
        if self.public_only && !user.is_public {
            return false;
        }
        if self.banned.is_some_and(|banned| banned != user.is_banned) {
            return false;
        }
        if !self.include_admins && user.is_admin() {
            return false;
        }
        if let Some(term) = self.search.as_deref() {
            let location = user.location.as_deref().unwrap_or_default();
            let hit = contains_ignoring_case(user.name.as_ref(), term)
                || contains_ignoring_case(location, term)
                || (self.search_email && contains_ignoring_case(user.email.as_ref(), term));
            if !hit {
                return false;
            }
        }
        let location_hit = self.location.as_deref().is_none_or(|term| {
            user.location
                .as_deref()
                .is_some_and(|location| contains_ignoring_case(location, term))
        });
        if !location_hit {
            return false;
        }
        if self
            .active_since
            .is_some_and(|since| user.last_active < since)
        {
            return false;
        }
        if self
            .created_between
            .is_some_and(|range| !range.contains(user.created_at))
        {
            return false;
        }
        true
    }
}

/// Port for reading and writing user accounts.
///
/// Listings are ordered newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new account.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Load several users at once. Unknown ids are skipped.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError>;

    /// Overwrite the profile, ban, and role fields of an existing user.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Replace the stored rating aggregate.
    async fn update_rating(
        &self,
        id: &UserId,
        rating: RatingAggregate,
    ) -> Result<(), UserRepositoryError>;

    /// Record activity.
    async fn touch_last_active(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError>;

    /// One page of matching users.
    async fn search(
        &self,
        filter: &UserFilter,
        page: PageParams,
    ) -> Result<Paginated<User>, UserRepositoryError>;

    /// Every matching user.
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserRepositoryError>;

    /// Number of matching users.
    async fn count(&self, filter: &UserFilter) -> Result<u64, UserRepositoryError>;
}
