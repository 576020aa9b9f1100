//! Driving port for user profiles and discovery.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::reports::UserStats;
use crate::domain::{Actor, Error, ProfileUpdate, Skill, SkillType, User, UserId};

/// Criteria for browsing other users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseUsers {
    /// Matches name or location.
    pub search: Option<String>,
    pub location: Option<String>,
}

/// Criteria for finding users by a skill they list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillHolderSearch {
    /// Matches skill names.
    pub skill: String,
    pub skill_type: Option<SkillType>,
}

/// A user's public profile.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    pub skills: Vec<Skill>,
}

/// Driving port for user reads and profile edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Turn a verified identity into an actor.
    ///
    /// Unknown users are unauthorized; banned users are forbidden.
    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error>;

    async fn me(&self, actor: &Actor) -> Result<User, Error>;

    async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, Error>;

    /// Public, unbanned users other than the actor, newest first.
    async fn browse(
        &self,
        actor: &Actor,
        criteria: BrowseUsers,
        page: PageParams,
    ) -> Result<Paginated<User>, Error>;

    /// Public, unbanned users listing a visible skill that matches.
    async fn search_by_skill(
        &self,
        actor: &Actor,
        criteria: SkillHolderSearch,
        page: PageParams,
    ) -> Result<Paginated<User>, Error>;

    /// Profile with visible skills.
    async fn profile(&self, actor: &Actor, user_id: &UserId) -> Result<UserProfile, Error>;

    async fn stats(&self, actor: &Actor, user_id: &UserId) -> Result<UserStats, Error>;
}
