//! User directory service.
//!
//! Resolves verified identities into actors and serves profile reads,
//! profile edits, and user discovery.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use tracing::{info, warn};

use crate::domain::ports::{
    BrowseUsers, ModerationFilter, SkillFilter, SkillHolderSearch, SkillRepository, SwapFilter,
    SwapRepository, UserDirectory, UserFilter, UserProfile, UserRepository,
};
use crate::domain::reports::UserStats;
use crate::domain::{Actor, Error, ProfileUpdate, SkillType, SwapStatus, User, UserId};

/// User service implementing [`UserDirectory`].
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    skills: Arc<dyn SkillRepository>,
    swaps: Arc<dyn SwapRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        skills: Arc<dyn SkillRepository>,
        swaps: Arc<dyn SwapRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            skills,
            swaps,
            clock,
        }
    }

    async fn own_account(&self, actor: &Actor) -> Result<User, Error> {
        self.users
            .find_by_id(actor.user_id())
            .await?
            .ok_or_else(|| Error::not_found("account not found"))
    }

    /// Load another user's profile subject to visibility rules.
    async fn visible_user(&self, actor: &Actor, user_id: &UserId) -> Result<User, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| !user.is_banned)
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        if !user.is_public && &user.id != actor.user_id() {
            return Err(Error::forbidden("this profile is private"));
        }
        Ok(user)
    }

    async fn count_skills(&self, owner: UserId, skill_type: SkillType) -> Result<u64, Error> {
        let filter = SkillFilter {
            owner: Some(owner),
            moderation: ModerationFilter::Visible,
            skill_type: Some(skill_type),
            ..SkillFilter::default()
        };
        Ok(self.skills.count(&filter).await?)
    }

    async fn count_swaps(&self, participant: UserId, status: SwapStatus) -> Result<u64, Error> {
        let filter = SwapFilter {
            participant: Some(participant),
            status: Some(status),
            ..SwapFilter::default()
        };
        Ok(self.swaps.count(&filter).await?)
    }
}

#[async_trait]
impl UserDirectory for UserService {
    async fn resolve_actor(&self, user_id: &UserId) -> Result<Actor, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        if user.is_banned {
            return Err(Error::forbidden("account has been banned"));
        }
        if let Err(error) = self
            .users
            .touch_last_active(user_id, self.clock.utc())
            .await
        {
            warn!(user_id = %user_id, %error, "failed to record user activity");
        }
        Ok(Actor::new(user.id, user.role))
    }

    async fn me(&self, actor: &Actor) -> Result<User, Error> {
        self.own_account(actor).await
    }

    async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self.own_account(actor).await?;
        user.apply_profile(update, self.clock.utc());
        self.users.update(&user).await?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    async fn browse(
        &self,
        actor: &Actor,
        criteria: BrowseUsers,
        page: PageParams,
    ) -> Result<Paginated<User>, Error> {
        let BrowseUsers { search, location } = criteria;
        let filter = UserFilter {
            exclude: Some(*actor.user_id()),
            public_only: true,
            banned: Some(false),
            include_admins: true,
            search,
            location,
            ..UserFilter::default()
        };
        Ok(self.users.search(&filter, page).await?)
    }

    async fn search_by_skill(
        &self,
        actor: &Actor,
        criteria: SkillHolderSearch,
        page: PageParams,
    ) -> Result<Paginated<User>, Error> {
        let SkillHolderSearch { skill, skill_type } = criteria;
        let term = skill.trim();
        if term.is_empty() {
            return Err(Error::invalid_field("skill", "skill search term is required"));
        }

        let skill_filter = SkillFilter {
            moderation: ModerationFilter::Visible,
            name: Some(term.to_owned()),
            skill_type,
            ..SkillFilter::default()
        };
        let mut owners: Vec<UserId> = self
            .skills
            .list(&skill_filter)
            .await?
            .into_iter()
            .map(|skill| skill.owner)
            .collect();
        owners.sort_unstable();
        owners.dedup();
        if owners.is_empty() {
            return Ok(Paginated::new(Vec::new(), 0, page));
        }

        let filter = UserFilter {
            exclude: Some(*actor.user_id()),
            ids: Some(owners),
            public_only: true,
            banned: Some(false),
            include_admins: true,
            ..UserFilter::default()
        };
        Ok(self.users.search(&filter, page).await?)
    }

    async fn profile(&self, actor: &Actor, user_id: &UserId) -> Result<UserProfile, Error> {
        let user = self.visible_user(actor, user_id).await?;
        let filter = SkillFilter {
            owner: Some(user.id),
            moderation: ModerationFilter::Visible,
            ..SkillFilter::default()
        };
        let skills = self.skills.list(&filter).await?;
        Ok(UserProfile { user, skills })
    }

    async fn stats(&self, actor: &Actor, user_id: &UserId) -> Result<UserStats, Error> {
        let user = self.visible_user(actor, user_id).await?;
        Ok(UserStats {
            offered_skills: self.count_skills(user.id, SkillType::Offered).await?,
            wanted_skills: self.count_skills(user.id, SkillType::Wanted).await?,
            completed_swaps: self.count_swaps(user.id, SwapStatus::Completed).await?,
            pending_swaps: self.count_swaps(user.id, SwapStatus::Pending).await?,
            rating: user.rating,
        })
    }
}
