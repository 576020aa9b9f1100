//! Administrator console service.
//!
//! Dashboard counters, user moderation, the global swap list, and reports.
//! Every operation requires an admin actor.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use tracing::info;

use crate::domain::ports::{
    AdminConsole, AdminUserSearch, ModerationFilter, SkillFilter, SkillRepository, SwapDetails,
    SwapFilter, SwapRepository, UserFilter, UserRepository,
};
use crate::domain::reports::{
    self, ACTIVE_WINDOW_DAYS, DateRange, PlatformStats, Report, ReportData, ReportKind,
    TOP_RATED_LIMIT,
};
use crate::domain::swap_details::SwapDetailsLoader;
use crate::domain::{Actor, BanRequest, Error, SwapStatus, User, UserId};

/// Admin service implementing [`AdminConsole`].
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    skills: Arc<dyn SkillRepository>,
    swaps: Arc<dyn SwapRepository>,
    clock: Arc<dyn Clock>,
    details: SwapDetailsLoader,
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        skills: Arc<dyn SkillRepository>,
        swaps: Arc<dyn SwapRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let details = SwapDetailsLoader::new(Arc::clone(&users), Arc::clone(&skills));
        Self {
            users,
            skills,
            swaps,
            clock,
            details,
        }
    }

    async fn count_swaps(&self, status: Option<SwapStatus>) -> Result<u64, Error> {
        let filter = SwapFilter {
            status,
            ..SwapFilter::default()
        };
        Ok(self.swaps.count(&filter).await?)
    }

    async fn build_report(
        &self,
        kind: ReportKind,
        range: Option<DateRange>,
    ) -> Result<ReportData, Error> {
        let users_in_range = UserFilter {
            created_between: range,
            ..UserFilter::default()
        };
        let data = match kind {
            ReportKind::UserActivity => {
                let users = self.users.list(&users_in_range).await?;
                ReportData::UserActivity(reports::user_activity(&users))
            }
            ReportKind::SwapStats => {
                let filter = SwapFilter {
                    created_between: range,
                    ..SwapFilter::default()
                };
                let swaps = self.swaps.list(&filter).await?;
                ReportData::SwapStats(reports::swap_stats(&swaps))
            }
            ReportKind::SkillCategories => {
                let filter = SkillFilter {
                    moderation: ModerationFilter::Visible,
                    created_between: range,
                    ..SkillFilter::default()
                };
                let skills = self.skills.list(&filter).await?;
                ReportData::SkillCategories(reports::skill_categories(&skills))
            }
            ReportKind::UserRatings => {
                let users = self.users.list(&users_in_range).await?;
                ReportData::UserRatings(reports::top_rated(&users, TOP_RATED_LIMIT))
            }
        };
        Ok(data)
    }
}

#[async_trait]
impl AdminConsole for AdminService {
    async fn stats(&self, actor: &Actor) -> Result<PlatformStats, Error> {
        actor.require_admin()?;
        let active_since = self.clock.utc() - TimeDelta::days(ACTIVE_WINDOW_DAYS);
        let active = UserFilter {
            active_since: Some(active_since),
            ..UserFilter::default()
        };
        let banned = UserFilter {
            banned: Some(true),
            ..UserFilter::default()
        };
        let pending_skills = SkillFilter {
            moderation: ModerationFilter::Pending,
            ..SkillFilter::default()
        };

        Ok(PlatformStats {
            users_total: self.users.count(&UserFilter::default()).await?,
            users_active: self.users.count(&active).await?,
            users_banned: self.users.count(&banned).await?,
            skills_total: self.skills.count(&SkillFilter::default()).await?,
            skills_pending: self.skills.count(&pending_skills).await?,
            swaps_total: self.count_swaps(None).await?,
            swaps_completed: self.count_swaps(Some(SwapStatus::Completed)).await?,
            swaps_pending: self.count_swaps(Some(SwapStatus::Pending)).await?,
        })
    }

    async fn users(
        &self,
        actor: &Actor,
        criteria: AdminUserSearch,
        page: PageParams,
    ) -> Result<Paginated<User>, Error> {
        actor.require_admin()?;
        let AdminUserSearch { search, banned } = criteria;
        let filter = UserFilter {
            search,
            search_email: true,
            banned,
            ..UserFilter::default()
        };
        Ok(self.users.search(&filter, page).await?)
    }

    async fn set_ban(
        &self,
        actor: &Actor,
        user_id: &UserId,
        request: BanRequest,
    ) -> Result<User, Error> {
        actor.require_admin()?;
        if user_id == actor.user_id() {
            return Err(Error::invalid_request("you cannot ban yourself"));
        }
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        if user.is_admin() {
            return Err(Error::forbidden("administrators cannot be banned"));
        }

        let (banned, reason) = request.into_parts();
        user.set_ban(banned, reason, self.clock.utc());
        self.users.update(&user).await?;
        info!(
            user_id = %user.id,
            banned,
            admin = %actor.user_id(),
            "user ban status changed"
        );
        Ok(user)
    }

    async fn swaps(
        &self,
        actor: &Actor,
        status: Option<SwapStatus>,
        page: PageParams,
    ) -> Result<Paginated<SwapDetails>, Error> {
        actor.require_admin()?;
        let filter = SwapFilter {
            status,
            ..SwapFilter::default()
        };
        let swaps = self.swaps.search(&filter, page).await?;
        self.details.load_page(swaps).await
    }

    async fn report(
        &self,
        actor: &Actor,
        kind: ReportKind,
        range: Option<DateRange>,
    ) -> Result<Report, Error> {
        actor.require_admin()?;
        let data = self.build_report(kind, range).await?;
        Ok(Report {
            kind,
            data,
            generated_at: self.clock.utc(),
        })
    }
}
