//! Driving port for administrator dashboards and user moderation.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::reports::{DateRange, PlatformStats, Report, ReportKind};
use crate::domain::{Actor, BanRequest, Error, SwapStatus, User, UserId};

use super::SwapDetails;

/// Criteria for the admin user list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUserSearch {
    /// Matches name, email, or location.
    pub search: Option<String>,
    pub banned: Option<bool>,
}

/// Driving port for admin-only reads and user bans.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminConsole: Send + Sync {
    async fn stats(&self, actor: &Actor) -> Result<PlatformStats, Error>;

    async fn users(
        &self,
        actor: &Actor,
        criteria: AdminUserSearch,
        page: PageParams,
    ) -> Result<Paginated<User>, Error>;

    async fn set_ban(&self, actor: &Actor, user_id: &UserId, request: BanRequest)
    -> Result<User, Error>;

    async fn swaps(
        &self,
        actor: &Actor,
        status: Option<SwapStatus>,
        page: PageParams,
    ) -> Result<Paginated<SwapDetails>, Error>;

    async fn report(
        &self,
        actor: &Actor,
        kind: ReportKind,
        range: Option<DateRange>,
    ) -> Result<Report, Error>;
}
