//! Admin dashboard, user moderation, and report handlers.
//!
//! ```text
//! GET /api/v1/admin/stats
//! GET /api/v1/admin/users?search=&status=banned|active&page=&limit=
//! PUT /api/v1/admin/users/{id}/ban
//! GET /api/v1/admin/swaps?status=&page=&limit=
//! GET /api/v1/admin/reports/{type}?startDate=&endDate=
//! ```

use actix_web::{get, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::AdminUserSearch;
use crate::domain::reports::{
    CategoryCount, DailyCount, DateRange, PlatformStats, RatedUser, Report, ReportData,
    ReportKind, StatusCount,
};
use crate::domain::{BanRequest, Error, SwapStatus, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::schemas::{ErrorSchema, Page};
use crate::inbound::http::skills::non_blank;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    DayBound, FieldName, invalid_value, missing_field_error, page_params, parse_date_bound,
    parse_id, parse_optional, parse_value,
};
use crate::inbound::http::views::{RatingView, SwapView, UserView};

const STATUS: FieldName = FieldName::new("status");

/// Request body for `PUT /api/v1/admin/users/{id}/ban`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BanBody {
    pub is_banned: Option<bool>,
    #[schema(max_length = 200)]
    pub reason: Option<String>,
}

impl TryFrom<BanBody> for BanRequest {
    type Error = Error;

    fn try_from(body: BanBody) -> Result<Self, Self::Error> {
        let banned = body
            .is_banned
            .ok_or_else(|| missing_field_error(FieldName::new("isBanned")))?;
        BanRequest::new(banned, body.reason)
            .map_err(|err| invalid_value(FieldName::new(err.field()), err))
    }
}

/// Query string for `GET /api/v1/admin/users`.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUsersQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn banned_filter(status: Option<&str>) -> Result<Option<bool>, Error> {
    match status.map(str::trim) {
        None | Some("") => Ok(None),
        Some("banned") => Ok(Some(true)),
        Some("active") => Ok(Some(false)),
        Some(other) => Err(invalid_value(
            STATUS,
            format!("unknown user status: {other}"),
        )),
    }
}

/// Query string for `GET /api/v1/admin/swaps`.
#[derive(Debug, Default, Deserialize)]
pub struct AdminSwapsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query string for `GET /api/v1/admin/reports/{type}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReportQuery {
    /// Both bounds, or no filter at all.
    fn range(&self) -> Result<Option<DateRange>, Error> {
        let start_field = FieldName::new("startDate");
        let end_field = FieldName::new("endDate");
        let (Some(start), Some(end)) = (
            self.start_date.as_deref().map(str::trim).filter(|raw| !raw.is_empty()),
            self.end_date.as_deref().map(str::trim).filter(|raw| !raw.is_empty()),
        ) else {
            return Ok(None);
        };
        let start = parse_date_bound(start_field, start, DayBound::Start)?;
        let end = parse_date_bound(end_field, end, DayBound::End)?;
        DateRange::new(start, end)
            .map(Some)
            .map_err(|err| invalid_value(start_field, err))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserCountsView {
    pub total: u64,
    /// Seen within the last seven days.
    pub active: u64,
    pub banned: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SkillCountsView {
    pub total: u64,
    pub pending: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SwapCountsView {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Platform-wide counters. Admin accounts are not counted as users.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformStatsView {
    pub users: UserCountsView,
    pub skills: SkillCountsView,
    pub swaps: SwapCountsView,
}

impl From<PlatformStats> for PlatformStatsView {
    fn from(stats: PlatformStats) -> Self {
        Self {
            users: UserCountsView {
                total: stats.users_total,
                active: stats.users_active,
                banned: stats.users_banned,
            },
            skills: SkillCountsView {
                total: stats.skills_total,
                pending: stats.skills_pending,
            },
            swaps: SwapCountsView {
                total: stats.swaps_total,
                completed: stats.swaps_completed,
                pending: stats.swaps_pending,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyCountView {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCountView {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCountView {
    /// `null` groups uncategorised skills.
    pub category: Option<String>,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatedUserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub rating: RatingView,
}

impl From<&DailyCount> for DailyCountView {
    fn from(row: &DailyCount) -> Self {
        Self {
            date: row.date,
            count: row.count,
        }
    }
}

impl From<&StatusCount> for StatusCountView {
    fn from(row: &StatusCount) -> Self {
        Self {
            status: row.status.as_str().to_owned(),
            count: row.count,
        }
    }
}

impl From<&CategoryCount> for CategoryCountView {
    fn from(row: &CategoryCount) -> Self {
        Self {
            category: row.category.clone(),
            count: row.count,
        }
    }
}

impl From<&RatedUser> for RatedUserView {
    fn from(row: &RatedUser) -> Self {
        Self {
            id: *row.id.as_uuid(),
            name: row.name.as_ref().to_owned(),
            email: row.email.as_ref().to_owned(),
            rating: RatingView::from(row.rating),
        }
    }
}

/// Report rows; the shape depends on the report type.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ReportRowsView {
    UserActivity(Vec<DailyCountView>),
    SwapStats(Vec<StatusCountView>),
    SkillCategories(Vec<CategoryCountView>),
    UserRatings(Vec<RatedUserView>),
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(rename = "type")]
    #[schema(example = "swap-stats")]
    pub kind: String,
    pub generated_at: DateTime<Utc>,
    pub data: ReportRowsView,
}

impl From<&Report> for ReportView {
    fn from(report: &Report) -> Self {
        let data = match &report.data {
            ReportData::UserActivity(rows) => {
                ReportRowsView::UserActivity(rows.iter().map(DailyCountView::from).collect())
            }
            ReportData::SwapStats(rows) => {
                ReportRowsView::SwapStats(rows.iter().map(StatusCountView::from).collect())
            }
            ReportData::SkillCategories(rows) => ReportRowsView::SkillCategories(
                rows.iter().map(CategoryCountView::from).collect(),
            ),
            ReportData::UserRatings(rows) => {
                ReportRowsView::UserRatings(rows.iter().map(RatedUserView::from).collect())
            }
        };
        Self {
            kind: report.kind.as_str().to_owned(),
            generated_at: report.generated_at,
            data,
        }
    }
}

/// Platform counters.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Platform statistics", body = PlatformStatsView),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getPlatformStats",
    security(("SessionCookie" = []))
)]
#[get("/admin/stats")]
pub async fn platform_stats(
    state: web::Data<HttpState>,
    actor: CurrentActor,
) -> ApiResult<web::Json<PlatformStatsView>> {
    let stats = state.admin.stats(&actor.0).await?;
    Ok(web::Json(PlatformStatsView::from(stats)))
}

/// Search non-admin accounts, including banned ones.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(
        ("search" = Option<String>, Query, description = "Matches name, email or location"),
        ("status" = Option<String>, Query, description = "banned or active"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "Matching users", body = Page<UserView>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsersForAdmin",
    security(("SessionCookie" = []))
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<AdminUsersQuery>,
) -> ApiResult<web::Json<Paginated<UserView>>> {
    let query = query.into_inner();
    let page = page_params(query.page, query.limit)?;
    let criteria = AdminUserSearch {
        banned: banned_filter(query.status.as_deref())?,
        search: non_blank(query.search),
    };
    let users = state.admin.users(&actor.0, criteria, page).await?;
    Ok(web::Json(users.map(|user| UserView::private(&user))))
}

/// Ban or unban a user.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/ban",
    params(("id" = String, Path, description = "User id")),
    request_body = BanBody,
    responses(
        (status = 200, description = "Ban state updated", body = UserView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only, or target is an admin", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "setUserBan",
    security(("SessionCookie" = []))
)]
#[put("/admin/users/{id}/ban")]
pub async fn set_ban(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<BanBody>,
) -> ApiResult<web::Json<UserView>> {
    let user_id = parse_id::<UserId>(FieldName::new("id"), &path)?;
    let request = BanRequest::try_from(payload.into_inner())?;
    let user = state.admin.set_ban(&actor.0, &user_id, request).await?;
    Ok(web::Json(UserView::private(&user)))
}

/// Every swap on the platform, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/swaps",
    params(
        ("status" = Option<String>, Query, description = "pending, accepted, rejected, cancelled or completed"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "Swaps", body = Page<SwapView>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listSwapsForAdmin",
    security(("SessionCookie" = []))
)]
#[get("/admin/swaps")]
pub async fn list_swaps(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<AdminSwapsQuery>,
) -> ApiResult<web::Json<Paginated<SwapView>>> {
    let query = query.into_inner();
    let status = parse_optional::<SwapStatus>(STATUS, query.status.as_deref())?;
    let page = page_params(query.page, query.limit)?;
    let swaps = state.admin.swaps(&actor.0, status, page).await?;
    Ok(web::Json(swaps.map(|details| SwapView::from(&details))))
}

/// Aggregate report of one type.
#[utoipa::path(
    get,
    path = "/api/v1/admin/reports/{type}",
    params(
        ("type" = String, Path, description = "user-activity, swap-stats, skill-categories or user-ratings"),
        ("startDate" = Option<String>, Query, description = "Inclusive lower bound on creation time; YYYY-MM-DD or RFC 3339"),
        ("endDate" = Option<String>, Query, description = "Inclusive upper bound on creation time; YYYY-MM-DD or RFC 3339")
    ),
    responses(
        (status = 200, description = "Report", body = ReportView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getReport",
    security(("SessionCookie" = []))
)]
#[get("/admin/reports/{type}")]
pub async fn get_report(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    query: web::Query<ReportQuery>,
) -> ApiResult<web::Json<ReportView>> {
    let kind = parse_value::<ReportKind>(FieldName::new("type"), &path)?;
    let range = query.range()?;
    let report = state.admin.report(&actor.0, kind, range).await?;
    Ok(web::Json(ReportView::from(&report)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(platform_stats)
        .service(list_users)
        .service(set_ban)
        .service(list_swaps)
        .service(get_report);
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
