//! User profile and discovery handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! PUT /api/v1/users/me
//! GET /api/v1/users/browse?search=&location=&page=&limit=
//! GET /api/v1/users/search-by-skill?skill=&type=&page=&limit=
//! GET /api/v1/users/{id}
//! GET /api/v1/users/{id}/stats
//! ```

use actix_web::{get, put, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{BrowseUsers, SkillHolderSearch, UserProfile};
use crate::domain::reports::UserStats;
use crate::domain::user::{normalise_availability, normalise_location};
use crate::domain::{DisplayName, Error, ProfileUpdate, SkillType, UserId, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::schemas::{ErrorSchema, Page};
use crate::inbound::http::skills::non_blank;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value, page_params, parse_id, parse_optional, present, required,
};
use crate::inbound::http::views::{RatingView, SkillView, UserView};

const ID: FieldName = FieldName::new("id");

fn user_error(err: UserValidationError) -> Error {
    invalid_value(FieldName::new(err.field()), err)
}

/// Request body for `PUT /api/v1/users/me`. Absent fields are kept;
/// `location: null` clears the location.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    #[schema(min_length = 2, max_length = 100)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, max_length = 200)]
    pub location: Option<Option<String>>,
    pub is_public: Option<bool>,
    /// Replaces the stored availability tags.
    pub availability: Option<Vec<String>>,
}

impl TryFrom<UpdateProfileBody> for ProfileUpdate {
    type Error = Error;

    fn try_from(body: UpdateProfileBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body
                .name
                .map(DisplayName::new)
                .transpose()
                .map_err(user_error)?,
            location: body
                .location
                .map(normalise_location)
                .transpose()
                .map_err(user_error)?,
            is_public: body.is_public,
            availability: body
                .availability
                .map(normalise_availability)
                .transpose()
                .map_err(user_error)?,
        })
    }
}

/// Query string for `GET /api/v1/users/browse`.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query string for `GET /api/v1/users/search-by-skill`.
#[derive(Debug, Default, Deserialize)]
pub struct SkillHolderQuery {
    pub skill: Option<String>,
    #[serde(rename = "type")]
    pub skill_type: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// A user's public profile with their visible skills.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileView {
    pub user: UserView,
    pub skills: Vec<SkillView>,
}

impl From<&UserProfile> for UserProfileView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            user: UserView::public(&profile.user),
            skills: profile.skills.iter().map(SkillView::from).collect(),
        }
    }
}

/// Skill and swap counts for one user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsView {
    pub offered_skills: u64,
    pub wanted_skills: u64,
    pub completed_swaps: u64,
    pub pending_swaps: u64,
    pub rating: RatingView,
}

impl From<UserStats> for UserStatsView {
    fn from(stats: UserStats) -> Self {
        Self {
            offered_skills: stats.offered_skills,
            wanted_skills: stats.wanted_skills,
            completed_swaps: stats.completed_swaps,
            pending_swaps: stats.pending_swaps,
            rating: RatingView::from(stats.rating),
        }
    }
}

/// The caller's own profile, including email.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Account banned", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getCurrentUser",
    security(("SessionCookie" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    actor: CurrentActor,
) -> ApiResult<web::Json<UserView>> {
    let user = state.users.me(&actor.0).await?;
    Ok(web::Json(UserView::private(&user)))
}

/// Edit the caller's profile.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateProfileBody,
    responses(
        (status = 200, description = "Profile updated", body = UserView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("SessionCookie" = []))
)]
#[put("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<UpdateProfileBody>,
) -> ApiResult<web::Json<UserView>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state.users.update_profile(&actor.0, update).await?;
    Ok(web::Json(UserView::private(&user)))
}

/// Browse public, unbanned users other than the caller.
#[utoipa::path(
    get,
    path = "/api/v1/users/browse",
    params(
        ("search" = Option<String>, Query, description = "Matches name or location, case-insensitive"),
        ("location" = Option<String>, Query, description = "Location substring"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "Matching users", body = Page<UserView>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "browseUsers",
    security(("SessionCookie" = []))
)]
#[get("/users/browse")]
pub async fn browse_users(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<BrowseQuery>,
) -> ApiResult<web::Json<Paginated<UserView>>> {
    let query = query.into_inner();
    let page = page_params(query.page, query.limit)?;
    let criteria = BrowseUsers {
        search: non_blank(query.search),
        location: non_blank(query.location),
    };
    let users = state.users.browse(&actor.0, criteria, page).await?;
    Ok(web::Json(users.map(|user| UserView::public(&user))))
}

/// Users listing a visible skill whose name matches.
#[utoipa::path(
    get,
    path = "/api/v1/users/search-by-skill",
    params(
        ("skill" = String, Query, description = "Skill name substring"),
        ("type" = Option<String>, Query, description = "offered or wanted"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "Matching users", body = Page<UserView>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "searchUsersBySkill",
    security(("SessionCookie" = []))
)]
#[get("/users/search-by-skill")]
pub async fn search_by_skill(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<SkillHolderQuery>,
) -> ApiResult<web::Json<Paginated<UserView>>> {
    let query = query.into_inner();
    let page = page_params(query.page, query.limit)?;
    let criteria = SkillHolderSearch {
        skill: required(FieldName::new("skill"), query.skill)?.trim().to_owned(),
        skill_type: parse_optional::<SkillType>(FieldName::new("type"), query.skill_type.as_deref())?,
    };
    let users = state.users.search_by_skill(&actor.0, criteria, page).await?;
    Ok(web::Json(users.map(|user| UserView::public(&user))))
}

/// Another user's public profile and visible skills.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User profile", body = UserProfileView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Profile is private", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserProfile",
    security(("SessionCookie" = []))
)]
#[get("/users/{id}")]
pub async fn user_profile(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserProfileView>> {
    let user_id = parse_id::<UserId>(ID, &path)?;
    let profile = state.users.profile(&actor.0, &user_id).await?;
    Ok(web::Json(UserProfileView::from(&profile)))
}

/// Skill and swap counts for a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/stats",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User statistics", body = UserStatsView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserStats",
    security(("SessionCookie" = []))
)]
#[get("/users/{id}/stats")]
pub async fn user_stats(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserStatsView>> {
    let user_id = parse_id::<UserId>(ID, &path)?;
    let stats = state.users.stats(&actor.0, &user_id).await?;
    Ok(web::Json(UserStatsView::from(stats)))
}

/// Register the user routes. Literal paths come before `{id}` patterns.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(current_user)
        .service(update_current_user)
        .service(browse_users)
        .service(search_by_skill)
        .service(user_profile)
        .service(user_stats);
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
