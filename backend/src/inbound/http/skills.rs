//! Skill catalogue handlers, including the admin review queue.
//!
//! ```text
//! GET    /api/v1/skills/my-skills
//! POST   /api/v1/skills
//! GET    /api/v1/skills/search?q=&type=&category=&level=&page=&limit=
//! GET    /api/v1/skills/admin/pending?page=&limit=
//! PUT    /api/v1/skills/admin/{id}/approve
//! PUT    /api/v1/skills/admin/{id}/reject
//! PUT    /api/v1/skills/{id}
//! DELETE /api/v1/skills/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{OwnedSkills, SkillSearch};
use crate::domain::skill::{normalise_category, normalise_description};
use crate::domain::{
    Error, NewSkill, RejectionReason, SkillId, SkillLevel, SkillName, SkillType, SkillUpdate,
    SkillValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::schemas::{ErrorSchema, Page};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value, page_params, parse_id, parse_optional, parse_value, present,
    required,
};
use crate::inbound::http::views::{SkillListingView, SkillView};

const ID: FieldName = FieldName::new("id");
const NAME: FieldName = FieldName::new("name");
const TYPE: FieldName = FieldName::new("type");
const LEVEL: FieldName = FieldName::new("level");

fn skill_error(err: SkillValidationError) -> Error {
    invalid_value(FieldName::new(err.field()), err)
}

/// Request body for `POST /api/v1/skills`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateSkillBody {
    #[schema(min_length = 2, max_length = 100)]
    pub name: Option<String>,
    #[schema(max_length = 500)]
    pub description: Option<String>,
    #[schema(max_length = 50)]
    pub category: Option<String>,
    /// `offered` or `wanted`.
    #[serde(rename = "type")]
    pub skill_type: Option<String>,
    /// `beginner`, `intermediate`, `advanced` or `expert`. Defaults to
    /// `intermediate`.
    pub level: Option<String>,
}

impl TryFrom<CreateSkillBody> for NewSkill {
    type Error = Error;

    fn try_from(body: CreateSkillBody) -> Result<Self, Self::Error> {
        let name = SkillName::new(required(NAME, body.name)?).map_err(skill_error)?;
        let skill_type = parse_value::<SkillType>(TYPE, &required(TYPE, body.skill_type)?)?;
        let level = parse_optional::<SkillLevel>(LEVEL, body.level.as_deref())?.unwrap_or_default();
        Ok(Self {
            name,
            description: normalise_description(body.description).map_err(skill_error)?,
            category: normalise_category(body.category).map_err(skill_error)?,
            skill_type,
            level,
        })
    }
}

/// Request body for `PUT /api/v1/skills/{id}`. Absent fields are kept;
/// `null` clears description or category.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateSkillBody {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    pub level: Option<String>,
}

impl TryFrom<UpdateSkillBody> for SkillUpdate {
    type Error = Error;

    fn try_from(body: UpdateSkillBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body
                .name
                .map(SkillName::new)
                .transpose()
                .map_err(skill_error)?,
            description: body
                .description
                .map(normalise_description)
                .transpose()
                .map_err(skill_error)?,
            category: body
                .category
                .map(normalise_category)
                .transpose()
                .map_err(skill_error)?,
            level: parse_optional::<SkillLevel>(LEVEL, body.level.as_deref())?,
        })
    }
}

/// Request body for rejecting a pending skill.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RejectSkillBody {
    #[schema(max_length = 500)]
    pub reason: Option<String>,
}

/// The caller's skills split by type.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MySkillsView {
    pub offered_skills: Vec<SkillView>,
    pub wanted_skills: Vec<SkillView>,
}

impl From<OwnedSkills> for MySkillsView {
    fn from(owned: OwnedSkills) -> Self {
        Self {
            offered_skills: owned.offered.iter().map(SkillView::from).collect(),
            wanted_skills: owned.wanted.iter().map(SkillView::from).collect(),
        }
    }
}

/// Query string for `GET /api/v1/skills/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SkillSearchQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub skill_type: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TryFrom<SkillSearchQuery> for SkillSearch {
    type Error = Error;

    fn try_from(query: SkillSearchQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            text: non_blank(query.q),
            skill_type: parse_optional::<SkillType>(TYPE, query.skill_type.as_deref())?,
            category: non_blank(query.category),
            level: parse_optional::<SkillLevel>(LEVEL, query.level.as_deref())?,
        })
    }
}

/// Query string carrying only paging.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// The caller's own visible skills.
#[utoipa::path(
    get,
    path = "/api/v1/skills/my-skills",
    responses(
        (status = 200, description = "Offered and wanted skills", body = MySkillsView),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Account banned", body = ErrorSchema)
    ),
    tags = ["skills"],
    operation_id = "listMySkills",
    security(("SessionCookie" = []))
)]
#[get("/skills/my-skills")]
pub async fn my_skills(
    state: web::Data<HttpState>,
    actor: CurrentActor,
) -> ApiResult<web::Json<MySkillsView>> {
    let owned = state.skills_query.my_skills(&actor.0).await?;
    Ok(web::Json(MySkillsView::from(owned)))
}

/// List a new skill. Depending on configuration it is visible at once or
/// waits for review.
#[utoipa::path(
    post,
    path = "/api/v1/skills",
    request_body = CreateSkillBody,
    responses(
        (status = 201, description = "Skill created", body = SkillView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "A skill with this name and type exists", body = ErrorSchema)
    ),
    tags = ["skills"],
    operation_id = "createSkill",
    security(("SessionCookie" = []))
)]
#[post("/skills")]
pub async fn create_skill(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<CreateSkillBody>,
) -> ApiResult<HttpResponse> {
    let input = NewSkill::try_from(payload.into_inner())?;
    let skill = state.skills.create(&actor.0, input).await?;
    Ok(HttpResponse::Created().json(SkillView::from(&skill)))
}

/// Search visible skills of public, unbanned users.
#[utoipa::path(
    get,
    path = "/api/v1/skills/search",
    params(
        ("q" = Option<String>, Query, description = "Matches name or description, case-insensitive"),
        ("type" = Option<String>, Query, description = "offered or wanted"),
        ("category" = Option<String>, Query, description = "Category substring"),
        ("level" = Option<String>, Query, description = "beginner, intermediate, advanced or expert"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "Matching skills", body = Page<SkillListingView>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["skills"],
    operation_id = "searchSkills"
)]
#[get("/skills/search")]
pub async fn search_skills(
    state: web::Data<HttpState>,
    query: web::Query<SkillSearchQuery>,
) -> ApiResult<web::Json<Paginated<SkillListingView>>> {
    let query = query.into_inner();
    let page = page_params(query.page, query.limit)?;
    let search = SkillSearch::try_from(query)?;
    let listings = state.skills_query.search(search, page).await?;
    Ok(web::Json(
        listings.map(|listing| SkillListingView::from(&listing)),
    ))
}

/// Skills waiting for review. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/skills/admin/pending",
    params(
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "Pending skills", body = Page<SkillListingView>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "listPendingSkills",
    security(("SessionCookie" = []))
)]
#[get("/skills/admin/pending")]
pub async fn pending_skills(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Paginated<SkillListingView>>> {
    let page = page_params(query.page, query.limit)?;
    let listings = state.moderation.pending(&actor.0, page).await?;
    Ok(web::Json(
        listings.map(|listing| SkillListingView::from(&listing)),
    ))
}

/// Approve a skill so it appears in search. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/skills/admin/{id}/approve",
    params(("id" = String, Path, description = "Skill id")),
    responses(
        (status = 200, description = "Skill approved", body = SkillView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema),
        (status = 404, description = "Skill not found", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "approveSkill",
    security(("SessionCookie" = []))
)]
#[put("/skills/admin/{id}/approve")]
pub async fn approve_skill(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<SkillView>> {
    let skill_id = parse_id::<SkillId>(ID, &path)?;
    let skill = state.moderation.approve(&actor.0, &skill_id).await?;
    Ok(web::Json(SkillView::from(&skill)))
}

/// Reject a skill with a reason. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/skills/admin/{id}/reject",
    params(("id" = String, Path, description = "Skill id")),
    request_body = RejectSkillBody,
    responses(
        (status = 200, description = "Skill rejected", body = SkillView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema),
        (status = 404, description = "Skill not found", body = ErrorSchema)
    ),
    tags = ["moderation"],
    operation_id = "rejectSkill",
    security(("SessionCookie" = []))
)]
#[put("/skills/admin/{id}/reject")]
pub async fn reject_skill(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<RejectSkillBody>,
) -> ApiResult<web::Json<SkillView>> {
    let skill_id = parse_id::<SkillId>(ID, &path)?;
    let reason_field = FieldName::new("reason");
    let reason = RejectionReason::new(required(reason_field, payload.into_inner().reason)?)
        .map_err(|err| invalid_value(reason_field, err))?;
    let skill = state.moderation.reject(&actor.0, &skill_id, reason).await?;
    Ok(web::Json(SkillView::from(&skill)))
}

/// Edit one of the caller's skills. Type cannot change.
#[utoipa::path(
    put,
    path = "/api/v1/skills/{id}",
    params(("id" = String, Path, description = "Skill id")),
    request_body = UpdateSkillBody,
    responses(
        (status = 200, description = "Skill updated", body = SkillView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Skill not found", body = ErrorSchema)
    ),
    tags = ["skills"],
    operation_id = "updateSkill",
    security(("SessionCookie" = []))
)]
#[put("/skills/{id}")]
pub async fn update_skill(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<UpdateSkillBody>,
) -> ApiResult<web::Json<SkillView>> {
    let skill_id = parse_id::<SkillId>(ID, &path)?;
    let update = SkillUpdate::try_from(payload.into_inner())?;
    let skill = state.skills.update(&actor.0, &skill_id, update).await?;
    Ok(web::Json(SkillView::from(&skill)))
}

/// Delete one of the caller's skills.
#[utoipa::path(
    delete,
    path = "/api/v1/skills/{id}",
    params(("id" = String, Path, description = "Skill id")),
    responses(
        (status = 204, description = "Skill deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Skill not found", body = ErrorSchema)
    ),
    tags = ["skills"],
    operation_id = "deleteSkill",
    security(("SessionCookie" = []))
)]
#[delete("/skills/{id}")]
pub async fn delete_skill(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let skill_id = parse_id::<SkillId>(ID, &path)?;
    state.skills.delete(&actor.0, &skill_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the skill routes. Literal paths come before `{id}` patterns.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(my_skills)
        .service(search_skills)
        .service(pending_skills)
        .service(approve_skill)
        .service(reject_skill)
        .service(create_skill)
        .service(update_skill)
        .service(delete_skill);
}

#[cfg(test)]
#[path = "skills_tests.rs"]
mod tests;
