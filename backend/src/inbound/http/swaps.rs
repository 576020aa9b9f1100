//! Swap handlers.
//!
//! ```text
//! POST /api/v1/swaps
//! GET  /api/v1/swaps/my-swaps?status=&page=&limit=
//! GET  /api/v1/swaps/{id}
//! PUT  /api/v1/swaps/{id}/accept
//! PUT  /api/v1/swaps/{id}/reject
//! PUT  /api/v1/swaps/{id}/cancel
//! PUT  /api/v1/swaps/{id}/complete
//! POST /api/v1/swaps/{id}/rate
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::CreateSwapRequest;
use crate::domain::{
    Error, Rating, RatingValidationError, SkillId, SwapAction, SwapId, SwapRating, SwapStatus,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::schemas::{ErrorSchema, Page};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value, missing_field_error, page_params, parse_id, parse_optional,
    parse_timestamp, required,
};
use crate::inbound::http::views::SwapView;

const ID: FieldName = FieldName::new("id");
const RATING: FieldName = FieldName::new("rating");

/// Request body for `POST /api/v1/swaps`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapBody {
    #[schema(format = "uuid")]
    pub recipient_id: Option<String>,
    /// The recipient's skill the requester wants to learn.
    #[schema(format = "uuid")]
    pub requested_skill_id: Option<String>,
    /// The requester's skill offered in return.
    #[schema(format = "uuid")]
    pub offered_skill_id: Option<String>,
    #[schema(max_length = 1000)]
    pub message: Option<String>,
    #[schema(format = "date-time")]
    pub scheduled_date: Option<String>,
}

impl TryFrom<CreateSwapBody> for CreateSwapRequest {
    type Error = Error;

    fn try_from(body: CreateSwapBody) -> Result<Self, Self::Error> {
        let recipient = FieldName::new("recipientId");
        let requested = FieldName::new("requestedSkillId");
        let offered = FieldName::new("offeredSkillId");
        let scheduled = FieldName::new("scheduledDate");
        Ok(Self {
            recipient_id: parse_id::<UserId>(recipient, &required(recipient, body.recipient_id)?)?,
            requested_skill_id: parse_id::<SkillId>(
                requested,
                &required(requested, body.requested_skill_id)?,
            )?,
            offered_skill_id: parse_id::<SkillId>(
                offered,
                &required(offered, body.offered_skill_id)?,
            )?,
            message: body.message,
            scheduled_date: body
                .scheduled_date
                .as_deref()
                .map(str::trim)
                .filter(|raw| !raw.is_empty())
                .map(|raw| parse_timestamp(scheduled, raw))
                .transpose()?,
        })
    }
}

/// Request body for `POST /api/v1/swaps/{id}/rate`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateSwapBody {
    /// Whole number from 1 to 5; a decimal string such as `"4"` is also
    /// accepted.
    #[schema(value_type = i64, minimum = 1, maximum = 5)]
    pub rating: Option<Value>,
    #[schema(max_length = 500)]
    pub comment: Option<String>,
}

/// Whole numbers, given either as JSON numbers or as decimal strings.
fn integer_score(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

impl TryFrom<RateSwapBody> for SwapRating {
    type Error = Error;

    fn try_from(body: RateSwapBody) -> Result<Self, Self::Error> {
        let raw = body.rating.ok_or_else(|| missing_field_error(RATING))?;
        let score = integer_score(&raw)
            .ok_or_else(|| invalid_value(RATING, RatingValidationError::OutOfRange))?;
        let rating = Rating::new(score).map_err(|err| invalid_value(RATING, err))?;
        SwapRating::new(rating, body.comment).map_err(|err| {
            let field = match err {
                RatingValidationError::OutOfRange => RATING,
                RatingValidationError::CommentTooLong { .. } => FieldName::new("comment"),
            };
            invalid_value(field, err)
        })
    }
}

/// Query string for `GET /api/v1/swaps/my-swaps`.
#[derive(Debug, Default, Deserialize)]
pub struct MySwapsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Propose a swap to another user.
#[utoipa::path(
    post,
    path = "/api/v1/swaps",
    request_body = CreateSwapBody,
    responses(
        (status = 201, description = "Swap requested", body = SwapView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Recipient or skill not found", body = ErrorSchema),
        (status = 409, description = "An identical swap is already pending", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "createSwap",
    security(("SessionCookie" = []))
)]
#[post("/swaps")]
pub async fn create_swap(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<CreateSwapBody>,
) -> ApiResult<HttpResponse> {
    let request = CreateSwapRequest::try_from(payload.into_inner())?;
    let details = state.swaps.create(&actor.0, request).await?;
    Ok(HttpResponse::Created().json(SwapView::from(&details)))
}

/// Swaps in which the caller is requester or recipient, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/my-swaps",
    params(
        ("status" = Option<String>, Query, description = "pending, accepted, rejected, cancelled or completed"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "The caller's swaps", body = Page<SwapView>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "listMySwaps",
    security(("SessionCookie" = []))
)]
#[get("/swaps/my-swaps")]
pub async fn my_swaps(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<MySwapsQuery>,
) -> ApiResult<web::Json<Paginated<SwapView>>> {
    let query = query.into_inner();
    let status = parse_optional::<SwapStatus>(FieldName::new("status"), query.status.as_deref())?;
    let page = page_params(query.page, query.limit)?;
    let swaps = state.swaps_query.list_mine(&actor.0, status, page).await?;
    Ok(web::Json(swaps.map(|details| SwapView::from(&details))))
}

/// A single swap. Only its parties may read it.
#[utoipa::path(
    get,
    path = "/api/v1/swaps/{id}",
    params(("id" = String, Path, description = "Swap id")),
    responses(
        (status = 200, description = "The swap", body = SwapView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a party to the swap", body = ErrorSchema),
        (status = 404, description = "Swap not found", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "getSwap",
    security(("SessionCookie" = []))
)]
#[get("/swaps/{id}")]
pub async fn get_swap(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<SwapView>> {
    let swap_id = parse_id::<SwapId>(ID, &path)?;
    let details = state.swaps_query.get(&actor.0, &swap_id).await?;
    Ok(web::Json(SwapView::from(&details)))
}

async fn apply_action(
    state: &HttpState,
    actor: CurrentActor,
    raw_id: &str,
    action: SwapAction,
) -> ApiResult<web::Json<SwapView>> {
    let swap_id = parse_id::<SwapId>(ID, raw_id)?;
    let details = state.swaps.apply(&actor.0, &swap_id, action).await?;
    Ok(web::Json(SwapView::from(&details)))
}

/// Accept a pending swap. Recipient only.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/accept",
    params(("id" = String, Path, description = "Swap id")),
    responses(
        (status = 200, description = "Swap accepted", body = SwapView),
        (status = 400, description = "Swap is not pending", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only the recipient may accept", body = ErrorSchema),
        (status = 404, description = "Swap not found", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "acceptSwap",
    security(("SessionCookie" = []))
)]
#[put("/swaps/{id}/accept")]
pub async fn accept_swap(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<SwapView>> {
    apply_action(&state, actor, &path, SwapAction::Accept).await
}

/// Reject a pending swap. Recipient only.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/reject",
    params(("id" = String, Path, description = "Swap id")),
    responses(
        (status = 200, description = "Swap rejected", body = SwapView),
        (status = 400, description = "Swap is not pending", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only the recipient may reject", body = ErrorSchema),
        (status = 404, description = "Swap not found", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "rejectSwap",
    security(("SessionCookie" = []))
)]
#[put("/swaps/{id}/reject")]
pub async fn reject_swap(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<SwapView>> {
    apply_action(&state, actor, &path, SwapAction::Reject).await
}

/// Withdraw a pending swap. Requester only.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/cancel",
    params(("id" = String, Path, description = "Swap id")),
    responses(
        (status = 200, description = "Swap cancelled", body = SwapView),
        (status = 400, description = "Swap is not pending", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only the requester may cancel", body = ErrorSchema),
        (status = 404, description = "Swap not found", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "cancelSwap",
    security(("SessionCookie" = []))
)]
#[put("/swaps/{id}/cancel")]
pub async fn cancel_swap(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<SwapView>> {
    apply_action(&state, actor, &path, SwapAction::Cancel).await
}

/// Mark an accepted swap as completed. Either party.
#[utoipa::path(
    put,
    path = "/api/v1/swaps/{id}/complete",
    params(("id" = String, Path, description = "Swap id")),
    responses(
        (status = 200, description = "Swap completed", body = SwapView),
        (status = 400, description = "Swap is not accepted", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a party to the swap", body = ErrorSchema),
        (status = 404, description = "Swap not found", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "completeSwap",
    security(("SessionCookie" = []))
)]
#[put("/swaps/{id}/complete")]
pub async fn complete_swap(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<SwapView>> {
    apply_action(&state, actor, &path, SwapAction::Complete).await
}

/// Rate the other party of a completed swap.
///
/// Once both parties have rated, each party's rating aggregate is
/// recomputed from every completed, fully rated swap.
#[utoipa::path(
    post,
    path = "/api/v1/swaps/{id}/rate",
    params(("id" = String, Path, description = "Swap id")),
    request_body = RateSwapBody,
    responses(
        (status = 200, description = "Rating stored", body = SwapView),
        (status = 400, description = "Invalid rating or swap not completed", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a party to the swap", body = ErrorSchema),
        (status = 404, description = "Swap not found", body = ErrorSchema)
    ),
    tags = ["swaps"],
    operation_id = "rateSwap",
    security(("SessionCookie" = []))
)]
#[post("/swaps/{id}/rate")]
pub async fn rate_swap(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<RateSwapBody>,
) -> ApiResult<web::Json<SwapView>> {
    let swap_id = parse_id::<SwapId>(ID, &path)?;
    let rating = SwapRating::try_from(payload.into_inner())?;
    let details = state.swaps.rate(&actor.0, &swap_id, rating).await?;
    Ok(web::Json(SwapView::from(&details)))
}

/// Register the swap routes. Literal paths come before `{id}` patterns.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_swap)
        .service(my_swaps)
        .service(get_swap)
        .service(accept_swap)
        .service(reject_swap)
        .service(cancel_swap)
        .service(complete_swap)
        .service(rate_swap);
}

#[cfg(test)]
#[path = "swaps_tests.rs"]
mod tests;
