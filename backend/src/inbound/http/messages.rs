//! Platform message handlers.
//!
//! ```text
//! GET    /api/v1/admin/messages/public
//! POST   /api/v1/admin/messages
//! GET    /api/v1/admin/messages?active=&page=&limit=
//! PUT    /api/v1/admin/messages/{id}
//! DELETE /api/v1/admin/messages/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AdminMessageUpdate, AdminMessageValidationError, Error, MessageContent, MessageId,
    MessageTitle, MessageType, NewAdminMessage,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::schemas::{ErrorSchema, Page};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value, page_params, parse_id, parse_optional, parse_timestamp, present,
    required,
};
use crate::inbound::http::views::AdminMessageView;

const TITLE: FieldName = FieldName::new("title");
const CONTENT: FieldName = FieldName::new("content");
const TYPE: FieldName = FieldName::new("type");
const EXPIRES_AT: FieldName = FieldName::new("expiresAt");

fn message_error(err: AdminMessageValidationError) -> Error {
    invalid_value(FieldName::new(err.field()), err)
}

fn expiry(raw: Option<String>) -> Result<Option<DateTime<Utc>>, Error> {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_timestamp(EXPIRES_AT, value))
        .transpose()
}

/// Request body for `POST /api/v1/admin/messages`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageBody {
    #[schema(min_length = 1, max_length = 200)]
    pub title: Option<String>,
    #[schema(min_length = 1, max_length = 2000)]
    pub content: Option<String>,
    /// `info`, `warning`, `alert` or `update`. Defaults to `info`.
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    #[schema(format = "date-time")]
    pub expires_at: Option<String>,
}

impl TryFrom<CreateMessageBody> for NewAdminMessage {
    type Error = Error;

    fn try_from(body: CreateMessageBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: MessageTitle::new(required(TITLE, body.title)?).map_err(message_error)?,
            content: MessageContent::new(required(CONTENT, body.content)?)
                .map_err(message_error)?,
            message_type: parse_optional::<MessageType>(TYPE, body.message_type.as_deref())?
                .unwrap_or_default(),
            expires_at: expiry(body.expires_at)?,
        })
    }
}

/// Request body for `PUT /api/v1/admin/messages/{id}`. Absent fields are
/// kept; `expiresAt: null` removes the expiry.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageBody {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub expires_at: Option<Option<String>>,
}

impl TryFrom<UpdateMessageBody> for AdminMessageUpdate {
    type Error = Error;

    fn try_from(body: UpdateMessageBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: body
                .title
                .map(MessageTitle::new)
                .transpose()
                .map_err(message_error)?,
            content: body
                .content
                .map(MessageContent::new)
                .transpose()
                .map_err(message_error)?,
            message_type: parse_optional::<MessageType>(TYPE, body.message_type.as_deref())?,
            is_active: body.is_active,
            expires_at: body.expires_at.map(expiry).transpose()?,
        })
    }
}

/// Query string for `GET /api/v1/admin/messages`.
#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub active: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Live messages for every visitor, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/messages/public",
    responses(
        (status = 200, description = "Up to five live messages", body = [AdminMessageView])
    ),
    tags = ["messages"],
    operation_id = "listPublicMessages"
)]
#[get("/admin/messages/public")]
pub async fn public_messages(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<AdminMessageView>>> {
    let messages = state.messages.public().await?;
    Ok(web::Json(
        messages.iter().map(AdminMessageView::from).collect(),
    ))
}

/// Publish a platform message.
#[utoipa::path(
    post,
    path = "/api/v1/admin/messages",
    request_body = CreateMessageBody,
    responses(
        (status = 201, description = "Message created", body = AdminMessageView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "createMessage",
    security(("SessionCookie" = []))
)]
#[post("/admin/messages")]
pub async fn create_message(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<CreateMessageBody>,
) -> ApiResult<HttpResponse> {
    let input = NewAdminMessage::try_from(payload.into_inner())?;
    let message = state.messages.create(&actor.0, input).await?;
    Ok(HttpResponse::Created().json(AdminMessageView::from(&message)))
}

/// Every message, or only live ones with `active=true`.
#[utoipa::path(
    get,
    path = "/api/v1/admin/messages",
    params(
        ("active" = Option<bool>, Query, description = "Only active, unexpired messages"),
        ("page" = Option<u32>, Query, description = "Page number, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10, max 100")
    ),
    responses(
        (status = 200, description = "Messages", body = Page<AdminMessageView>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listMessages",
    security(("SessionCookie" = []))
)]
#[get("/admin/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    query: web::Query<ListMessagesQuery>,
) -> ApiResult<web::Json<Paginated<AdminMessageView>>> {
    let query = query.into_inner();
    let live_only =
        parse_optional::<bool>(FieldName::new("active"), query.active.as_deref())?.unwrap_or(false);
    let page = page_params(query.page, query.limit)?;
    let messages = state.messages.list(&actor.0, live_only, page).await?;
    Ok(web::Json(
        messages.map(|message| AdminMessageView::from(&message)),
    ))
}

/// Edit a message.
#[utoipa::path(
    put,
    path = "/api/v1/admin/messages/{id}",
    params(("id" = String, Path, description = "Message id")),
    request_body = UpdateMessageBody,
    responses(
        (status = 200, description = "Message updated", body = AdminMessageView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "updateMessage",
    security(("SessionCookie" = []))
)]
#[put("/admin/messages/{id}")]
pub async fn update_message(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<UpdateMessageBody>,
) -> ApiResult<web::Json<AdminMessageView>> {
    let message_id = parse_id::<MessageId>(FieldName::new("id"), &path)?;
    let update = AdminMessageUpdate::try_from(payload.into_inner())?;
    let message = state.messages.update(&actor.0, &message_id, update).await?;
    Ok(web::Json(AdminMessageView::from(&message)))
}

/// Remove a message.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/messages/{id}",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin only", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "deleteMessage",
    security(("SessionCookie" = []))
)]
#[delete("/admin/messages/{id}")]
pub async fn delete_message(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let message_id = parse_id::<MessageId>(FieldName::new("id"), &path)?;
    state.messages.delete(&actor.0, &message_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the message routes; the public feed precedes `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(public_messages)
        .service(create_message)
        .service(list_messages)
        .service(update_message)
        .service(delete_message);
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
