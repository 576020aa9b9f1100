//! Diesel row models for the SkillSwap tables.
//!
//! Rows mirror `schema.rs` one to one. Conversion into validated domain
//! types lives next to each repository so that decoding failures are
//! reported with that repository's error type.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{admin_messages, skills, swaps, users};

/// Full row of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub credential_hash: String,
    pub location: Option<String>,
    pub is_public: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub role: String,
    pub availability: Vec<String>,
    pub rating_average: f64,
    pub rating_count: i32,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile, ban, and role columns written by `UserRepository::update`.
///
/// Rating and activity columns have their own narrow writes.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileChangeset<'a> {
    pub name: &'a str,
    pub location: Option<&'a str>,
    pub is_public: bool,
    pub is_banned: bool,
    pub ban_reason: Option<&'a str>,
    pub role: &'a str,
    pub availability: &'a [String],
    pub updated_at: DateTime<Utc>,
}

/// Full row of the `skills` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = skills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SkillRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub skill_type: String,
    pub level: String,
    pub moderation_state: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable columns of a skill.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = skills)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SkillChangeset<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub level: &'a str,
    pub moderation_state: &'a str,
    pub rejection_reason: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Full row of the `swaps` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = swaps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SwapRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub requested_skill_id: Uuid,
    pub offered_skill_id: Uuid,
    pub status: String,
    pub message: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub requester_rating: Option<i16>,
    pub requester_comment: Option<String>,
    pub recipient_rating: Option<i16>,
    pub recipient_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns touched by a status transition.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = swaps)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SwapStatusChangeset<'a> {
    pub status: &'a str,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Full row of the `admin_messages` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = admin_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminMessageRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub message_type: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = admin_messages)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AdminMessageChangeset<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub message_type: &'a str,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
