//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts with their rating aggregate.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        credential_hash -> Text,
        location -> Nullable<Varchar>,
        is_public -> Bool,
        is_banned -> Bool,
        ban_reason -> Nullable<Varchar>,
        /// `user` or `admin`.
        role -> Varchar,
        availability -> Array<Text>,
        rating_average -> Float8,
        rating_count -> Int4,
        last_active -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Offered and wanted skills.
    skills (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        description -> Nullable<Varchar>,
        category -> Nullable<Varchar>,
        skill_type -> Varchar,
        level -> Varchar,
        /// `approved`, `pending`, or `rejected`.
        moderation_state -> Varchar,
        rejection_reason -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Swap requests and their two rating slots.
    swaps (id) {
        id -> Uuid,
        requester_id -> Uuid,
        recipient_id -> Uuid,
        requested_skill_id -> Uuid,
        offered_skill_id -> Uuid,
        status -> Varchar,
        message -> Nullable<Varchar>,
        scheduled_date -> Nullable<Timestamptz>,
        completed_at -> Nullable<Timestamptz>,
        requester_rating -> Nullable<Int2>,
        requester_comment -> Nullable<Varchar>,
        recipient_rating -> Nullable<Int2>,
        recipient_comment -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Platform-wide announcements.
    admin_messages (id) {
        id -> Uuid,
        title -> Varchar,
        content -> Varchar,
        message_type -> Varchar,
        is_active -> Bool,
        expires_at -> Nullable<Timestamptz>,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(skills -> users (owner_id));
diesel::joinable!(admin_messages -> users (created_by));

diesel::allow_tables_to_appear_in_same_query!(users, skills, swaps, admin_messages);
