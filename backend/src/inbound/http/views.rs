//! Response bodies shared by several endpoint groups.
//!
//! Views are built from domain values and never expose the credential
//! hash. Email addresses appear only on the caller's own profile, on swap
//! parties, and in admin listings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{OwnerSummary, PartySummary, SkillListing, SkillSummary, SwapDetails};
use crate::domain::{AdminMessage, RatingAggregate, Skill, SwapParty, SwapRating, User};

/// Aggregate of ratings a user has received.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct RatingView {
    #[schema(example = 4.5)]
    pub average: f64,
    #[schema(example = 2)]
    pub count: u32,
}

impl From<RatingAggregate> for RatingView {
    fn from(value: RatingAggregate) -> Self {
        Self {
            average: value.average(),
            count: value.count(),
        }
    }
}

/// A user as shown to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Present on the caller's own profile and in admin listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub location: Option<String>,
    pub is_public: bool,
    pub availability: Vec<String>,
    pub rating: RatingView,
    #[schema(example = "user")]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_banned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl UserView {
    /// Fields any authenticated user may see.
    pub fn public(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            name: user.name.to_string(),
            email: None,
            location: user.location.clone(),
            is_public: user.is_public,
            availability: user.availability.clone(),
            rating: user.rating.into(),
            role: user.role.as_str().to_owned(),
            is_banned: None,
            ban_reason: None,
            last_active: user.last_active,
            created_at: user.created_at,
        }
    }

    /// Every field except the credential hash.
    pub fn private(user: &User) -> Self {
        Self {
            email: Some(user.email.to_string()),
            is_banned: Some(user.is_banned),
            ban_reason: user.ban_reason.clone(),
            ..Self::public(user)
        }
    }
}

/// A skill as shown to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillView {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Sourdough baking")]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "offered")]
    pub skill_type: String,
    #[schema(example = "intermediate")]
    pub level: String,
    pub is_approved: bool,
    pub is_rejected: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Skill> for SkillView {
    fn from(skill: &Skill) -> Self {
        Self {
            id: *skill.id.as_uuid(),
            owner_id: *skill.owner.as_uuid(),
            name: skill.name.to_string(),
            description: skill.description.clone(),
            category: skill.category.clone(),
            skill_type: skill.skill_type.as_str().to_owned(),
            level: skill.level.as_str().to_owned(),
            is_approved: skill.moderation.is_approved(),
            is_rejected: skill.moderation.is_rejected(),
            rejection_reason: skill.moderation.rejection_reason().map(str::to_owned),
            created_at: skill.created_at,
            updated_at: skill.updated_at,
        }
    }
}

/// Public summary of a skill's owner.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnerView {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub rating: RatingView,
}

impl From<&OwnerSummary> for OwnerView {
    fn from(owner: &OwnerSummary) -> Self {
        Self {
            id: *owner.id.as_uuid(),
            name: owner.name.to_string(),
            location: owner.location.clone(),
            rating: owner.rating.into(),
        }
    }
}

/// A skill together with its owner; `owner` is null when the owner is gone.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkillListingView {
    #[serde(flatten)]
    pub skill: SkillView,
    pub owner: Option<OwnerView>,
}

impl From<&SkillListing> for SkillListingView {
    fn from(listing: &SkillListing) -> Self {
        Self {
            skill: SkillView::from(&listing.skill),
            owner: listing.owner.as_ref().map(OwnerView::from),
        }
    }
}

/// A swap party.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartyView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&PartySummary> for PartyView {
    fn from(party: &PartySummary) -> Self {
        Self {
            id: *party.id.as_uuid(),
            name: party.name.to_string(),
            email: party.email.to_string(),
        }
    }
}

/// Skill fields embedded in a swap.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkillSummaryView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[schema(example = "beginner")]
    pub level: String,
}

impl From<&SkillSummary> for SkillSummaryView {
    fn from(skill: &SkillSummary) -> Self {
        Self {
            id: *skill.id.as_uuid(),
            name: skill.name.to_string(),
            description: skill.description.clone(),
            category: skill.category.clone(),
            level: skill.level.as_str().to_owned(),
        }
    }
}

/// One party's rating of the other.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SwapRatingView {
    #[schema(minimum = 1, maximum = 5)]
    pub rating: u8,
    pub comment: Option<String>,
}

impl From<&SwapRating> for SwapRatingView {
    fn from(rating: &SwapRating) -> Self {
        Self {
            rating: rating.rating().value(),
            comment: rating.comment().map(str::to_owned),
        }
    }
}

/// Both rating slots of a swap.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapRatingsView {
    pub from_requester: Option<SwapRatingView>,
    pub from_recipient: Option<SwapRatingView>,
}

/// A swap with its parties and skills.
///
/// Summaries are null when the referenced record no longer exists; the ids
/// are always present.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapView {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub requested_skill_id: Uuid,
    pub offered_skill_id: Uuid,
    pub requester: Option<PartyView>,
    pub recipient: Option<PartyView>,
    pub requested_skill: Option<SkillSummaryView>,
    pub offered_skill: Option<SkillSummaryView>,
    #[schema(example = "pending")]
    pub status: String,
    pub message: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rating: SwapRatingsView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SwapDetails> for SwapView {
    fn from(details: &SwapDetails) -> Self {
        let swap = &details.swap;
        Self {
            id: *swap.id().as_uuid(),
            requester_id: *swap.requester().as_uuid(),
            recipient_id: *swap.recipient().as_uuid(),
            requested_skill_id: *swap.requested_skill().as_uuid(),
            offered_skill_id: *swap.offered_skill().as_uuid(),
            requester: details.requester.as_ref().map(PartyView::from),
            recipient: details.recipient.as_ref().map(PartyView::from),
            requested_skill: details.requested_skill.as_ref().map(SkillSummaryView::from),
            offered_skill: details.offered_skill.as_ref().map(SkillSummaryView::from),
            status: swap.status().as_str().to_owned(),
            message: swap.message().map(str::to_owned),
            scheduled_date: swap.scheduled_date(),
            completed_at: swap.completed_at(),
            rating: SwapRatingsView {
                from_requester: swap
                    .rating_from(SwapParty::Requester)
                    .map(SwapRatingView::from),
                from_recipient: swap
                    .rating_from(SwapParty::Recipient)
                    .map(SwapRatingView::from),
            },
            created_at: swap.created_at(),
            updated_at: swap.updated_at(),
        }
    }
}

/// A platform message.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessageView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    #[schema(example = "info")]
    pub message_type: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&AdminMessage> for AdminMessageView {
    fn from(message: &AdminMessage) -> Self {
        Self {
            id: *message.id.as_uuid(),
            title: message.title.as_ref().to_owned(),
            content: message.content.as_ref().to_owned(),
            message_type: message.message_type.as_str().to_owned(),
            is_active: message.is_active,
            expires_at: message.expires_at,
            created_by: *message.created_by.as_uuid(),
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}
