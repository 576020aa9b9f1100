//! Skill catalogue entries and their moderation state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SkillId, UserId};

/// Minimum length of a skill name.
pub const SKILL_NAME_MIN: usize = 2;
/// Maximum length of a skill name.
pub const SKILL_NAME_MAX: usize = 100;
/// Maximum length of a skill description.
pub const SKILL_DESCRIPTION_MAX: usize = 500;
/// Maximum length of a skill category.
pub const SKILL_CATEGORY_MAX: usize = 50;
/// Maximum length of a moderation rejection reason.
pub const REJECTION_REASON_MAX: usize = 200;

/// Validation errors for skill fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkillValidationError {
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("category must be at most {max} characters")]
    CategoryTooLong { max: usize },
    #[error("type must be one of: offered, wanted")]
    UnknownType(String),
    #[error("level must be one of: beginner, intermediate, advanced, expert")]
    UnknownLevel(String),
    #[error("rejection reason must be between 1 and {max} characters")]
    ReasonLength { max: usize },
    #[error("unknown moderation state: {0}")]
    UnknownModerationState(String),
}

impl SkillValidationError {
    /// Name of the field that failed validation.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NameLength { .. } => "name",
            Self::DescriptionTooLong { .. } => "description",
            Self::CategoryTooLong { .. } => "category",
            Self::UnknownType(_) => "type",
            Self::UnknownLevel(_) => "level",
            Self::ReasonLength { .. } => "reason",
            Self::UnknownModerationState(_) => "moderationState",
        }
    }
}

/// Whether a user teaches or wants to learn a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Offered,
    Wanted,
}

impl SkillType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offered => "offered",
            Self::Wanted => "wanted",
        }
    }
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillType {
    type Err = SkillValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offered" => Ok(Self::Offered),
            "wanted" => Ok(Self::Wanted),
            other => Err(SkillValidationError::UnknownType(other.to_owned())),
        }
    }
}

/// Proficiency level of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = SkillValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(SkillValidationError::UnknownLevel(other.to_owned())),
        }
    }
}

/// Trimmed skill name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkillName(String);

impl SkillName {
    pub fn new(name: impl Into<String>) -> Result<Self, SkillValidationError> {
        let name = name.into().trim().to_owned();
        let length = name.chars().count();
        if !(SKILL_NAME_MIN..=SKILL_NAME_MAX).contains(&length) {
            return Err(SkillValidationError::NameLength {
                min: SKILL_NAME_MIN,
                max: SKILL_NAME_MAX,
            });
        }
        Ok(Self(name))
    }

    /// Case-insensitive equality used for duplicate detection.
    pub fn matches_ignoring_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl AsRef<str> for SkillName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SkillName> for String {
    fn from(value: SkillName) -> Self {
        value.0
    }
}

impl TryFrom<String> for SkillName {
    type Error = SkillValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate an optional description. Blank becomes `None`.
pub fn normalise_description(value: Option<String>) -> Result<Option<String>, SkillValidationError> {
    normalise_optional(value, SKILL_DESCRIPTION_MAX, |max| {
        SkillValidationError::DescriptionTooLong { max }
    })
}

/// Validate an optional category. Blank becomes `None`.
pub fn normalise_category(value: Option<String>) -> Result<Option<String>, SkillValidationError> {
    normalise_optional(value, SKILL_CATEGORY_MAX, |max| {
        SkillValidationError::CategoryTooLong { max }
    })
}

fn normalise_optional(
    value: Option<String>,
    max: usize,
    error: impl FnOnce(usize) -> SkillValidationError,
) -> Result<Option<String>, SkillValidationError> {
    let value = value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty());
    if value.as_deref().is_some_and(|text| text.chars().count() > max) {
        return Err(error(max));
    }
    Ok(value)
}

/// Reason recorded when an administrator rejects a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RejectionReason(String);

impl RejectionReason {
    pub fn new(reason: impl Into<String>) -> Result<Self, SkillValidationError> {
        let reason = reason.into().trim().to_owned();
        let length = reason.chars().count();
        if length == 0 || length > REJECTION_REASON_MAX {
            return Err(SkillValidationError::ReasonLength {
                max: REJECTION_REASON_MAX,
            });
        }
        Ok(Self(reason))
    }
}

impl AsRef<str> for RejectionReason {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<RejectionReason> for String {
    fn from(value: RejectionReason) -> Self {
        value.0
    }
}

impl TryFrom<String> for RejectionReason {
    type Error = SkillValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Moderation state of a skill.
///
/// Being approved and rejected at once is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationState {
    Approved,
    Pending,
    Rejected { reason: RejectionReason },
}

impl ModerationState {
    /// Storage tag for the state.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected { .. } => "rejected",
        }
    }

    /// Rebuild a state from its storage tag and optional reason.
    ///
    /// A rejected row without a usable reason is restored with a placeholder
    /// so that legacy rows stay readable.
    pub fn from_parts(tag: &str, reason: Option<String>) -> Result<Self, SkillValidationError> {
        match tag {
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "rejected" => {
                let reason = reason
                    .and_then(|text| RejectionReason::new(text).ok())
                    .map_or_else(|| RejectionReason::new("rejected"), Ok)?;
                Ok(Self::Rejected { reason })
            }
            other => Err(SkillValidationError::UnknownModerationState(other.to_owned())),
        }
    }

    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }

    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason } => Some(reason.as_ref()),
            Self::Approved | Self::Pending => None,
        }
    }
}

/// Initial moderation applied to newly created skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkillModerationPolicy {
    /// New skills are visible immediately.
    #[default]
    AutoApprove,
    /// New skills wait in the admin review queue.
    ReviewRequired,
}

impl SkillModerationPolicy {
    pub const fn from_review_required(review_required: bool) -> Self {
        if review_required {
            Self::ReviewRequired
        } else {
            Self::AutoApprove
        }
    }

    pub const fn initial_state(self) -> ModerationState {
        match self {
            Self::AutoApprove => ModerationState::Approved,
            Self::ReviewRequired => ModerationState::Pending,
        }
    }
}

/// Validated input for creating a skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSkill {
    pub name: SkillName,
    pub description: Option<String>,
    pub category: Option<String>,
    pub skill_type: SkillType,
    pub level: SkillLevel,
}

/// Validated partial skill update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillUpdate {
    pub name: Option<SkillName>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    /// `Some(None)` clears the category.
    pub category: Option<Option<String>>,
    pub level: Option<SkillLevel>,
}

/// A skill listed by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub id: SkillId,
    pub owner: UserId,
    pub name: SkillName,
    pub description: Option<String>,
    pub category: Option<String>,
    pub skill_type: SkillType,
    pub level: SkillLevel,
    pub moderation: ModerationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Skill {
    /// Create a skill for `owner` under the given moderation policy.
    pub fn create(
        id: SkillId,
        owner: UserId,
        input: NewSkill,
        policy: SkillModerationPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let NewSkill {
            name,
            description,
            category,
            skill_type,
            level,
        } = input;
        Self {
            id,
            owner,
            name,
            description,
            category,
            skill_type,
            level,
            moderation: policy.initial_state(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Visible in search, browse, and profiles.
    pub const fn is_visible(&self) -> bool {
        self.moderation.is_approved()
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Apply an owner edit. Moderation state is left untouched.
    pub fn apply_update(&mut self, update: SkillUpdate, now: DateTime<Utc>) {
        let SkillUpdate {
            name,
            description,
            category,
            level,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(level) = level {
            self.level = level;
        }
        self.updated_at = now;
    }

    pub fn approve(&mut self, now: DateTime<Utc>) {
        self.moderation = ModerationState::Approved;
        self.updated_at = now;
    }

    pub fn reject(&mut self, reason: RejectionReason, now: DateTime<Utc>) {
        self.moderation = ModerationState::Rejected { reason };
        self.updated_at = now;
    }
}
