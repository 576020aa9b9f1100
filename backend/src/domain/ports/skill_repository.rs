//! Port for skill catalogue persistence.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};
use tracing::warn;

use crate::domain::reports::DateRange;
use crate::domain::{Error, Skill, SkillId, SkillLevel, SkillType, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by skill repository adapters.
    pub enum SkillRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "skill repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "skill repository query failed: {message}",
    }
}

impl From<SkillRepositoryError> for Error {
    fn from(value: SkillRepositoryError) -> Self {
        match value {
            SkillRepositoryError::Connection { message } => {
                warn!(%message, "skill store unavailable");
                Error::service_unavailable("skill store unavailable")
            }
            SkillRepositoryError::Query { message } => {
                Error::internal(format!("skill store error: {message}"))
            }
        }
    }
}

/// Moderation states a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModerationFilter {
    #[default]
    Any,
    /// Approved and not rejected.
    Visible,
    /// Awaiting review.
    Pending,
}

/// Selection criteria for skill listings.
///
/// Text matches are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillFilter {
    pub owner: Option<UserId>,
    pub moderation: ModerationFilter,
    pub skill_type: Option<SkillType>,
    pub level: Option<SkillLevel>,
    /// Matches name or description.
    pub text: Option<String>,
    /// Matches name only.
    pub name: Option<String>,
    pub category: Option<String>,
    pub created_between: Option<DateRange>,
}

fn contains_ignoring_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl SkillFilter {
    /// Whether `skill` satisfies every criterion.
    pub fn matches(&self, skill: &Skill) -> bool {
        let moderation_hit = match self.moderation {
            ModerationFilter::Any => true,
            ModerationFilter::Visible => skill.moderation.is_approved(),
            ModerationFilter::Pending => {
                !skill.moderation.is_approved() && !skill.moderation.is_rejected()
            }
        };
        let text_hit = self.text.as_deref().is_none_or(|term| {
            contains_ignoring_case(skill.name.as_ref(), term)
                || skill
                    .description
                    .as_deref()
                    .is_some_and(|description| contains_ignoring_case(description, term))
        });
        let name_hit = self
            .name
            .as_deref()
            .is_none_or(|term| contains_ignoring_case(skill.name.as_ref(), term));
        let category_hit = self.category.as_deref().is_none_or(|term| {
            skill
                .category
                .as_deref()
                .is_some_and(|category| contains_ignoring_case(category, term))
        });
        moderation_hit
            && text_hit
            && name_hit
            && category_hit
            && self.owner.is_none_or(|owner| skill.owner == owner)
            && self.skill_type.is_none_or(|kind| skill.skill_type == kind)
            && self.level.is_none_or(|level| skill.level == level)
            && self
                .created_between
                .is_none_or(|range| range.contains(skill.created_at))
    }
}

/// Port for reading and writing skills.
///
/// Listings are ordered newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepository: Send + Sync {
    /// Store a new skill.
    async fn insert(&self, skill: &Skill) -> Result<(), SkillRepositoryError>;

    /// Find a skill by id.
    async fn find_by_id(&self, id: &SkillId) -> Result<Option<Skill>, SkillRepositoryError>;

    /// Load several skills at once. Unknown ids are skipped.
    async fn find_many(&self, ids: &[SkillId]) -> Result<Vec<Skill>, SkillRepositoryError>;

    /// Owner's skill with the same type and a case-insensitively equal name.
    async fn find_duplicate(
        &self,
        owner: &UserId,
        name: &str,
        skill_type: SkillType,
    ) -> Result<Option<Skill>, SkillRepositoryError>;

    /// Overwrite an existing skill.
    async fn update(&self, skill: &Skill) -> Result<(), SkillRepositoryError>;

    /// Remove a skill. Returns whether it existed.
    async fn delete(&self, id: &SkillId) -> Result<bool, SkillRepositoryError>;

    /// One page of matching skills.
    async fn search(
        &self,
        filter: &SkillFilter,
        page: PageParams,
    ) -> Result<Paginated<Skill>, SkillRepositoryError>;

    /// Every matching skill.
    async fn list(&self, filter: &SkillFilter) -> Result<Vec<Skill>, SkillRepositoryError>;

    /// Number of matching skills.
    async fn count(&self, filter: &SkillFilter) -> Result<u64, SkillRepositoryError>;
}
