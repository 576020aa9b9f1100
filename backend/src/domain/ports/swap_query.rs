//! Driving port for reading swaps, plus the enriched swap view.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::{
    Actor, DisplayName, EmailAddress, Error, Skill, SkillId, SkillLevel, SkillName, Swap, SwapId,
    SwapStatus, User, UserId,
};

/// Identity of a swap party as shown on a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartySummary {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
}

impl From<&User> for PartySummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Skill fields shown on a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSummary {
    pub id: SkillId,
    pub name: SkillName,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: SkillLevel,
}

impl From<&Skill> for SkillSummary {
    fn from(skill: &Skill) -> Self {
        Self {
            id: skill.id,
            name: skill.name.clone(),
            description: skill.description.clone(),
            category: skill.category.clone(),
            level: skill.level,
        }
    }
}

/// A swap with its parties and skills resolved.
///
/// Summaries are `None` when the referenced record no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapDetails {
    pub swap: Swap,
    pub requester: Option<PartySummary>,
    pub recipient: Option<PartySummary>,
    pub requested_skill: Option<SkillSummary>,
    pub offered_skill: Option<SkillSummary>,
}

/// Driving port for swap reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapQuery: Send + Sync {
    /// A swap visible to `actor`. Only the two parties may read it.
    async fn get(&self, actor: &Actor, swap_id: &SwapId) -> Result<SwapDetails, Error>;

    /// Swaps in which `actor` takes part, newest first.
    async fn list_mine(
        &self,
        actor: &Actor,
        status: Option<SwapStatus>,
        page: PageParams,
    ) -> Result<Paginated<SwapDetails>, Error>;
}
