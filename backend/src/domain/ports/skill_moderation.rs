//! Driving port for the admin skill review queue.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::{Actor, Error, RejectionReason, Skill, SkillId};

use super::SkillListing;

/// Driving port for approving and rejecting skills. Admin only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillModeration: Send + Sync {
    /// Skills awaiting review, newest first.
    async fn pending(
        &self,
        actor: &Actor,
        page: PageParams,
    ) -> Result<Paginated<SkillListing>, Error>;

    async fn approve(&self, actor: &Actor, skill_id: &SkillId) -> Result<Skill, Error>;

    async fn reject(
        &self,
        actor: &Actor,
        skill_id: &SkillId,
        reason: RejectionReason,
    ) -> Result<Skill, Error>;
}
