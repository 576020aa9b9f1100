//! Driving port for owner edits to the skill catalogue.

use async_trait::async_trait;

use crate::domain::{Actor, Error, NewSkill, Skill, SkillId, SkillUpdate};

/// Driving port for creating, editing, and deleting one's own skills.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillCommand: Send + Sync {
    async fn create(&self, actor: &Actor, input: NewSkill) -> Result<Skill, Error>;

    async fn update(
        &self,
        actor: &Actor,
        skill_id: &SkillId,
        update: SkillUpdate,
    ) -> Result<Skill, Error>;

    async fn delete(&self, actor: &Actor, skill_id: &SkillId) -> Result<(), Error>;
}
