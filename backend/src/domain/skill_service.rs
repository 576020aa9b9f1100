//! Skill catalogue service.
//!
//! Implements owner edits, catalogue reads, and the admin review queue on top
//! of the skill and user repositories.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use tracing::info;

use crate::domain::ports::{
    ModerationFilter, OwnedSkills, OwnerSummary, SkillCommand, SkillFilter, SkillListing,
    SkillModeration, SkillQuery, SkillRepository, SkillSearch, UserRepository,
};
use crate::domain::{
    Actor, Error, NewSkill, RejectionReason, Skill, SkillId, SkillModerationPolicy, SkillType,
    SkillUpdate, UserId,
};

fn skill_not_found(skill_id: &SkillId) -> Error {
    Error::not_found(format!("skill {skill_id} not found"))
}

fn duplicate_skill(skill_type: SkillType) -> Error {
    Error::conflict(format!("you already list this skill as {skill_type}"))
}

/// Skill service implementing [`SkillCommand`], [`SkillQuery`] and
/// [`SkillModeration`].
#[derive(Clone)]
pub struct SkillService {
    users: Arc<dyn UserRepository>,
    skills: Arc<dyn SkillRepository>,
    clock: Arc<dyn Clock>,
    policy: SkillModerationPolicy,
}

impl SkillService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        skills: Arc<dyn SkillRepository>,
        clock: Arc<dyn Clock>,
        policy: SkillModerationPolicy,
    ) -> Self {
        Self {
            users,
            skills,
            clock,
            policy,
        }
    }

    async fn find_skill(&self, skill_id: &SkillId) -> Result<Skill, Error> {
        self.skills
            .find_by_id(skill_id)
            .await?
            .ok_or_else(|| skill_not_found(skill_id))
    }

    async fn find_owned(&self, actor: &Actor, skill_id: &SkillId) -> Result<Skill, Error> {
        let skill = self.find_skill(skill_id).await?;
        if !skill.is_owned_by(actor.user_id()) {
            return Err(Error::forbidden("not authorized to modify this skill"));
        }
        Ok(skill)
    }

    /// Attach owner summaries with one user lookup per page.
    async fn with_owners(&self, page: Paginated<Skill>) -> Result<Paginated<SkillListing>, Error> {
        let mut owner_ids: Vec<UserId> = page.items.iter().map(|skill| skill.owner).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();
        let owners: HashMap<UserId, OwnerSummary> = if owner_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_many(&owner_ids)
                .await?
                .iter()
                .map(|user| (user.id, OwnerSummary::from(user)))
                .collect()
        };
        Ok(page.map(|skill| SkillListing {
            owner: owners.get(&skill.owner).cloned(),
            skill,
        }))
    }

    async fn moderate(
        &self,
        actor: &Actor,
        skill_id: &SkillId,
        decide: impl FnOnce(&mut Skill),
    ) -> Result<Skill, Error> {
        actor.require_admin()?;
        let mut skill = self.find_skill(skill_id).await?;
        decide(&mut skill);
        self.skills.update(&skill).await?;
        info!(
            skill_id = %skill.id,
            state = skill.moderation.tag(),
            admin = %actor.user_id(),
            "skill moderated"
        );
        Ok(skill)
    }
}

#[async_trait]
impl SkillCommand for SkillService {
    async fn create(&self, actor: &Actor, input: NewSkill) -> Result<Skill, Error> {
        let existing = self
            .skills
            .find_duplicate(actor.user_id(), input.name.as_ref(), input.skill_type)
            .await?;
        if existing.is_some() {
            return Err(duplicate_skill(input.skill_type));
        }

        let skill = Skill::create(
            SkillId::random(),
            *actor.user_id(),
            input,
            self.policy,
            self.clock.utc(),
        );
        self.skills.insert(&skill).await?;
        info!(
            skill_id = %skill.id,
            owner = %skill.owner,
            skill_type = %skill.skill_type,
            state = skill.moderation.tag(),
            "skill created"
        );
        Ok(skill)
    }

    async fn update(
        &self,
        actor: &Actor,
        skill_id: &SkillId,
        update: SkillUpdate,
    ) -> Result<Skill, Error> {
        let mut skill = self.find_owned(actor, skill_id).await?;
        if let Some(name) = update.name.as_ref() {
            let clash = self
                .skills
                .find_duplicate(actor.user_id(), name.as_ref(), skill.skill_type)
                .await?;
            if clash.is_some_and(|other| other.id != skill.id) {
                return Err(duplicate_skill(skill.skill_type));
            }
        }

        skill.apply_update(update, self.clock.utc());
        self.skills.update(&skill).await?;
        info!(skill_id = %skill.id, "skill updated");
        Ok(skill)
    }

    async fn delete(&self, actor: &Actor, skill_id: &SkillId) -> Result<(), Error> {
        self.find_owned(actor, skill_id).await?;
        if !self.skills.delete(skill_id).await? {
            return Err(skill_not_found(skill_id));
        }
        info!(skill_id = %skill_id, owner = %actor.user_id(), "skill deleted");
        Ok(())
    }
}

#[async_trait]
impl SkillQuery for SkillService {
    async fn my_skills(&self, actor: &Actor) -> Result<OwnedSkills, Error> {
        let filter = SkillFilter {
            owner: Some(*actor.user_id()),
            moderation: ModerationFilter::Visible,
            ..SkillFilter::default()
        };
        let (offered, wanted) = self
            .skills
            .list(&filter)
            .await?
            .into_iter()
            .partition(|skill| skill.skill_type == SkillType::Offered);
        Ok(OwnedSkills { offered, wanted })
    }

    async fn search(
        &self,
        search: SkillSearch,
        page: PageParams,
    ) -> Result<Paginated<SkillListing>, Error> {
        let SkillSearch {
            text,
            skill_type,
            category,
            level,
        } = search;
        let filter = SkillFilter {
            moderation: ModerationFilter::Visible,
            skill_type,
            level,
            text,
            category,
            ..SkillFilter::default()
        };
        let skills = self.skills.search(&filter, page).await?;
        self.with_owners(skills).await
    }
}

#[async_trait]
impl SkillModeration for SkillService {
    async fn pending(
        &self,
        actor: &Actor,
        page: PageParams,
    ) -> Result<Paginated<SkillListing>, Error> {
        actor.require_admin()?;
        let filter = SkillFilter {
            moderation: ModerationFilter::Pending,
            ..SkillFilter::default()
        };
        let skills = self.skills.search(&filter, page).await?;
        self.with_owners(skills).await
    }

    async fn approve(&self, actor: &Actor, skill_id: &SkillId) -> Result<Skill, Error> {
        let now = self.clock.utc();
        self.moderate(actor, skill_id, |skill| skill.approve(now))
            .await
    }

    async fn reject(
        &self,
        actor: &Actor,
        skill_id: &SkillId,
        reason: RejectionReason,
    ) -> Result<Skill, Error> {
        let now = self.clock.utc();
        self.moderate(actor, skill_id, move |skill| skill.reject(reason, now))
            .await
    }
}

#[cfg(test)]
#[path = "skill_service_tests.rs"]
mod tests;
