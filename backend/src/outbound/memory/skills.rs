//! In-memory `SkillRepository`.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::ports::{SkillFilter, SkillRepository, SkillRepositoryError};
use crate::domain::{Skill, SkillId, SkillType, UserId};

use super::{PoisonedStore, Store, newest_first};

#[derive(Debug, Default)]
pub struct InMemorySkillRepository {
    skills: Store<SkillId, Skill>,
}

impl InMemorySkillRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, filter: &SkillFilter) -> Result<Vec<Skill>, SkillRepositoryError> {
        let mut skills = self
            .skills
            .collect(|skill| filter.matches(skill))
            .map_err(poisoned)?;
        newest_first(&mut skills, |skill| (skill.created_at, skill.id));
        Ok(skills)
    }
}

fn poisoned(error: PoisonedStore) -> SkillRepositoryError {
    SkillRepositoryError::query(error.to_string())
}

#[async_trait]
impl SkillRepository for InMemorySkillRepository {
    async fn insert(&self, skill: &Skill) -> Result<(), SkillRepositoryError> {
        self.skills
            .with(|skills| {
                skills.insert(skill.id, skill.clone());
            })
            .map_err(poisoned)
    }

    async fn find_by_id(&self, id: &SkillId) -> Result<Option<Skill>, SkillRepositoryError> {
        self.skills
            .with(|skills| skills.get(id).cloned())
            .map_err(poisoned)
    }

    async fn find_many(&self, ids: &[SkillId]) -> Result<Vec<Skill>, SkillRepositoryError> {
        self.skills
            .with(|skills| ids.iter().filter_map(|id| skills.get(id).cloned()).collect())
            .map_err(poisoned)
    }

    async fn find_duplicate(
        &self,
        owner: &UserId,
        name: &str,
        skill_type: SkillType,
    ) -> Result<Option<Skill>, SkillRepositoryError> {
        self.skills
            .with(|skills| {
                skills
                    .values()
                    .find(|skill| {
                        skill.is_owned_by(owner)
                            && skill.skill_type == skill_type
                            && skill.name.matches_ignoring_case(name)
                    })
                    .cloned()
            })
            .map_err(poisoned)
    }

    async fn update(&self, skill: &Skill) -> Result<(), SkillRepositoryError> {
        self.skills
            .with(|skills| {
                if let Some(stored) = skills.get_mut(&skill.id) {
                    *stored = skill.clone();
                }
            })
            .map_err(poisoned)
    }

    async fn delete(&self, id: &SkillId) -> Result<bool, SkillRepositoryError> {
        self.skills
            .with(|skills| skills.remove(id).is_some())
            .map_err(poisoned)
    }

    async fn search(
        &self,
        filter: &SkillFilter,
        page: PageParams,
    ) -> Result<Paginated<Skill>, SkillRepositoryError> {
        Ok(Paginated::from_all(self.matching(filter)?, page))
    }

    async fn list(&self, filter: &SkillFilter) -> Result<Vec<Skill>, SkillRepositoryError> {
        self.matching(filter)
    }

    async fn count(&self, filter: &SkillFilter) -> Result<u64, SkillRepositoryError> {
        let count = self
            .skills
            .with(|skills| skills.values().filter(|skill| filter.matches(skill)).count())
            .map_err(poisoned)?;
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_skill;

    #[tokio::test]
    async fn duplicates_match_name_ignoring_case_within_type() {
        let repo = InMemorySkillRepository::new();
        let owner = UserId::random();
        let guitar = sample_skill(&owner, "Guitar", SkillType::Offered);
        repo.insert(&guitar).await.expect("insert");

        let found = repo
            .find_duplicate(&owner, "gUiTaR", SkillType::Offered)
            .await
            .expect("lookup");
        assert_eq!(found.map(|skill| skill.id), Some(guitar.id));

        let other_type = repo
            .find_duplicate(&owner, "guitar", SkillType::Wanted)
            .await
            .expect("lookup");
        assert!(other_type.is_none());

        let other_owner = repo
            .find_duplicate(&UserId::random(), "guitar", SkillType::Offered)
            .await
            .expect("lookup");
        assert!(other_owner.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_the_skill_existed() {
        let repo = InMemorySkillRepository::new();
        let skill = sample_skill(&UserId::random(), "Baking", SkillType::Wanted);
        repo.insert(&skill).await.expect("insert");
        assert!(repo.delete(&skill.id).await.expect("delete"));
        assert!(!repo.delete(&skill.id).await.expect("delete again"));
        assert!(repo.find_by_id(&skill.id).await.expect("find").is_none());
    }
}
