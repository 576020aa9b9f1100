//! Driving port for browsing the skill catalogue.

use async_trait::async_trait;
use pagination::{PageParams, Paginated};

use crate::domain::{
    Actor, DisplayName, Error, RatingAggregate, Skill, SkillLevel, SkillType, User, UserId,
};

/// Public fields of a skill's owner.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerSummary {
    pub id: UserId,
    pub name: DisplayName,
    pub location: Option<String>,
    pub rating: RatingAggregate,
}

impl From<&User> for OwnerSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            location: user.location.clone(),
            rating: user.rating,
        }
    }
}

/// A skill together with its owner, if the owner still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillListing {
    pub skill: Skill,
    pub owner: Option<OwnerSummary>,
}

/// The actor's skills split by type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedSkills {
    pub offered: Vec<Skill>,
    pub wanted: Vec<Skill>,
}

/// Search criteria for visible skills.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSearch {
    /// Matches name or description.
    pub text: Option<String>,
    pub skill_type: Option<SkillType>,
    pub category: Option<String>,
    pub level: Option<SkillLevel>,
}

/// Driving port for catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillQuery: Send + Sync {
    /// The actor's visible skills, newest first.
    async fn my_skills(&self, actor: &Actor) -> Result<OwnedSkills, Error>;

    /// Visible skills matching `search`, newest first.
    async fn search(
        &self,
        search: SkillSearch,
        page: PageParams,
    ) -> Result<Paginated<SkillListing>, Error>;
}
