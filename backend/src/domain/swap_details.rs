//! Resolves the parties and skills referenced by swaps.

use std::collections::HashMap;
use std::sync::Arc;

use pagination::Paginated;

use crate::domain::ports::{
    PartySummary, SkillRepository, SkillSummary, SwapDetails, UserRepository,
};
use crate::domain::{Error, SkillId, Swap, UserId};

/// Batch loader turning swaps into [`SwapDetails`].
///
/// Missing users or skills render as `None` rather than failing the read.
#[derive(Clone)]
pub struct SwapDetailsLoader {
    users: Arc<dyn UserRepository>,
    skills: Arc<dyn SkillRepository>,
}

impl SwapDetailsLoader {
    pub fn new(users: Arc<dyn UserRepository>, skills: Arc<dyn SkillRepository>) -> Self {
        Self { users, skills }
    }

    /// Resolve a batch of swaps with one lookup per repository.
    pub async fn load(&self, swaps: Vec<Swap>) -> Result<Vec<SwapDetails>, Error> {
        if swaps.is_empty() {
            return Ok(Vec::new());
        }
        let mut user_ids: Vec<UserId> = Vec::with_capacity(swaps.len() * 2);
        let mut skill_ids: Vec<SkillId> = Vec::with_capacity(swaps.len() * 2);
        for swap in &swaps {
            user_ids.extend([*swap.requester(), *swap.recipient()]);
            skill_ids.extend([*swap.requested_skill(), *swap.offered_skill()]);
        }
        user_ids.sort_unstable();
        user_ids.dedup();
        skill_ids.sort_unstable();
        skill_ids.dedup();

        let users: HashMap<UserId, PartySummary> = self
            .users
            .find_many(&user_ids)
            .await?
            .iter()
            .map(|user| (user.id, PartySummary::from(user)))
            .collect();
        let skills: HashMap<SkillId, SkillSummary> = self
            .skills
            .find_many(&skill_ids)
            .await?
            .iter()
            .map(|skill| (skill.id, SkillSummary::from(skill)))
            .collect();

        Ok(swaps
            .into_iter()
            .map(|swap| SwapDetails {
                requester: users.get(swap.requester()).cloned(),
                recipient: users.get(swap.recipient()).cloned(),
                requested_skill: skills.get(swap.requested_skill()).cloned(),
                offered_skill: skills.get(swap.offered_skill()).cloned(),
                swap,
            })
            .collect())
    }

    pub async fn load_one(&self, swap: Swap) -> Result<SwapDetails, Error> {
        self.load(vec![swap])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("swap details went missing during assembly"))
    }

    /// Resolve every swap on a page, keeping the page metadata.
    pub async fn load_page(&self, page: Paginated<Swap>) -> Result<Paginated<SwapDetails>, Error> {
        let Paginated {
            items,
            total,
            current_page,
            total_pages,
        } = page;
        Ok(Paginated {
            items: self.load(items).await?,
            total,
            current_page,
            total_pages,
        })
    }
}
