//! In-memory `SwapRepository`.
//!
//! `transition` compares and writes under one lock acquisition, matching the
//! conditional `UPDATE` of the PostgreSQL adapter. `save_rating` likewise
//! fills a single slot of the stored swap under the lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageParams, Paginated};

use crate::domain::ports::{SwapFilter, SwapRepository, SwapRepositoryError};
use crate::domain::{Swap, SwapId, SwapParty, SwapProposal, SwapRating, SwapStatus};

use super::{PoisonedStore, Store, newest_first};

#[derive(Debug, Default)]
pub struct InMemorySwapRepository {
    swaps: Store<SwapId, Swap>,
}

impl InMemorySwapRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, filter: &SwapFilter) -> Result<Vec<Swap>, SwapRepositoryError> {
        let mut swaps = self
            .swaps
            .collect(|swap| filter.matches(swap))
            .map_err(poisoned)?;
        newest_first(&mut swaps, |swap| (swap.created_at(), *swap.id()));
        Ok(swaps)
    }
}

fn poisoned(error: PoisonedStore) -> SwapRepositoryError {
    SwapRepositoryError::query(error.to_string())
}

#[async_trait]
impl SwapRepository for InMemorySwapRepository {
    async fn insert(&self, swap: &Swap) -> Result<(), SwapRepositoryError> {
        self.swaps
            .with(|swaps| {
                swaps.insert(*swap.id(), swap.clone());
            })
            .map_err(poisoned)
    }

    async fn find_by_id(&self, id: &SwapId) -> Result<Option<Swap>, SwapRepositoryError> {
        self.swaps
            .with(|swaps| swaps.get(id).cloned())
            .map_err(poisoned)
    }

    async fn find_pending_duplicate(
        &self,
        proposal: &SwapProposal,
    ) -> Result<Option<Swap>, SwapRepositoryError> {
        self.swaps
            .with(|swaps| {
                swaps
                    .values()
                    .find(|swap| {
                        swap.status() == SwapStatus::Pending
                            && swap.requester() == proposal.requester()
                            && swap.recipient() == proposal.recipient()
                            && swap.requested_skill() == proposal.requested_skill()
                            && swap.offered_skill() == proposal.offered_skill()
                    })
                    .cloned()
            })
            .map_err(poisoned)
    }

    async fn transition(
        &self,
        swap: &Swap,
        expected: SwapStatus,
    ) -> Result<bool, SwapRepositoryError> {
        self.swaps
            .with(|swaps| match swaps.get_mut(swap.id()) {
                Some(stored) if stored.status() == expected => {
                    *stored = swap.clone();
                    true
                }
                _ => false,
            })
            .map_err(poisoned)
    }

    async fn save_rating(
        &self,
        swap_id: &SwapId,
        party: SwapParty,
        rating: &SwapRating,
        at: DateTime<Utc>,
    ) -> Result<Option<Swap>, SwapRepositoryError> {
        self.swaps
            .with(|swaps| match swaps.get_mut(swap_id) {
                Some(stored) if stored.status() == SwapStatus::Completed => {
                    stored.record_rating(party, rating.clone(), at);
                    Some(stored.clone())
                }
                _ => None,
            })
            .map_err(poisoned)
    }

    async fn search(
        &self,
        filter: &SwapFilter,
        page: PageParams,
    ) -> Result<Paginated<Swap>, SwapRepositoryError> {
        Ok(Paginated::from_all(self.matching(filter)?, page))
    }

    async fn list(&self, filter: &SwapFilter) -> Result<Vec<Swap>, SwapRepositoryError> {
        self.matching(filter)
    }

    async fn count(&self, filter: &SwapFilter) -> Result<u64, SwapRepositoryError> {
        let count = self
            .swaps
            .with(|swaps| swaps.values().filter(|swap| filter.matches(swap)).count())
            .map_err(poisoned)?;
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
