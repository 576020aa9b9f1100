//! Port for swap persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageParams, Paginated};
use tracing::warn;

use crate::domain::reports::DateRange;
use crate::domain::{
    Error, Swap, SwapId, SwapParty, SwapProposal, SwapRating, SwapStatus, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by swap repository adapters.
    pub enum SwapRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "swap repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "swap repository query failed: {message}",
    }
}

impl From<SwapRepositoryError> for Error {
    fn from(value: SwapRepositoryError) -> Self {
        match value {
            SwapRepositoryError::Connection { message } => {
                warn!(%message, "swap store unavailable");
                Error::service_unavailable("swap store unavailable")
            }
            SwapRepositoryError::Query { message } => {
                Error::internal(format!("swap store error: {message}"))
            }
        }
    }
}

/// Selection criteria for swap listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapFilter {
    /// Swaps in which this user is requester or recipient.
    pub participant: Option<UserId>,
    pub status: Option<SwapStatus>,
    /// Only completed swaps carrying both ratings.
    pub fully_rated: bool,
    pub created_between: Option<DateRange>,
}

impl SwapFilter {
    /// Completed, fully rated swaps of `user`; the input to rating
    /// recomputation.
    pub fn rated_history(user: UserId) -> Self {
        Self {
            participant: Some(user),
            status: Some(SwapStatus::Completed),
            fully_rated: true,
            created_between: None,
        }
    }

    /// Whether `swap` satisfies every criterion.
    pub fn matches(&self, swap: &Swap) -> bool {
        self.participant
            .is_none_or(|user| swap.is_participant(&user))
            && self.status.is_none_or(|status| swap.status() == status)
            && (!self.fully_rated || swap.is_fully_rated())
            && self
                .created_between
                .is_none_or(|range| range.contains(swap.created_at()))
    }
}

/// Port for reading and writing swaps.
///
/// Listings are ordered newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapRepository: Send + Sync {
    /// Store a new swap.
    async fn insert(&self, swap: &Swap) -> Result<(), SwapRepositoryError>;

    /// Find a swap by id.
    async fn find_by_id(&self, id: &SwapId) -> Result<Option<Swap>, SwapRepositoryError>;

    /// A pending swap with the same parties and skills, if one exists.
    async fn find_pending_duplicate(
        &self,
        proposal: &SwapProposal,
    ) -> Result<Option<Swap>, SwapRepositoryError>;

    /// Persist a status change only if the stored status still equals
    /// `expected`. Returns whether the write happened.
    async fn transition(
        &self,
        swap: &Swap,
        expected: SwapStatus,
    ) -> Result<bool, SwapRepositoryError>;

    /// Write `party`'s rating slot of a completed swap without touching the
    /// other slot. Returns the swap as stored after the write, or `None` when
    /// no completed swap has this id.
    async fn save_rating(
        &self,
        swap_id: &SwapId,
        party: SwapParty,
        rating: &SwapRating,
        at: DateTime<Utc>,
    ) -> Result<Option<Swap>, SwapRepositoryError>;

    /// One page of matching swaps.
    async fn search(
        &self,
        filter: &SwapFilter,
        page: PageParams,
    ) -> Result<Paginated<Swap>, SwapRepositoryError>;

    /// Every matching swap.
    async fn list(&self, filter: &SwapFilter) -> Result<Vec<Swap>, SwapRepositoryError>;

    /// Number of matching swaps.
    async fn count(&self, filter: &SwapFilter) -> Result<u64, SwapRepositoryError>;
}
