//! Driving port for swap mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Actor, Error, SkillId, SwapAction, SwapId, SwapRating, UserId};

use super::SwapDetails;

/// Request to open a swap on behalf of the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSwapRequest {
    pub recipient_id: UserId,
    pub requested_skill_id: SkillId,
    pub offered_skill_id: SkillId,
    pub message: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// Driving port for swap creation, status changes, and ratings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapCommand: Send + Sync {
    /// Open a pending swap with `actor` as requester.
    async fn create(&self, actor: &Actor, request: CreateSwapRequest)
    -> Result<SwapDetails, Error>;

    /// Accept, reject, cancel, or complete a swap.
    async fn apply(
        &self,
        actor: &Actor,
        swap_id: &SwapId,
        action: SwapAction,
    ) -> Result<SwapDetails, Error>;

    /// Rate the counterpart of a completed swap.
    async fn rate(
        &self,
        actor: &Actor,
        swap_id: &SwapId,
        rating: SwapRating,
    ) -> Result<SwapDetails, Error>;
}
