//! Swap workflow service.
//!
//! Implements the swap driving ports: creating requests, applying status
//! changes with a compare-and-set write, recording ratings, and recomputing
//! both parties' rating aggregates once a swap is fully rated.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageParams, Paginated};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CreateSwapRequest, SkillRepository, SwapCommand, SwapDetails, SwapEvent, SwapFilter,
    SwapNotification, SwapNotifier, SwapQuery, SwapRepository, UserRepository,
};
use crate::domain::rating::aggregate_received;
use crate::domain::swap_details::SwapDetailsLoader;
use crate::domain::{
    Actor, Error, Swap, SwapAction, SwapId, SwapParty, SwapProposal, SwapRating, SwapStatus,
    SwapTransitionError, TraceId, UserId,
};

/// Map a refused lifecycle command onto the domain error taxonomy.
pub(crate) fn map_transition_error(error: SwapTransitionError) -> Error {
    match error {
        SwapTransitionError::NotParticipant => {
            Error::forbidden("not authorized to access this swap")
        }
        SwapTransitionError::WrongParty { party, action } => Error::forbidden(format!(
            "the {party} is not allowed to {action} this swap"
        )),
        SwapTransitionError::InvalidState {
            current, required, ..
        } => Error::invalid_state(format!("swap is not in {required} status"))
            .with_details(json!({ "currentStatus": current.as_str() })),
        SwapTransitionError::NotRateable { current } => {
            Error::invalid_state("only completed swaps can be rated")
                .with_details(json!({ "currentStatus": current.as_str() }))
        }
    }
}

/// Who hears about a status change, and as what event.
pub(crate) fn notification_for(
    swap: &Swap,
    action: SwapAction,
    by: SwapParty,
) -> SwapNotification {
    let event = match action {
        SwapAction::Accept => SwapEvent::Accepted,
        SwapAction::Reject => SwapEvent::Rejected,
        SwapAction::Cancel => SwapEvent::Cancelled,
        SwapAction::Complete => SwapEvent::Completed,
    };
    SwapNotification {
        swap_id: *swap.id(),
        recipient: *swap.user_for(by.counterpart()),
        actor: *swap.user_for(by),
        event,
    }
}

fn swap_not_found(swap_id: &SwapId) -> Error {
    Error::not_found(format!("swap {swap_id} not found"))
}

/// Swap service implementing [`SwapCommand`] and [`SwapQuery`].
#[derive(Clone)]
pub struct SwapService {
    users: Arc<dyn UserRepository>,
    skills: Arc<dyn SkillRepository>,
    swaps: Arc<dyn SwapRepository>,
    notifier: Arc<dyn SwapNotifier>,
    clock: Arc<dyn Clock>,
    details: SwapDetailsLoader,
}

impl SwapService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        skills: Arc<dyn SkillRepository>,
        swaps: Arc<dyn SwapRepository>,
        notifier: Arc<dyn SwapNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let details = SwapDetailsLoader::new(Arc::clone(&users), Arc::clone(&skills));
        Self {
            users,
            skills,
            swaps,
            notifier,
            clock,
            details,
        }
    }

    async fn find_swap(&self, swap_id: &SwapId) -> Result<Swap, Error> {
        self.swaps
            .find_by_id(swap_id)
            .await?
            .ok_or_else(|| swap_not_found(swap_id))
    }

    /// Deliver a notification in the background; failures are only logged.
    fn dispatch(&self, notification: SwapNotification) {
        let notifier = Arc::clone(&self.notifier);
        let delivery = async move {
            if let Err(error) = notifier.notify(&notification).await {
                warn!(
                    swap_id = %notification.swap_id,
                    recipient = %notification.recipient,
                    event = notification.event.as_str(),
                    %error,
                    "swap notification failed"
                );
            }
        };
        match TraceId::current() {
            Some(trace_id) => {
                tokio::spawn(TraceId::scope(trace_id, delivery));
            }
            None => {
                tokio::spawn(delivery);
            }
        }
    }

    async fn validate_proposal(
        &self,
        actor: &Actor,
        request: CreateSwapRequest,
    ) -> Result<SwapProposal, Error> {
        let CreateSwapRequest {
            recipient_id,
            requested_skill_id,
            offered_skill_id,
            message,
            scheduled_date,
        } = request;
        let proposal = SwapProposal::new(
            *actor.user_id(),
            recipient_id,
            requested_skill_id,
            offered_skill_id,
            message,
            scheduled_date,
        )
        .map_err(|err| Error::invalid_field(err.field(), err))?;

        let recipient = self.users.find_by_id(&recipient_id).await?;
        if recipient.is_none_or(|user| user.is_banned) {
            return Err(Error::not_found("recipient not found"));
        }

        let requested = self
            .skills
            .find_by_id(&requested_skill_id)
            .await?
            .ok_or_else(|| Error::not_found("requested skill not found"))?;
        let offered = self
            .skills
            .find_by_id(&offered_skill_id)
            .await?
            .ok_or_else(|| Error::not_found("offered skill not found"))?;

        if !requested.is_owned_by(&recipient_id) {
            return Err(Error::invalid_field(
                "requestedSkillId",
                "requested skill does not belong to the recipient",
            ));
        }
        if !offered.is_owned_by(actor.user_id()) {
            return Err(Error::invalid_field(
                "offeredSkillId",
                "offered skill does not belong to you",
            ));
        }

        if self.swaps.find_pending_duplicate(&proposal).await?.is_some() {
            return Err(Error::conflict(
                "a pending swap request for these skills already exists",
            ));
        }
        Ok(proposal)
    }

    /// Rebuild the rating aggregate of both parties from their history.
    async fn recompute_ratings(&self, swap: &Swap) -> Result<(), Error> {
        for user in [*swap.requester(), *swap.recipient()] {
            self.recompute_rating_for(user).await?;
        }
        Ok(())
    }

    async fn recompute_rating_for(&self, user: UserId) -> Result<(), Error> {
        let history = self.swaps.list(&SwapFilter::rated_history(user)).await?;
        let Some(aggregate) = aggregate_received(&user, &history) else {
            return Ok(());
        };
        self.users.update_rating(&user, aggregate).await?;
        debug!(
            user_id = %user,
            average = aggregate.average(),
            count = aggregate.count(),
            "rating aggregate recomputed"
        );
        Ok(())
    }
}

#[async_trait]
impl SwapCommand for SwapService {
    async fn create(
        &self,
        actor: &Actor,
        request: CreateSwapRequest,
    ) -> Result<SwapDetails, Error> {
        let proposal = self.validate_proposal(actor, request).await?;
        let swap = Swap::propose(SwapId::random(), proposal, self.clock.utc());
        self.swaps.insert(&swap).await?;

        info!(
            swap_id = %swap.id(),
            requester = %swap.requester(),
            recipient = %swap.recipient(),
            "swap requested"
        );
        self.dispatch(SwapNotification {
            swap_id: *swap.id(),
            recipient: *swap.recipient(),
            actor: *swap.requester(),
            event: SwapEvent::Requested,
        });
        self.details.load_one(swap).await
    }

    async fn apply(
        &self,
        actor: &Actor,
        swap_id: &SwapId,
        action: SwapAction,
    ) -> Result<SwapDetails, Error> {
        let mut swap = self.find_swap(swap_id).await?;
        let change = swap
            .apply(actor.user_id(), action, self.clock.utc())
            .map_err(map_transition_error)?;

        if !self.swaps.transition(&swap, change.from).await? {
            let current = self
                .swaps
                .find_by_id(swap_id)
                .await?
                .map_or(change.from, |fresh| fresh.status());
            warn!(
                swap_id = %swap_id,
                expected = %change.from,
                current = %current,
                "swap status changed concurrently"
            );
            return Err(map_transition_error(SwapTransitionError::InvalidState {
                current,
                required: action.required_status(),
                action,
            }));
        }

        info!(
            swap_id = %swap_id,
            from = %change.from,
            to = %change.to,
            actor = %actor.user_id(),
            "swap status changed"
        );
        self.dispatch(notification_for(&swap, action, change.by));
        self.details.load_one(swap).await
    }

    async fn rate(
        &self,
        actor: &Actor,
        swap_id: &SwapId,
        rating: SwapRating,
    ) -> Result<SwapDetails, Error> {
        let mut swap = self.find_swap(swap_id).await?;
        let now = self.clock.utc();
        let party = swap
            .rate(actor.user_id(), rating.clone(), now)
            .map_err(map_transition_error)?;
        // The stored copy decides whether both sides have rated; the one read
        // above may predate the other party's rating.
        let stored = self
            .swaps
            .save_rating(swap_id, party, &rating, now)
            .await?
            .ok_or_else(|| swap_not_found(swap_id))?;
        info!(swap_id = %swap_id, %party, "swap rated");

        if stored.is_fully_rated() {
            self.recompute_ratings(&stored).await?;
        }
        self.details.load_one(stored).await
    }
}

#[async_trait]
impl SwapQuery for SwapService {
    async fn get(&self, actor: &Actor, swap_id: &SwapId) -> Result<SwapDetails, Error> {
        let swap = self.find_swap(swap_id).await?;
        if !swap.is_participant(actor.user_id()) {
            return Err(map_transition_error(SwapTransitionError::NotParticipant));
        }
        self.details.load_one(swap).await
    }

    async fn list_mine(
        &self,
        actor: &Actor,
        status: Option<SwapStatus>,
        page: PageParams,
    ) -> Result<Paginated<SwapDetails>, Error> {
        let filter = SwapFilter {
            participant: Some(*actor.user_id()),
            status,
            ..SwapFilter::default()
        };
        let swaps = self.swaps.search(&filter, page).await?;
        self.details.load_page(swaps).await
    }
}

#[cfg(test)]
#[path = "swap_service_tests.rs"]
mod tests;
