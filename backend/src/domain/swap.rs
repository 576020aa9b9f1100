//! The swap lifecycle.
//!
//! A swap links a requester and a recipient through two skills and moves
//! along `pending → {accepted, rejected, cancelled}` and
//! `accepted → completed`. Every other state is terminal. Once completed,
//! each party may fill its rating slot.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rating::{Rating, SwapRating};
use super::{SkillId, SwapId, UserId};

/// Maximum length of the message attached to a swap request.
pub const SWAP_MESSAGE_MAX: usize = 1000;

/// Lifecycle status of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl SwapStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Accepted,
        Self::Rejected,
        Self::Cancelled,
        Self::Completed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Accepted | Self::Rejected | Self::Cancelled
            ) | (Self::Accepted, Self::Completed)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Completed)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = SwapValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| SwapValidationError::UnknownStatus(s.to_owned()))
    }
}

/// Which side of a swap a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapParty {
    Requester,
    Recipient,
}

impl SwapParty {
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Requester => Self::Recipient,
            Self::Recipient => Self::Requester,
        }
    }
}

impl fmt::Display for SwapParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requester => "requester",
            Self::Recipient => "recipient",
        })
    }
}

/// A status-changing command issued by one of the parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapAction {
    Accept,
    Reject,
    Cancel,
    Complete,
}

impl SwapAction {
    /// Status the swap must be in for the action to apply.
    pub const fn required_status(self) -> SwapStatus {
        match self {
            Self::Accept | Self::Reject | Self::Cancel => SwapStatus::Pending,
            Self::Complete => SwapStatus::Accepted,
        }
    }

    /// Status the swap moves to.
    pub const fn target_status(self) -> SwapStatus {
        match self {
            Self::Accept => SwapStatus::Accepted,
            Self::Reject => SwapStatus::Rejected,
            Self::Cancel => SwapStatus::Cancelled,
            Self::Complete => SwapStatus::Completed,
        }
    }

    /// Whether `party` may issue this action.
    pub const fn permits(self, party: SwapParty) -> bool {
        match self {
            Self::Accept | Self::Reject => matches!(party, SwapParty::Recipient),
            Self::Cancel => matches!(party, SwapParty::Requester),
            Self::Complete => true,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for SwapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors raised while building or restoring a swap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapValidationError {
    #[error("cannot request a swap with yourself")]
    SelfSwap,
    #[error("message must be at most {max} characters")]
    MessageTooLong { max: usize },
    #[error("status must be one of: pending, accepted, rejected, cancelled, completed")]
    UnknownStatus(String),
    #[error("stored swap is inconsistent: {0}")]
    Inconsistent(&'static str),
}

impl SwapValidationError {
    /// Name of the field that failed validation.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::SelfSwap => "recipientId",
            Self::MessageTooLong { .. } => "message",
            Self::UnknownStatus(_) => "status",
            Self::Inconsistent(_) => "swap",
        }
    }
}

/// Reasons a party's command is refused by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SwapTransitionError {
    #[error("not a party to this swap")]
    NotParticipant,
    #[error("the {party} may not {action} this swap")]
    WrongParty { party: SwapParty, action: SwapAction },
    #[error("swap is {current}; {action} requires {required}")]
    InvalidState {
        current: SwapStatus,
        required: SwapStatus,
        action: SwapAction,
    },
    #[error("swap is {current}; only completed swaps can be rated")]
    NotRateable { current: SwapStatus },
}

/// Validated input for a new swap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapProposal {
    requester: UserId,
    recipient: UserId,
    requested_skill: SkillId,
    offered_skill: SkillId,
    message: Option<String>,
    scheduled_date: Option<DateTime<Utc>>,
}

impl SwapProposal {
    pub fn new(
        requester: UserId,
        recipient: UserId,
        requested_skill: SkillId,
        offered_skill: SkillId,
        message: Option<String>,
        scheduled_date: Option<DateTime<Utc>>,
    ) -> Result<Self, SwapValidationError> {
        if requester == recipient {
            return Err(SwapValidationError::SelfSwap);
        }
        let message = message
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        if message
            .as_deref()
            .is_some_and(|text| text.chars().count() > SWAP_MESSAGE_MAX)
        {
            return Err(SwapValidationError::MessageTooLong {
                max: SWAP_MESSAGE_MAX,
            });
        }
        Ok(Self {
            requester,
            recipient,
            requested_skill,
            offered_skill,
            message,
            scheduled_date,
        })
    }

    pub const fn requester(&self) -> &UserId {
        &self.requester
    }

    pub const fn recipient(&self) -> &UserId {
        &self.recipient
    }

    pub const fn requested_skill(&self) -> &SkillId {
        &self.requested_skill
    }

    pub const fn offered_skill(&self) -> &SkillId {
        &self.offered_skill
    }
}

/// Flat persisted form of a swap, checked by [`Swap::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRecord {
    pub id: SwapId,
    pub requester: UserId,
    pub recipient: UserId,
    pub requested_skill: SkillId,
    pub offered_skill: SkillId,
    pub status: SwapStatus,
    pub message: Option<String>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub from_requester: Option<SwapRating>,
    pub from_recipient: Option<SwapRating>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Applied status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: SwapStatus,
    pub to: SwapStatus,
    pub by: SwapParty,
}

/// A skill exchange between two users.
///
/// ## Invariants
/// - requester and recipient differ.
/// - `completed_at` is set exactly when the status is completed.
/// - rating slots are only filled on completed swaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    id: SwapId,
    requester: UserId,
    recipient: UserId,
    requested_skill: SkillId,
    offered_skill: SkillId,
    status: SwapStatus,
    message: Option<String>,
    scheduled_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    from_requester: Option<SwapRating>,
    from_recipient: Option<SwapRating>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Swap {
    /// Open a new pending swap.
    pub fn propose(id: SwapId, proposal: SwapProposal, now: DateTime<Utc>) -> Self {
        let SwapProposal {
            requester,
            recipient,
            requested_skill,
            offered_skill,
            message,
            scheduled_date,
        } = proposal;
        Self {
            id,
            requester,
            recipient,
            requested_skill,
            offered_skill,
            status: SwapStatus::Pending,
            message,
            scheduled_date,
            completed_at: None,
            from_requester: None,
            from_recipient: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a swap from storage, checking its invariants.
    pub fn restore(record: SwapRecord) -> Result<Self, SwapValidationError> {
        let SwapRecord {
            id,
            requester,
            recipient,
            requested_skill,
            offered_skill,
            status,
            message,
            scheduled_date,
            completed_at,
            from_requester,
            from_recipient,
            created_at,
            updated_at,
        } = record;
        if requester == recipient {
            return Err(SwapValidationError::Inconsistent("requester equals recipient"));
        }
        let completed = status == SwapStatus::Completed;
        if completed != completed_at.is_some() {
            return Err(SwapValidationError::Inconsistent(
                "completion timestamp does not match status",
            ));
        }
        if !completed && (from_requester.is_some() || from_recipient.is_some()) {
            return Err(SwapValidationError::Inconsistent(
                "ratings present on an incomplete swap",
            ));
        }
        Ok(Self {
            id,
            requester,
            recipient,
            requested_skill,
            offered_skill,
            status,
            message,
            scheduled_date,
            completed_at,
            from_requester,
            from_recipient,
            created_at,
            updated_at,
        })
    }

    pub const fn id(&self) -> &SwapId {
        &self.id
    }

    pub const fn requester(&self) -> &UserId {
        &self.requester
    }

    pub const fn recipient(&self) -> &UserId {
        &self.recipient
    }

    pub const fn requested_skill(&self) -> &SkillId {
        &self.requested_skill
    }

    pub const fn offered_skill(&self) -> &SkillId {
        &self.offered_skill
    }

    pub const fn status(&self) -> SwapStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub const fn scheduled_date(&self) -> Option<DateTime<Utc>> {
        self.scheduled_date
    }

    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Which side `user` is on, if any.
    pub fn party_of(&self, user: &UserId) -> Option<SwapParty> {
        if &self.requester == user {
            Some(SwapParty::Requester)
        } else if &self.recipient == user {
            Some(SwapParty::Recipient)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.party_of(user).is_some()
    }

    /// The user on the given side.
    pub const fn user_for(&self, party: SwapParty) -> &UserId {
        match party {
            SwapParty::Requester => &self.requester,
            SwapParty::Recipient => &self.recipient,
        }
    }

    /// Apply `action` on behalf of `actor`.
    ///
    /// Authorization is checked before the status so that outsiders learn
    /// nothing about swaps they are not part of. On error the swap is left
    /// unchanged.
    pub fn apply(
        &mut self,
        actor: &UserId,
        action: SwapAction,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, SwapTransitionError> {
        let party = self
            .party_of(actor)
            .ok_or(SwapTransitionError::NotParticipant)?;
        if !action.permits(party) {
            return Err(SwapTransitionError::WrongParty { party, action });
        }
        let target = action.target_status();
        if self.status != action.required_status() || !self.status.can_transition_to(target) {
            return Err(SwapTransitionError::InvalidState {
                current: self.status,
                required: action.required_status(),
                action,
            });
        }
        let change = StatusChange {
            from: self.status,
            to: target,
            by: party,
        };
        self.status = target;
        if target == SwapStatus::Completed {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(change)
    }

    /// Store `actor`'s rating of their counterpart, overwriting any previous
    /// rating from the same side.
    pub fn rate(
        &mut self,
        actor: &UserId,
        rating: SwapRating,
        now: DateTime<Utc>,
    ) -> Result<SwapParty, SwapTransitionError> {
        let party = self
            .party_of(actor)
            .ok_or(SwapTransitionError::NotParticipant)?;
        if self.status != SwapStatus::Completed {
            return Err(SwapTransitionError::NotRateable {
                current: self.status,
            });
        }
        self.record_rating(party, rating, now);
        Ok(party)
    }

    /// Fill one side's rating slot, replacing any earlier rating from that
    /// side. The other slot is left as it is.
    pub fn record_rating(&mut self, party: SwapParty, rating: SwapRating, now: DateTime<Utc>) {
        match party {
            SwapParty::Requester => self.from_requester = Some(rating),
            SwapParty::Recipient => self.from_recipient = Some(rating),
        }
        self.updated_at = now;
    }

    /// Rating left by the given side.
    pub const fn rating_from(&self, party: SwapParty) -> Option<&SwapRating> {
        match party {
            SwapParty::Requester => self.from_requester.as_ref(),
            SwapParty::Recipient => self.from_recipient.as_ref(),
        }
    }

    pub const fn is_fully_rated(&self) -> bool {
        self.from_requester.is_some() && self.from_recipient.is_some()
    }

    /// The score `user` received from their counterpart.
    pub fn rating_received_by(&self, user: &UserId) -> Option<Rating> {
        let party = self.party_of(user)?;
        self.rating_from(party.counterpart())
            .map(SwapRating::rating)
    }
}

#[cfg(test)]
mod tests;
