//! Lifecycle coverage for swaps.

use super::*;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

struct Parties {
    requester: UserId,
    recipient: UserId,
    outsider: UserId,
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 4, 18, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn parties() -> Parties {
    Parties {
        requester: UserId::random(),
        recipient: UserId::random(),
        outsider: UserId::random(),
    }
}

fn pending_swap(parties: &Parties, now: DateTime<Utc>) -> Swap {
    let proposal = SwapProposal::new(
        parties.requester,
        parties.recipient,
        SkillId::random(),
        SkillId::random(),
        Some("Piano for guitar?".to_owned()),
        None,
    )
    .expect("valid proposal");
    Swap::propose(SwapId::random(), proposal, now)
}

fn swap_in(status: SwapStatus, parties: &Parties, now: DateTime<Utc>) -> Swap {
    let mut swap = pending_swap(parties, now);
    match status {
        SwapStatus::Pending => {}
        SwapStatus::Accepted => {
            swap.apply(&parties.recipient, SwapAction::Accept, now)
                .expect("accept");
        }
        SwapStatus::Rejected => {
            swap.apply(&parties.recipient, SwapAction::Reject, now)
                .expect("reject");
        }
        SwapStatus::Cancelled => {
            swap.apply(&parties.requester, SwapAction::Cancel, now)
                .expect("cancel");
        }
        SwapStatus::Completed => {
            swap.apply(&parties.recipient, SwapAction::Accept, now)
                .expect("accept");
            swap.apply(&parties.requester, SwapAction::Complete, now)
                .expect("complete");
        }
    }
    swap
}

fn rating(score: i64, comment: &str) -> SwapRating {
    SwapRating::new(Rating::new(score).expect("valid score"), Some(comment.to_owned()))
        .expect("valid rating")
}

#[rstest]
fn proposal_rejects_self_swap(parties: Parties) {
    let result = SwapProposal::new(
        parties.requester,
        parties.requester,
        SkillId::random(),
        SkillId::random(),
        None,
        None,
    );
    assert_eq!(result, Err(SwapValidationError::SelfSwap));
}

#[rstest]
fn proposal_limits_message_length(parties: Parties) {
    let result = SwapProposal::new(
        parties.requester,
        parties.recipient,
        SkillId::random(),
        SkillId::random(),
        Some("m".repeat(SWAP_MESSAGE_MAX + 1)),
        None,
    );
    assert_eq!(
        result,
        Err(SwapValidationError::MessageTooLong {
            max: SWAP_MESSAGE_MAX
        })
    );
}

#[rstest]
fn new_swaps_start_pending(parties: Parties, now: DateTime<Utc>) {
    let swap = pending_swap(&parties, now);
    assert_eq!(swap.status(), SwapStatus::Pending);
    assert!(swap.completed_at().is_none());
    assert!(!swap.is_fully_rated());
}

#[rstest]
fn status_edges_match_lifecycle() {
    for from in SwapStatus::ALL {
        for to in SwapStatus::ALL {
            let expected = matches!(
                (from, to),
                (SwapStatus::Pending, SwapStatus::Accepted)
                    | (SwapStatus::Pending, SwapStatus::Rejected)
                    | (SwapStatus::Pending, SwapStatus::Cancelled)
                    | (SwapStatus::Accepted, SwapStatus::Completed)
            );
            assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
        }
    }
}

#[rstest]
fn completed_is_only_reachable_through_accepted(parties: Parties, now: DateTime<Utc>) {
    let mut swap = pending_swap(&parties, now);
    let result = swap.apply(&parties.requester, SwapAction::Complete, now);
    assert!(matches!(
        result,
        Err(SwapTransitionError::InvalidState {
            current: SwapStatus::Pending,
            ..
        })
    ));
    assert_eq!(swap.status(), SwapStatus::Pending);
}

#[rstest]
#[case(SwapAction::Accept, SwapParty::Recipient, SwapStatus::Accepted)]
#[case(SwapAction::Reject, SwapParty::Recipient, SwapStatus::Rejected)]
#[case(SwapAction::Cancel, SwapParty::Requester, SwapStatus::Cancelled)]
fn pending_transitions_by_allowed_party(
    parties: Parties,
    now: DateTime<Utc>,
    #[case] action: SwapAction,
    #[case] party: SwapParty,
    #[case] expected: SwapStatus,
) {
    let mut swap = pending_swap(&parties, now);
    let actor = *swap.user_for(party);
    let change = swap.apply(&actor, action, now).expect("allowed transition");
    assert_eq!(change.from, SwapStatus::Pending);
    assert_eq!(change.to, expected);
    assert_eq!(swap.status(), expected);
}

#[rstest]
#[case(SwapAction::Accept, SwapParty::Requester)]
#[case(SwapAction::Reject, SwapParty::Requester)]
#[case(SwapAction::Cancel, SwapParty::Recipient)]
fn wrong_party_is_refused_without_change(
    parties: Parties,
    now: DateTime<Utc>,
    #[case] action: SwapAction,
    #[case] party: SwapParty,
) {
    let mut swap = pending_swap(&parties, now);
    let before = swap.clone();
    let actor = *swap.user_for(party);
    let result = swap.apply(&actor, action, now);
    assert_eq!(result, Err(SwapTransitionError::WrongParty { party, action }));
    assert_eq!(swap, before);
}

#[rstest]
#[case(SwapAction::Accept)]
#[case(SwapAction::Complete)]
fn outsiders_are_refused(parties: Parties, now: DateTime<Utc>, #[case] action: SwapAction) {
    let mut swap = swap_in(SwapStatus::Accepted, &parties, now);
    let result = swap.apply(&parties.outsider, action, now);
    assert_eq!(result, Err(SwapTransitionError::NotParticipant));
    assert_eq!(swap.status(), SwapStatus::Accepted);
}

#[rstest]
fn second_accept_reports_current_status(parties: Parties, now: DateTime<Utc>) {
    let mut swap = swap_in(SwapStatus::Accepted, &parties, now);
    let result = swap.apply(&parties.recipient, SwapAction::Accept, now);
    assert_eq!(
        result,
        Err(SwapTransitionError::InvalidState {
            current: SwapStatus::Accepted,
            required: SwapStatus::Pending,
            action: SwapAction::Accept,
        })
    );
    assert_eq!(swap.status(), SwapStatus::Accepted);
}

#[rstest]
#[case(SwapParty::Requester)]
#[case(SwapParty::Recipient)]
fn either_party_completes(parties: Parties, now: DateTime<Utc>, #[case] party: SwapParty) {
    let mut swap = swap_in(SwapStatus::Accepted, &parties, now);
    let later = now + Duration::days(2);
    let actor = *swap.user_for(party);
    swap.apply(&actor, SwapAction::Complete, later)
        .expect("complete");
    assert_eq!(swap.status(), SwapStatus::Completed);
    assert_eq!(swap.completed_at(), Some(later));
}

#[rstest]
#[case(SwapStatus::Rejected)]
#[case(SwapStatus::Cancelled)]
#[case(SwapStatus::Completed)]
fn terminal_states_accept_no_actions(
    parties: Parties,
    now: DateTime<Utc>,
    #[case] status: SwapStatus,
) {
    let mut swap = swap_in(status, &parties, now);
    assert!(status.is_terminal());
    for action in [
        SwapAction::Accept,
        SwapAction::Reject,
        SwapAction::Cancel,
        SwapAction::Complete,
    ] {
        for actor in [parties.requester, parties.recipient] {
            assert!(swap.apply(&actor, action, now).is_err());
        }
    }
    assert_eq!(swap.status(), status);
}

#[rstest]
fn rating_requires_completion(parties: Parties, now: DateTime<Utc>) {
    let mut swap = swap_in(SwapStatus::Accepted, &parties, now);
    let result = swap.rate(&parties.requester, rating(5, "great"), now);
    assert_eq!(
        result,
        Err(SwapTransitionError::NotRateable {
            current: SwapStatus::Accepted
        })
    );
}

#[rstest]
fn rating_fills_the_actor_slot(parties: Parties, now: DateTime<Utc>) {
    let mut swap = swap_in(SwapStatus::Completed, &parties, now);
    let party = swap
        .rate(&parties.requester, rating(5, "great"), now)
        .expect("rate");
    assert_eq!(party, SwapParty::Requester);
    assert!(swap.rating_from(SwapParty::Requester).is_some());
    assert!(!swap.is_fully_rated());

    swap.rate(&parties.recipient, rating(4, "good"), now)
        .expect("rate");
    assert!(swap.is_fully_rated());
    assert_eq!(
        swap.rating_received_by(&parties.requester),
        Rating::new(4).ok()
    );
    assert_eq!(
        swap.rating_received_by(&parties.recipient),
        Rating::new(5).ok()
    );
}

#[rstest]
fn rating_twice_overwrites(parties: Parties, now: DateTime<Utc>) {
    let mut swap = swap_in(SwapStatus::Completed, &parties, now);
    swap.rate(&parties.recipient, rating(2, "meh"), now)
        .expect("rate");
    swap.rate(&parties.recipient, rating(3, "better"), now)
        .expect("rate");
    let stored = swap
        .rating_from(SwapParty::Recipient)
        .expect("slot filled");
    assert_eq!(stored.rating().value(), 3);
    assert_eq!(stored.comment(), Some("better"));
}

#[rstest]
fn outsiders_cannot_rate(parties: Parties, now: DateTime<Utc>) {
    let mut swap = swap_in(SwapStatus::Completed, &parties, now);
    let result = swap.rate(&parties.outsider, rating(1, "nope"), now);
    assert_eq!(result, Err(SwapTransitionError::NotParticipant));
}

#[rstest]
fn restore_rejects_ratings_on_pending(parties: Parties, now: DateTime<Utc>) {
    let record = SwapRecord {
        id: SwapId::random(),
        requester: parties.requester,
        recipient: parties.recipient,
        requested_skill: SkillId::random(),
        offered_skill: SkillId::random(),
        status: SwapStatus::Pending,
        message: None,
        scheduled_date: None,
        completed_at: None,
        from_requester: Some(rating(5, "early")),
        from_recipient: None,
        created_at: now,
        updated_at: now,
    };
    assert!(matches!(
        Swap::restore(record),
        Err(SwapValidationError::Inconsistent(_))
    ));
}

#[rstest]
fn status_parses_known_values() {
    assert_eq!("accepted".parse::<SwapStatus>(), Ok(SwapStatus::Accepted));
    assert!("archived".parse::<SwapStatus>().is_err());
}
