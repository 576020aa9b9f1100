//! Tests for the swap handlers.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use pagination::Paginated;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::{Swap, SwapProposal};
use crate::domain::ports::SwapDetails;
use crate::inbound::http::test_utils::{TestPorts, api_app, login, member, send};
use crate::test_support::fixed_now;

fn pending_swap(requester: UserId, recipient: UserId) -> SwapDetails {
    let proposal = SwapProposal::new(
        requester,
        recipient,
        SkillId::random(),
        SkillId::random(),
        Some("Weekends suit me".to_owned()),
        None,
    )
    .expect("valid proposal");
    SwapDetails {
        swap: Swap::propose(SwapId::random(), proposal, fixed_now()),
        requester: None,
        recipient: None,
        requested_skill: None,
        offered_skill: None,
    }
}

fn field_of(body: &Value) -> Option<&str> {
    body.pointer("/details/field").and_then(Value::as_str)
}

#[actix_web::test]
async fn create_returns_the_new_swap() {
    let actor = member();
    let recipient = UserId::random();
    let requested = SkillId::random();
    let offered = SkillId::random();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .swaps
        .expect_create()
        .withf(move |who, request| {
            who.user_id() == actor.user_id()
                && request.recipient_id == recipient
                && request.requested_skill_id == requested
                && request.offered_skill_id == offered
                && request.scheduled_date.is_some()
        })
        .times(1)
        .return_once(move |who, _| Ok(pending_swap(*who.user_id(), recipient)));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/swaps")
            .cookie(cookie)
            .set_json(json!({
                "recipientId": recipient.to_string(),
                "requestedSkillId": requested.to_string(),
                "offeredSkillId": offered.to_string(),
                "message": "Weekends suit me",
                "scheduledDate": "2025-04-01T10:00:00Z",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["recipientId"], recipient.to_string());
    assert_eq!(body["rating"]["fromRequester"], Value::Null);
}

#[rstest]
#[case::missing_recipient(json!({"requestedSkillId": SkillId::random().to_string(), "offeredSkillId": SkillId::random().to_string()}), "recipientId")]
#[case::bad_skill_id(json!({"recipientId": UserId::random().to_string(), "requestedSkillId": "nope", "offeredSkillId": SkillId::random().to_string()}), "requestedSkillId")]
#[case::bad_date(json!({"recipientId": UserId::random().to_string(), "requestedSkillId": SkillId::random().to_string(), "offeredSkillId": SkillId::random().to_string(), "scheduledDate": "next week"}), "scheduledDate")]
#[actix_web::test]
async fn create_rejects_malformed_bodies(#[case] payload: Value, #[case] field: &str) {
    let actor = member();
    let app = test::init_service(api_app(TestPorts::acting_as(actor).into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/swaps")
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(field_of(&body), Some(field));
}

#[actix_web::test]
async fn create_requires_a_session() {
    let app = test::init_service(api_app(TestPorts::default().into_state())).await;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/swaps")
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn my_swaps_passes_status_and_paging() {
    let actor = member();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .swaps_query
        .expect_list_mine()
        .withf(|_, status, page| {
            *status == Some(SwapStatus::Pending) && page.page() == 2 && page.limit() == 5
        })
        .times(1)
        .return_once(move |who, _, page| {
            let items = vec![pending_swap(*who.user_id(), UserId::random())];
            Ok(Paginated::new(items, 6, page))
        });
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/swaps/my-swaps?status=pending&page=2&limit=5")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 6);
    assert_eq!(body["currentPage"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn my_swaps_rejects_unknown_status() {
    let actor = member();
    let app = test::init_service(api_app(TestPorts::acting_as(actor).into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/swaps/my-swaps?status=archived")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_of(&body), Some("status"));
}

#[actix_web::test]
async fn get_maps_domain_errors() {
    let actor = member();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .swaps_query
        .expect_get()
        .times(1)
        .return_once(|_, _| Err(Error::forbidden("not a party to this swap")));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/swaps/{}", SwapId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[case::accept("accept", SwapAction::Accept)]
#[case::reject("reject", SwapAction::Reject)]
#[case::cancel("cancel", SwapAction::Cancel)]
#[case::complete("complete", SwapAction::Complete)]
#[actix_web::test]
async fn status_routes_apply_their_action(#[case] segment: &str, #[case] action: SwapAction) {
    let actor = member();
    let details = pending_swap(UserId::random(), *actor.user_id());
    let swap_id = *details.swap.id();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .swaps
        .expect_apply()
        .withf(move |_, id, applied| *id == swap_id && *applied == action)
        .times(1)
        .return_once(move |_, _, _| Ok(details));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/swaps/{swap_id}/{segment}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], swap_id.to_string());
}

#[actix_web::test]
async fn invalid_transitions_are_bad_requests() {
    let actor = member();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .swaps
        .expect_apply()
        .times(1)
        .return_once(|_, _, _| Err(Error::invalid_state("swap is completed, not pending")));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/swaps/{}/accept", SwapId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_state");
}

#[rstest]
#[case::number(json!(5))]
#[case::decimal_string(json!("5"))]
#[actix_web::test]
async fn rate_forwards_score_and_comment(#[case] score: Value) {
    let actor = member();
    let details = pending_swap(*actor.user_id(), UserId::random());
    let swap_id = *details.swap.id();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .swaps
        .expect_rate()
        .withf(move |_, id, rating| {
            *id == swap_id
                && rating.rating().value() == 5
                && rating.comment() == Some("Brilliant")
        })
        .times(1)
        .return_once(move |_, _, _| Ok(details));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, _) = send(
        &app,
        TestRequest::post()
            .uri(&format!("/api/v1/swaps/{swap_id}/rate"))
            .cookie(cookie)
            .set_json(json!({"rating": score, "comment": "Brilliant"}))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[case::too_high(json!({"rating": 6}), "rating")]
#[case::fractional(json!({"rating": 4.5}), "rating")]
#[case::text(json!({"rating": "five"}), "rating")]
#[case::string_too_high(json!({"rating": "6"}), "rating")]
#[case::fractional_string(json!({"rating": "4.5"}), "rating")]
#[case::missing(json!({"comment": "great"}), "rating")]
#[case::long_comment(json!({"rating": 4, "comment": "x".repeat(501)}), "comment")]
#[actix_web::test]
async fn rate_rejects_invalid_ratings(#[case] payload: Value, #[case] field: &str) {
    let actor = member();
    let app = test::init_service(api_app(TestPorts::acting_as(actor).into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri(&format!("/api/v1/swaps/{}/rate", SwapId::random()))
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(field_of(&body), Some(field));
}
