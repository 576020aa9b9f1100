//! Tests for the admin handlers.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::{TimeZone, Utc};
use pagination::Paginated;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::RatingAggregate;
use crate::inbound::http::test_utils::{TestPorts, admin, api_app, login, member, send};
use crate::test_support::{fixed_now, sample_user};

#[actix_web::test]
async fn stats_are_grouped_by_aggregate() {
    let actor = admin();
    let mut ports = TestPorts::acting_as(actor);
    ports.admin.expect_stats().times(1).return_once(|_| {
        Ok(PlatformStats {
            users_total: 10,
            users_active: 4,
            users_banned: 1,
            skills_total: 20,
            skills_pending: 3,
            swaps_total: 7,
            swaps_completed: 2,
            swaps_pending: 5,
        })
    });
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get().uri("/api/v1/admin/stats").cookie(cookie).to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "users": {"total": 10, "active": 4, "banned": 1},
            "skills": {"total": 20, "pending": 3},
            "swaps": {"total": 7, "completed": 2, "pending": 5},
        })
    );
}

#[actix_web::test]
async fn members_are_forbidden() {
    let actor = member();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .admin
        .expect_stats()
        .return_once(|_| Err(Error::forbidden("admin access required")));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get().uri("/api/v1/admin/stats").cookie(cookie).to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[case::banned("banned", Some(true))]
#[case::active("active", Some(false))]
#[case::blank("", None)]
fn user_status_filter(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(banned_filter(Some(raw)).expect("known status"), expected);
}

#[rstest]
fn unknown_user_status_is_rejected() {
    let err = banned_filter(Some("sleeping")).expect_err("unknown status");
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(Value::as_str),
        Some("status")
    );
}

#[actix_web::test]
async fn user_list_shows_private_fields() {
    let actor = admin();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .admin
        .expect_users()
        .withf(|_, criteria, _| {
            criteria.banned == Some(true) && criteria.search.as_deref() == Some("ada")
        })
        .times(1)
        .return_once(|_, _, page| {
            let mut user = sample_user("Ada Lovelace");
            user.is_banned = true;
            user.ban_reason = Some("spam".to_owned());
            Ok(Paginated::new(vec![user], 1, page))
        });
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/admin/users?status=banned&search=ada")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["email"], "ada.lovelace@example.com");
    assert_eq!(body["items"][0]["isBanned"], true);
    assert_eq!(body["items"][0]["banReason"], "spam");
}

#[actix_web::test]
async fn ban_forwards_flag_and_reason() {
    let actor = admin();
    let target = sample_user("Mallory");
    let target_id = target.id;
    let mut ports = TestPorts::acting_as(actor);
    ports
        .admin
        .expect_set_ban()
        .withf(move |_, id, request| {
            *id == target_id && request.banned() && request.reason() == Some("abuse")
        })
        .times(1)
        .return_once(move |_, _, request| {
            let mut user = target;
            let (banned, reason) = request.into_parts();
            user.is_banned = banned;
            user.ban_reason = reason;
            Ok(user)
        });
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/admin/users/{target_id}/ban"))
            .cookie(cookie)
            .set_json(json!({"isBanned": true, "reason": " abuse "}))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isBanned"], true);
}

#[rstest]
#[case::missing_flag(json!({"reason": "abuse"}), "isBanned")]
#[case::long_reason(json!({"isBanned": true, "reason": "r".repeat(201)}), "reason")]
#[actix_web::test]
async fn ban_rejects_invalid_bodies(#[case] payload: Value, #[case] field: &str) {
    let actor = admin();
    let app = test::init_service(api_app(TestPorts::acting_as(actor).into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/admin/users/{}/ban", UserId::random()))
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn swap_list_filters_by_status() {
    let actor = admin();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .admin
        .expect_swaps()
        .withf(|_, status, _| *status == Some(SwapStatus::Completed))
        .times(1)
        .return_once(|_, _, page| Ok(Paginated::new(Vec::new(), 0, page)));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, _) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/admin/swaps?status=completed")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[case::both(Some("2025-01-01"), Some("2025-01-31"), true)]
#[case::start_only(Some("2025-01-01"), None, false)]
#[case::end_only(None, Some("2025-01-31"), false)]
#[case::neither(None, None, false)]
fn report_range_needs_both_bounds(
    #[case] start: Option<&str>,
    #[case] end: Option<&str>,
    #[case] expected: bool,
) {
    let query = ReportQuery {
        start_date: start.map(str::to_owned),
        end_date: end.map(str::to_owned),
    };
    assert_eq!(query.range().expect("valid range").is_some(), expected);
}

#[rstest]
fn report_range_covers_whole_days() {
    let query = ReportQuery {
        start_date: Some("2025-01-01".to_owned()),
        end_date: Some("2025-01-01".to_owned()),
    };
    let range = query.range().expect("valid range").expect("range present");
    let late = Utc
        .with_ymd_and_hms(2025, 1, 1, 23, 30, 0)
        .single()
        .expect("valid timestamp");
    assert!(range.contains(late));
}

#[rstest]
fn inverted_report_range_is_rejected() {
    let query = ReportQuery {
        start_date: Some("2025-02-01".to_owned()),
        end_date: Some("2025-01-01".to_owned()),
    };
    let err = query.range().expect_err("inverted");
    assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
}

#[actix_web::test]
async fn unknown_report_types_are_rejected() {
    let actor = admin();
    let app = test::init_service(api_app(TestPorts::acting_as(actor).into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/admin/reports/revenue")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "type");
}

#[actix_web::test]
async fn rating_report_lists_users() {
    let actor = admin();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .admin
        .expect_report()
        .withf(|_, kind, range| *kind == ReportKind::UserRatings && range.is_none())
        .times(1)
        .return_once(|_, kind, _| {
            let user = sample_user("Grace Hopper");
            Ok(Report {
                kind,
                data: ReportData::UserRatings(vec![RatedUser {
                    id: user.id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    rating: RatingAggregate::from_parts(5.0, 3),
                }]),
                generated_at: fixed_now(),
            })
        });
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/admin/reports/user-ratings")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "user-ratings");
    assert_eq!(body["data"][0]["name"], "Grace Hopper");
    assert_eq!(body["data"][0]["rating"]["count"], 3);
}
