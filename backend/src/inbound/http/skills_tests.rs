//! Tests for the skill handlers.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use pagination::Paginated;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{OwnedSkills, SkillListing};
use crate::domain::UserId;
use crate::inbound::http::test_utils::{TestPorts, admin, api_app, login, member, send};
use crate::test_support::sample_skill;

#[actix_web::test]
async fn create_defaults_level_and_trims_optionals() {
    let actor = member();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .skills
        .expect_create()
        .withf(|_, input| {
            input.name.as_ref() == "Guitar"
                && input.skill_type == SkillType::Offered
                && input.level == SkillLevel::Intermediate
                && input.description.is_none()
                && input.category.as_deref() == Some("Music")
        })
        .times(1)
        .return_once(|who, _| Ok(sample_skill(who.user_id(), "Guitar", SkillType::Offered)));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/skills")
            .cookie(cookie)
            .set_json(json!({
                "name": "Guitar",
                "description": "   ",
                "category": " Music ",
                "type": "offered",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "offered");
    assert_eq!(body["isApproved"], true);
}

#[rstest]
#[case::short_name(json!({"name": "G", "type": "offered"}), "name")]
#[case::missing_type(json!({"name": "Guitar"}), "type")]
#[case::unknown_type(json!({"name": "Guitar", "type": "borrowed"}), "type")]
#[case::unknown_level(json!({"name": "Guitar", "type": "wanted", "level": "guru"}), "level")]
#[case::long_category(json!({"name": "Guitar", "type": "wanted", "category": "c".repeat(51)}), "category")]
#[actix_web::test]
async fn create_rejects_invalid_fields(#[case] payload: Value, #[case] field: &str) {
    let actor = member();
    let app = test::init_service(api_app(TestPorts::acting_as(actor).into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/v1/skills")
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some(field)
    );
}

#[actix_web::test]
async fn my_skills_splits_by_type() {
    let actor = member();
    let mut ports = TestPorts::acting_as(actor);
    ports.skills_query.expect_my_skills().times(1).return_once(|who| {
        Ok(OwnedSkills {
            offered: vec![sample_skill(who.user_id(), "Baking", SkillType::Offered)],
            wanted: vec![
                sample_skill(who.user_id(), "Welding", SkillType::Wanted),
                sample_skill(who.user_id(), "Chess", SkillType::Wanted),
            ],
        })
    });
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/skills/my-skills")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offeredSkills"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["wantedSkills"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn search_is_public_and_parses_filters() {
    let mut ports = TestPorts::default();
    ports
        .skills_query
        .expect_search()
        .withf(|search, page| {
            search.text.as_deref() == Some("guitar")
                && search.skill_type == Some(SkillType::Offered)
                && search.level == Some(SkillLevel::Beginner)
                && search.category.is_none()
                && page.limit() == 20
        })
        .times(1)
        .return_once(|_, page| {
            let skill = sample_skill(&UserId::random(), "Guitar", SkillType::Offered);
            Ok(Paginated::new(
                vec![SkillListing { skill, owner: None }],
                1,
                page,
            ))
        });
    let app = test::init_service(api_app(ports.into_state())).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/skills/search?q=guitar&type=offered&level=beginner&category=&limit=20")
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["name"], "Guitar");
    assert_eq!(body["items"][0]["owner"], Value::Null);
}

#[rstest]
#[case::limit_too_large("limit=500", "limit")]
#[case::page_zero("page=0", "page")]
#[actix_web::test]
async fn search_rejects_bad_paging(#[case] query: &str, #[case] field: &str) {
    let app = test::init_service(api_app(TestPorts::default().into_state())).await;
    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/skills/search?{query}"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some(field)
    );
}

#[actix_web::test]
async fn update_distinguishes_null_from_absent() {
    let actor = member();
    let skill = sample_skill(actor.user_id(), "Pottery", SkillType::Offered);
    let skill_id = skill.id;
    let mut ports = TestPorts::acting_as(actor);
    ports
        .skills
        .expect_update()
        .withf(move |_, id, update| {
            *id == skill_id
                && update.name.is_none()
                && update.description == Some(None)
                && update.category.is_none()
                && update.level == Some(SkillLevel::Expert)
        })
        .times(1)
        .return_once(move |_, _, _| Ok(skill));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, _) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/skills/{skill_id}"))
            .cookie(cookie)
            .set_json(json!({"description": null, "level": "expert"}))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn delete_returns_no_content() {
    let actor = member();
    let skill_id = SkillId::random();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .skills
        .expect_delete()
        .withf(move |_, id| *id == skill_id)
        .times(1)
        .return_once(|_, _| Ok(()));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/v1/skills/{skill_id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[actix_web::test]
async fn delete_of_foreign_skill_is_forbidden() {
    let actor = member();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .skills
        .expect_delete()
        .return_once(|_, _| Err(Error::forbidden("not your skill")));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, _) = send(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/v1/skills/{}", SkillId::random()))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn pending_route_is_not_captured_by_id_routes() {
    let actor = admin();
    let mut ports = TestPorts::acting_as(actor);
    ports
        .moderation
        .expect_pending()
        .times(1)
        .return_once(|_, page| Ok(Paginated::new(Vec::new(), 0, page)));
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/skills/admin/pending")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[actix_web::test]
async fn reject_requires_a_reason() {
    let actor = admin();
    let app = test::init_service(api_app(TestPorts::acting_as(actor).into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/skills/admin/{}/reject", SkillId::random()))
            .cookie(cookie)
            .set_json(json!({"reason": "  "}))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "reason");
}

#[actix_web::test]
async fn reject_forwards_the_reason() {
    let actor = admin();
    let mut skill = sample_skill(&UserId::random(), "Tarot", SkillType::Offered);
    let skill_id = skill.id;
    let mut ports = TestPorts::acting_as(actor);
    ports
        .moderation
        .expect_reject()
        .withf(move |_, id, reason| *id == skill_id && reason.as_ref() == "off-topic")
        .times(1)
        .return_once(move |_, _, reason| {
            skill.reject(reason, crate::test_support::fixed_now());
            Ok(skill)
        });
    let app = test::init_service(api_app(ports.into_state())).await;
    let cookie = login(&app, actor.user_id()).await;

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/v1/skills/admin/{skill_id}/reject"))
            .cookie(cookie)
            .set_json(json!({"reason": "off-topic"}))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isRejected"], true);
    assert_eq!(body["rejectionReason"], "off-topic");
}
