//! Tests for the skill catalogue service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{MockSkillRepository, MockUserRepository};
use crate::domain::{ErrorCode, ModerationState, SkillLevel, SkillName};
use crate::test_support::{actor_for, fixed_clock, sample_admin, sample_skill, sample_user};

fn service(
    users: MockUserRepository,
    skills: MockSkillRepository,
    policy: SkillModerationPolicy,
) -> SkillService {
    SkillService::new(Arc::new(users), Arc::new(skills), fixed_clock(), policy)
}

fn new_skill(name: &str, skill_type: SkillType) -> NewSkill {
    NewSkill {
        name: SkillName::new(name).expect("valid name"),
        description: Some("Lessons for beginners".to_owned()),
        category: Some("Music".to_owned()),
        skill_type,
        level: SkillLevel::Beginner,
    }
}

#[rstest]
#[case(SkillModerationPolicy::AutoApprove, ModerationState::Approved)]
#[case(SkillModerationPolicy::ReviewRequired, ModerationState::Pending)]
#[tokio::test]
async fn create_applies_moderation_policy(
    #[case] policy: SkillModerationPolicy,
    #[case] expected: ModerationState,
) {
    let owner = sample_user("Rosa Requester");
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_duplicate()
        .times(1)
        .return_once(|_, _, _| Ok(None));
    skills.expect_insert().times(1).return_once(|_| Ok(()));

    let skill = service(MockUserRepository::new(), skills, policy)
        .create(&actor_for(&owner), new_skill("Guitar", SkillType::Offered))
        .await
        .expect("skill created");

    assert_eq!(skill.owner, owner.id);
    assert_eq!(skill.moderation, expected);
}

#[tokio::test]
async fn create_refuses_same_name_and_type() {
    let owner = sample_user("Rosa Requester");
    let existing = sample_skill(&owner.id, "Guitar", SkillType::Offered);
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_duplicate()
        .withf(|_, name, skill_type| name == "guitar" && *skill_type == SkillType::Offered)
        .times(1)
        .return_once(move |_, _, _| Ok(Some(existing)));
    skills.expect_insert().times(0);

    let error = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .create(&actor_for(&owner), new_skill("guitar", SkillType::Offered))
    .await
    .expect_err("duplicate refused");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn update_by_stranger_is_forbidden() {
    let owner = sample_user("Rosa Requester");
    let stranger = sample_user("Olga Outsider");
    let skill = sample_skill(&owner.id, "Guitar", SkillType::Offered);
    let skill_id = skill.id;
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(skill)));
    skills.expect_update().times(0);

    let error = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .update(&actor_for(&stranger), &skill_id, SkillUpdate::default())
    .await
    .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn rename_onto_existing_skill_conflicts() {
    let owner = sample_user("Rosa Requester");
    let skill = sample_skill(&owner.id, "Guitar", SkillType::Offered);
    let other = sample_skill(&owner.id, "Ukulele", SkillType::Offered);
    let skill_id = skill.id;
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(skill)));
    skills
        .expect_find_duplicate()
        .return_once(move |_, _, _| Ok(Some(other)));
    skills.expect_update().times(0);

    let update = SkillUpdate {
        name: Some(SkillName::new("Ukulele").expect("valid name")),
        ..SkillUpdate::default()
    };
    let error = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .update(&actor_for(&owner), &skill_id, update)
    .await
    .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn update_keeps_moderation_state() {
    let owner = sample_user("Rosa Requester");
    let mut skill = sample_skill(&owner.id, "Guitar", SkillType::Offered);
    skill.moderation = ModerationState::Pending;
    let skill_id = skill.id;
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(skill)));
    skills.expect_update().times(1).return_once(|_| Ok(()));

    let update = SkillUpdate {
        level: Some(SkillLevel::Expert),
        description: Some(None),
        ..SkillUpdate::default()
    };
    let updated = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .update(&actor_for(&owner), &skill_id, update)
    .await
    .expect("updated");

    assert_eq!(updated.level, SkillLevel::Expert);
    assert_eq!(updated.description, None);
    assert_eq!(updated.moderation, ModerationState::Pending);
}

#[tokio::test]
async fn delete_of_vanished_skill_is_not_found() {
    let owner = sample_user("Rosa Requester");
    let skill = sample_skill(&owner.id, "Guitar", SkillType::Offered);
    let skill_id = skill.id;
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(skill)));
    skills.expect_delete().times(1).return_once(|_| Ok(false));

    let error = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .delete(&actor_for(&owner), &skill_id)
    .await
    .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn my_skills_splits_by_type() {
    let owner = sample_user("Rosa Requester");
    let listed = vec![
        sample_skill(&owner.id, "Guitar", SkillType::Offered),
        sample_skill(&owner.id, "Piano", SkillType::Wanted),
        sample_skill(&owner.id, "Drums", SkillType::Offered),
    ];
    let mut skills = MockSkillRepository::new();
    skills
        .expect_list()
        .withf(|filter| filter.moderation == ModerationFilter::Visible && filter.owner.is_some())
        .return_once(move |_| Ok(listed));

    let owned = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .my_skills(&actor_for(&owner))
    .await
    .expect("skills listed");

    assert_eq!(owned.offered.len(), 2);
    assert_eq!(owned.wanted.len(), 1);
}

#[tokio::test]
async fn search_attaches_owner_summaries() {
    let owner = sample_user("Pablo Recipient");
    let orphan_owner = UserId::random();
    let found = vec![
        sample_skill(&owner.id, "Piano", SkillType::Offered),
        sample_skill(&orphan_owner, "Painting", SkillType::Offered),
    ];
    let mut skills = MockSkillRepository::new();
    skills
        .expect_search()
        .withf(|filter, _| filter.moderation == ModerationFilter::Visible)
        .return_once(move |_, page| Ok(Paginated::from_all(found, page)));
    let mut users = MockUserRepository::new();
    let known = owner.clone();
    users
        .expect_find_many()
        .times(1)
        .return_once(move |_| Ok(vec![known]));

    let page = service(users, skills, SkillModerationPolicy::AutoApprove)
        .search(
            SkillSearch {
                text: Some("p".to_owned()),
                ..SkillSearch::default()
            },
            PageParams::default(),
        )
        .await
        .expect("search succeeds");

    assert_eq!(page.total, 2);
    assert_eq!(
        page.items[0].owner.as_ref().map(|summary| summary.id),
        Some(owner.id)
    );
    assert!(page.items[1].owner.is_none());
}

#[tokio::test]
async fn reject_records_reason() {
    let admin = sample_admin("Ada Admin");
    let owner = sample_user("Rosa Requester");
    let skill = sample_skill(&owner.id, "Guitar", SkillType::Offered);
    let skill_id = skill.id;
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(skill)));
    skills
        .expect_update()
        .withf(|skill| skill.moderation.is_rejected())
        .times(1)
        .return_once(|_| Ok(()));

    let rejected = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .reject(
        &actor_for(&admin),
        &skill_id,
        RejectionReason::new("too vague").expect("valid reason"),
    )
    .await
    .expect("rejected");

    assert!(!rejected.is_visible());
    assert_eq!(rejected.moderation.rejection_reason(), Some("too vague"));
}

#[tokio::test]
async fn approve_clears_rejection() {
    let admin = sample_admin("Ada Admin");
    let owner = sample_user("Rosa Requester");
    let mut skill = sample_skill(&owner.id, "Guitar", SkillType::Offered);
    skill.reject(
        RejectionReason::new("too vague").expect("valid reason"),
        skill.updated_at,
    );
    let skill_id = skill.id;
    let mut skills = MockSkillRepository::new();
    skills
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(skill)));
    skills.expect_update().times(1).return_once(|_| Ok(()));

    let approved = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    )
    .approve(&actor_for(&admin), &skill_id)
    .await
    .expect("approved");

    assert_eq!(approved.moderation, ModerationState::Approved);
    assert_eq!(approved.moderation.rejection_reason(), None);
}

#[tokio::test]
async fn moderation_requires_admin() {
    let user = sample_user("Rosa Requester");
    let mut skills = MockSkillRepository::new();
    skills.expect_find_by_id().times(0);
    skills.expect_search().times(0);
    let service = service(
        MockUserRepository::new(),
        skills,
        SkillModerationPolicy::AutoApprove,
    );

    let approve = service
        .approve(&actor_for(&user), &SkillId::random())
        .await
        .expect_err("forbidden");
    let pending = service
        .pending(&actor_for(&user), PageParams::default())
        .await
        .expect_err("forbidden");

    assert_eq!(approve.code(), ErrorCode::Forbidden);
    assert_eq!(pending.code(), ErrorCode::Forbidden);
}
