//! Shared builders and test doubles for unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Actor, CredentialHash, DisplayName, EmailAddress, NewSkill, Skill, SkillId, SkillLevel,
    SkillModerationPolicy, SkillName, SkillType, User, UserId, UserRole,
};

/// Clock pinned to a single instant.
pub struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fixed instant used across unit tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26)
        .single()
        .expect("valid timestamp")
}

pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(fixed_now()))
}

/// A public, unbanned user with the given display name.
pub fn sample_user(name: &str) -> User {
    User::register(
        UserId::random(),
        DisplayName::new(name).expect("valid name"),
        EmailAddress::new(format!(
            "{}@example.com",
            name.to_lowercase().replace(' ', ".")
        ))
        .expect("valid email"),
        CredentialHash::new("hash"),
        fixed_now(),
    )
}

pub fn sample_admin(name: &str) -> User {
    let mut user = sample_user(name);
    user.role = UserRole::Admin;
    user
}

pub fn actor_for(user: &User) -> Actor {
    Actor::new(user.id, user.role)
}

/// An approved skill owned by `owner`.
pub fn sample_skill(owner: &UserId, name: &str, skill_type: SkillType) -> Skill {
    Skill::create(
        SkillId::random(),
        *owner,
        NewSkill {
            name: SkillName::new(name).expect("valid name"),
            description: None,
            category: Some("General".to_owned()),
            skill_type,
            level: SkillLevel::Intermediate,
        },
        SkillModerationPolicy::AutoApprove,
        fixed_now(),
    )
}
