//! Administrative statistics and reports.
//!
//! Aggregations are pure functions over entity slices so that every
//! storage adapter produces identical reports.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use super::rating::RatingAggregate;
use super::skill::Skill;
use super::swap::{Swap, SwapStatus};
use super::user::{DisplayName, EmailAddress, User};
use super::UserId;

/// Number of users listed by the ratings report.
pub const TOP_RATED_LIMIT: usize = 20;
/// Window used to decide whether a user counts as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 7;

/// Validation errors for report requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportValidationError {
    #[error("invalid report type: {0}")]
    UnknownKind(String),
    #[error("startDate must not be after endDate")]
    InvertedRange,
}

/// Report families available to administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Registrations per day.
    UserActivity,
    /// Swaps per status.
    SwapStats,
    /// Approved skills per category.
    SkillCategories,
    /// Best-rated users.
    UserRatings,
}

impl ReportKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserActivity => "user-activity",
            Self::SwapStats => "swap-stats",
            Self::SkillCategories => "skill-categories",
            Self::UserRatings => "user-ratings",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ReportValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::UserActivity,
            Self::SwapStats,
            Self::SkillCategories,
            Self::UserRatings,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == s)
        .ok_or_else(|| ReportValidationError::UnknownKind(s.to_owned()))
    }
}

/// Inclusive creation-time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ReportValidationError> {
        if start > end {
            return Err(ReportValidationError::InvertedRange);
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Registrations on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Swaps in one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: SwapStatus,
    pub count: u64,
}

/// Approved skills in one category. `None` groups uncategorised skills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub count: u64,
}

/// A user in the ratings leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedUser {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub rating: RatingAggregate,
}

/// Rows of a generated report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportData {
    UserActivity(Vec<DailyCount>),
    SwapStats(Vec<StatusCount>),
    SkillCategories(Vec<CategoryCount>),
    UserRatings(Vec<RatedUser>),
}

/// A generated report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub data: ReportData,
    pub generated_at: DateTime<Utc>,
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformStats {
    pub users_total: u64,
    pub users_active: u64,
    pub users_banned: u64,
    pub skills_total: u64,
    pub skills_pending: u64,
    pub swaps_total: u64,
    pub swaps_completed: u64,
    pub swaps_pending: u64,
}

/// Per-user counters shown on profiles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UserStats {
    pub offered_skills: u64,
    pub wanted_skills: u64,
    pub completed_swaps: u64,
    pub pending_swaps: u64,
    pub rating: RatingAggregate,
}

fn to_count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Registrations grouped by UTC day, oldest first.
pub fn user_activity(users: &[User]) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for user in users.iter().filter(|user| !user.is_admin()) {
        *per_day.entry(user.created_at.date_naive()).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Swaps grouped by status in lifecycle order, omitting empty statuses.
pub fn swap_stats(swaps: &[Swap]) -> Vec<StatusCount> {
    SwapStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: to_count(swaps.iter().filter(|swap| swap.status() == status).count()),
        })
        .filter(|row| row.count > 0)
        .collect()
}

/// Approved skills grouped by category, largest first.
pub fn skill_categories(skills: &[Skill]) -> Vec<CategoryCount> {
    let mut per_category: BTreeMap<Option<String>, u64> = BTreeMap::new();
    for skill in skills.iter().filter(|skill| skill.moderation.is_approved()) {
        *per_category.entry(skill.category.clone()).or_default() += 1;
    }
    let mut rows: Vec<CategoryCount> = per_category
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    rows
}

/// Rated, non-admin users ordered by average then rating count.
pub fn top_rated(users: &[User], limit: usize) -> Vec<RatedUser> {
    let mut rated: Vec<&User> = users
        .iter()
        .filter(|user| !user.is_admin() && user.rating.count() > 0)
        .collect();
    rated.sort_by(|a, b| {
        b.rating
            .average()
            .total_cmp(&a.rating.average())
            .then_with(|| b.rating.count().cmp(&a.rating.count()))
    });
    rated
        .into_iter()
        .take(limit)
        .map(|user| RatedUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            rating: user.rating,
        })
        .collect()
}
