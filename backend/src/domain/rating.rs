//! Ratings exchanged after a completed swap and the per-user aggregate.
//!
//! The aggregate is always recomputed from the full set of received ratings
//! rather than updated incrementally, so replaying a recompute is harmless.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UserId;
use super::swap::{Swap, SwapStatus};

/// Lowest accepted rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted rating.
pub const RATING_MAX: u8 = 5;
/// Maximum length of the free-text comment accompanying a rating.
pub const RATING_COMMENT_MAX: usize = 500;

/// Validation errors for ratings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingValidationError {
    #[error("rating must be between {RATING_MIN} and {RATING_MAX}")]
    OutOfRange,
    #[error("comment must be at most {max} characters")]
    CommentTooLong { max: usize },
}

/// A rating score between [`RATING_MIN`] and [`RATING_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a raw score.
    pub fn new(value: i64) -> Result<Self, RatingValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|score| (RATING_MIN..=RATING_MAX).contains(score))
            .map(Self)
            .ok_or(RatingValidationError::OutOfRange)
    }

    /// The raw score.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One party's rating of the other, stored in the swap's rating slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRating {
    rating: Rating,
    comment: Option<String>,
}

impl SwapRating {
    /// Validate the optional comment and build a rating entry.
    ///
    /// Blank comments are stored as absent.
    pub fn new(rating: Rating, comment: Option<String>) -> Result<Self, RatingValidationError> {
        let comment = comment
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        if comment
            .as_deref()
            .is_some_and(|text| text.chars().count() > RATING_COMMENT_MAX)
        {
            return Err(RatingValidationError::CommentTooLong {
                max: RATING_COMMENT_MAX,
            });
        }
        Ok(Self { rating, comment })
    }

    pub const fn rating(&self) -> Rating {
        self.rating
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Average and count of the ratings a user has received.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingAggregate {
    average: f64,
    count: u32,
}

impl RatingAggregate {
    /// Rebuild an aggregate from stored values.
    pub const fn from_parts(average: f64, count: u32) -> Self {
        Self { average, count }
    }

    /// Aggregate a set of received ratings.
    ///
    /// Returns `None` when the set is empty.
    pub fn from_ratings<I>(ratings: I) -> Option<Self>
    where
        I: IntoIterator<Item = Rating>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0_u32, 0_u32), |(sum, count), rating| {
                (
                    sum.saturating_add(u32::from(rating.value())),
                    count.saturating_add(1),
                )
            });
        if count == 0 {
            return None;
        }
        let average = f64::from(sum) / f64::from(count);
        Some(Self { average, count })
    }

    pub const fn average(&self) -> f64 {
        self.average
    }

    pub const fn count(&self) -> u32 {
        self.count
    }
}

/// Recompute the aggregate for `user` from the swaps they took part in.
///
/// Only completed swaps in which both parties have rated count, and each
/// contributes the rating `user` received from their counterpart.
pub fn aggregate_received(user: &UserId, swaps: &[Swap]) -> Option<RatingAggregate> {
    RatingAggregate::from_ratings(
        swaps
            .iter()
            .filter(|swap| swap.status() == SwapStatus::Completed && swap.is_fully_rated())
            .filter_map(|swap| swap.rating_received_by(user)),
    )
}
