//! PostgreSQL-backed `SwapRepository` implementation using Diesel ORM.
//!
//! Status writes are conditional on the stored status so that two racing
//! transitions cannot both succeed. Rating writes touch one side's columns
//! only, so two parties rating at once keep both slots.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{PageParams, Paginated};

use crate::domain::ports::{SwapFilter, SwapRepository, SwapRepositoryError};
use crate::domain::{
    Rating, SkillId, Swap, SwapId, SwapParty, SwapProposal, SwapRating, SwapRecord, SwapStatus,
    UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error, to_i64, to_u64};
use super::models::{SwapRow, SwapStatusChangeset};
use super::pool::{DbPool, PoolError};
use super::schema::swaps;

/// Diesel-backed implementation of the swap repository port.
#[derive(Clone)]
pub struct DieselSwapRepository {
    pool: DbPool,
}

impl DieselSwapRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> SwapRepositoryError {
    map_pool_error(error, SwapRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> SwapRepositoryError {
    map_diesel_error(
        error,
        SwapRepositoryError::query,
        SwapRepositoryError::connection,
    )
}

fn corrupt(error: impl std::fmt::Display) -> SwapRepositoryError {
    SwapRepositoryError::query(format!("invalid stored swap: {error}"))
}

fn decode_rating(
    score: Option<i16>,
    comment: Option<String>,
) -> Result<Option<SwapRating>, SwapRepositoryError> {
    let Some(score) = score else {
        return Ok(None);
    };
    let rating = Rating::new(i64::from(score)).map_err(corrupt)?;
    SwapRating::new(rating, comment).map(Some).map_err(corrupt)
}

fn row_to_swap(row: SwapRow) -> Result<Swap, SwapRepositoryError> {
    let SwapRow {
        id,
        requester_id,
        recipient_id,
        requested_skill_id,
        offered_skill_id,
        status,
        message,
        scheduled_date,
        completed_at,
        requester_rating,
        requester_comment,
        recipient_rating,
        recipient_comment,
        created_at,
        updated_at,
    } = row;
    Swap::restore(SwapRecord {
        id: SwapId::from_uuid(id),
        requester: UserId::from_uuid(requester_id),
        recipient: UserId::from_uuid(recipient_id),
        requested_skill: SkillId::from_uuid(requested_skill_id),
        offered_skill: SkillId::from_uuid(offered_skill_id),
        status: status.parse::<SwapStatus>().map_err(corrupt)?,
        message,
        scheduled_date,
        completed_at,
        from_requester: decode_rating(requester_rating, requester_comment)?,
        from_recipient: decode_rating(recipient_rating, recipient_comment)?,
        created_at,
        updated_at,
    })
    .map_err(corrupt)
}

fn score(swap: &Swap, party: SwapParty) -> Option<i16> {
    swap.rating_from(party)
        .map(|rating| i16::from(rating.rating().value()))
}

fn comment(swap: &Swap, party: SwapParty) -> Option<&str> {
    swap.rating_from(party).and_then(SwapRating::comment)
}

fn swap_to_row(swap: &Swap) -> SwapRow {
    SwapRow {
        id: *swap.id().as_uuid(),
        requester_id: *swap.requester().as_uuid(),
        recipient_id: *swap.recipient().as_uuid(),
        requested_skill_id: *swap.requested_skill().as_uuid(),
        offered_skill_id: *swap.offered_skill().as_uuid(),
        status: swap.status().as_str().to_owned(),
        message: swap.message().map(str::to_owned),
        scheduled_date: swap.scheduled_date(),
        completed_at: swap.completed_at(),
        requester_rating: score(swap, SwapParty::Requester),
        requester_comment: comment(swap, SwapParty::Requester).map(str::to_owned),
        recipient_rating: score(swap, SwapParty::Recipient),
        recipient_comment: comment(swap, SwapParty::Recipient).map(str::to_owned),
        created_at: swap.created_at(),
        updated_at: swap.updated_at(),
    }
}

fn filtered(filter: &SwapFilter) -> swaps::BoxedQuery<'static, Pg> {
    let mut query = swaps::table.into_boxed();
    if let Some(user) = filter.participant {
        let user = *user.as_uuid();
        query = query.filter(
            swaps::requester_id
                .eq(user)
                .or(swaps::recipient_id.eq(user)),
        );
    }
    if let Some(status) = filter.status {
        query = query.filter(swaps::status.eq(status.as_str()));
    }
    if filter.fully_rated {
        query = query.filter(
            swaps::requester_rating
                .is_not_null()
                .and(swaps::recipient_rating.is_not_null()),
        );
    }
    if let Some(range) = filter.created_between {
        query = query.filter(
            swaps::created_at
                .ge(range.start())
                .and(swaps::created_at.le(range.end())),
        );
    }
    query
}

#[async_trait]
impl SwapRepository for DieselSwapRepository {
    async fn insert(&self, swap: &Swap) -> Result<(), SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(swaps::table)
            .values(&swap_to_row(swap))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &SwapId) -> Result<Option<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        swaps::table
            .find(*id.as_uuid())
            .select(SwapRow::as_select())
            .first::<SwapRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_swap)
            .transpose()
    }

    async fn find_pending_duplicate(
        &self,
        proposal: &SwapProposal,
    ) -> Result<Option<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        swaps::table
            .filter(swaps::requester_id.eq(*proposal.requester().as_uuid()))
            .filter(swaps::recipient_id.eq(*proposal.recipient().as_uuid()))
            .filter(swaps::requested_skill_id.eq(*proposal.requested_skill().as_uuid()))
            .filter(swaps::offered_skill_id.eq(*proposal.offered_skill().as_uuid()))
            .filter(swaps::status.eq(SwapStatus::Pending.as_str()))
            .select(SwapRow::as_select())
            .first::<SwapRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_swap)
            .transpose()
    }

    async fn transition(
        &self,
        swap: &Swap,
        expected: SwapStatus,
    ) -> Result<bool, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = SwapStatusChangeset {
            status: swap.status().as_str(),
            completed_at: swap.completed_at(),
            updated_at: swap.updated_at(),
        };
        let written = diesel::update(
            swaps::table
                .filter(swaps::id.eq(*swap.id().as_uuid()))
                .filter(swaps::status.eq(expected.as_str())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(written == 1)
    }

    async fn save_rating(
        &self,
        swap_id: &SwapId,
        party: SwapParty,
        rating: &SwapRating,
        at: DateTime<Utc>,
    ) -> Result<Option<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = swaps::table
            .filter(swaps::id.eq(*swap_id.as_uuid()))
            .filter(swaps::status.eq(SwapStatus::Completed.as_str()));
        let score = i16::from(rating.rating().value());
        let comment = rating.comment();
        // Only this side's columns are written; the row returned carries the
        // other side's slot as currently stored.
        let row = match party {
            SwapParty::Requester => {
                diesel::update(target)
                    .set((
                        swaps::requester_rating.eq(score),
                        swaps::requester_comment.eq(comment),
                        swaps::updated_at.eq(at),
                    ))
                    .returning(SwapRow::as_returning())
                    .get_result::<SwapRow>(&mut conn)
                    .await
            }
            SwapParty::Recipient => {
                diesel::update(target)
                    .set((
                        swaps::recipient_rating.eq(score),
                        swaps::recipient_comment.eq(comment),
                        swaps::updated_at.eq(at),
                    ))
                    .returning(SwapRow::as_returning())
                    .get_result::<SwapRow>(&mut conn)
                    .await
            }
        };
        row.optional()
            .map_err(diesel_error)?
            .map(row_to_swap)
            .transpose()
    }

    async fn search(
        &self,
        filter: &SwapFilter,
        page: PageParams,
    ) -> Result<Paginated<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;
        let items = filtered(filter)
            .select(SwapRow::as_select())
            .order_by((swaps::created_at.desc(), swaps::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(to_i64(page.offset()))
            .load::<SwapRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_swap)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, to_u64(total), page))
    }

    async fn list(&self, filter: &SwapFilter) -> Result<Vec<Swap>, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        filtered(filter)
            .select(SwapRow::as_select())
            .order_by((swaps::created_at.desc(), swaps::id.desc()))
            .load::<SwapRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_swap)
            .collect()
    }

    async fn count(&self, filter: &SwapFilter) -> Result<u64, SwapRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_u64(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SwapAction;
    use crate::test_support::fixed_now;
    use rstest::rstest;

    fn completed_swap() -> Swap {
        let requester = UserId::random();
        let recipient = UserId::random();
        let proposal = SwapProposal::new(
            requester,
            recipient,
            SkillId::random(),
            SkillId::random(),
            Some("Saturday mornings?".to_owned()),
            None,
        )
        .expect("valid proposal");
        let mut swap = Swap::propose(SwapId::random(), proposal, fixed_now());
        swap.apply(&recipient, SwapAction::Accept, fixed_now())
            .expect("accept");
        swap.apply(&requester, SwapAction::Complete, fixed_now())
            .expect("complete");
        let rating = SwapRating::new(
            Rating::new(4).expect("valid rating"),
            Some("Patient teacher".to_owned()),
        )
        .expect("valid rating");
        swap.rate(&requester, rating, fixed_now()).expect("rate");
        swap
    }

    #[rstest]
    fn rating_slots_survive_storage() {
        let swap = completed_swap();
        let row = swap_to_row(&swap);
        assert_eq!(row.requester_rating, Some(4));
        assert_eq!(row.recipient_rating, None);
        assert_eq!(row_to_swap(row).expect("valid row"), swap);
    }

    #[rstest]
    fn out_of_range_scores_are_query_errors() {
        let mut row = swap_to_row(&completed_swap());
        row.recipient_rating = Some(9);
        assert!(matches!(
            row_to_swap(row),
            Err(SwapRepositoryError::Query { .. })
        ));
    }

    #[rstest]
    fn ratings_on_open_swaps_are_query_errors() {
        let mut row = swap_to_row(&completed_swap());
        row.status = SwapStatus::Accepted.as_str().to_owned();
        row.completed_at = None;
        assert!(matches!(
            row_to_swap(row),
            Err(SwapRepositoryError::Query { .. })
        ));
    }
}
