//! PostgreSQL-backed `SkillRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{PageParams, Paginated};

use crate::domain::ports::{
    ModerationFilter, SkillFilter, SkillRepository, SkillRepositoryError,
};
use crate::domain::{ModerationState, Skill, SkillId, SkillLevel, SkillName, SkillType, UserId};

use super::error_mapping::{
    contains_pattern, escape_like, map_diesel_error, map_pool_error, to_i64, to_u64,
};
use super::models::{SkillChangeset, SkillRow};
use super::pool::{DbPool, PoolError};
use super::schema::skills;

/// Diesel-backed implementation of the skill repository port.
#[derive(Clone)]
pub struct DieselSkillRepository {
    pool: DbPool,
}

impl DieselSkillRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> SkillRepositoryError {
    map_pool_error(error, SkillRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> SkillRepositoryError {
    map_diesel_error(
        error,
        SkillRepositoryError::query,
        SkillRepositoryError::connection,
    )
}

fn corrupt(error: impl std::fmt::Display) -> SkillRepositoryError {
    SkillRepositoryError::query(format!("invalid stored skill: {error}"))
}

fn row_to_skill(row: SkillRow) -> Result<Skill, SkillRepositoryError> {
    let SkillRow {
        id,
        owner_id,
        name,
        description,
        category,
        skill_type,
        level,
        moderation_state,
        rejection_reason,
        created_at,
        updated_at,
    } = row;
    Ok(Skill {
        id: SkillId::from_uuid(id),
        owner: UserId::from_uuid(owner_id),
        name: SkillName::new(name).map_err(corrupt)?,
        description,
        category,
        skill_type: skill_type.parse::<SkillType>().map_err(corrupt)?,
        level: level.parse::<SkillLevel>().map_err(corrupt)?,
        moderation: ModerationState::from_parts(&moderation_state, rejection_reason)
            .map_err(corrupt)?,
        created_at,
        updated_at,
    })
}

fn skill_to_row(skill: &Skill) -> SkillRow {
    SkillRow {
        id: *skill.id.as_uuid(),
        owner_id: *skill.owner.as_uuid(),
        name: skill.name.as_ref().to_owned(),
        description: skill.description.clone(),
        category: skill.category.clone(),
        skill_type: skill.skill_type.as_str().to_owned(),
        level: skill.level.as_str().to_owned(),
        moderation_state: skill.moderation.tag().to_owned(),
        rejection_reason: skill.moderation.rejection_reason().map(str::to_owned),
        created_at: skill.created_at,
        updated_at: skill.updated_at,
    }
}

fn filtered(filter: &SkillFilter) -> skills::BoxedQuery<'static, Pg> {
    let mut query = skills::table.into_boxed();
    if let Some(owner) = filter.owner {
        query = query.filter(skills::owner_id.eq(*owner.as_uuid()));
    }
    match filter.moderation {
        ModerationFilter::Any => {}
        ModerationFilter::Visible => {
            query = query.filter(skills::moderation_state.eq(ModerationState::Approved.tag()));
        }
        ModerationFilter::Pending => {
            query = query.filter(skills::moderation_state.eq(ModerationState::Pending.tag()));
        }
    }
    if let Some(skill_type) = filter.skill_type {
        query = query.filter(skills::skill_type.eq(skill_type.as_str()));
    }
    if let Some(level) = filter.level {
        query = query.filter(skills::level.eq(level.as_str()));
    }
    if let Some(term) = filter.text.as_deref() {
        let pattern = contains_pattern(term);
        query = query.filter(
            skills::name
                .ilike(pattern.clone())
                .or(skills::description.assume_not_null().ilike(pattern)),
        );
    }
    if let Some(term) = filter.name.as_deref() {
        query = query.filter(skills::name.ilike(contains_pattern(term)));
    }
    if let Some(term) = filter.category.as_deref() {
        query = query.filter(
            skills::category
                .assume_not_null()
                .ilike(contains_pattern(term)),
        );
    }
    if let Some(range) = filter.created_between {
        query = query.filter(
            skills::created_at
                .ge(range.start())
                .and(skills::created_at.le(range.end())),
        );
    }
    query
}

#[async_trait]
impl SkillRepository for DieselSkillRepository {
    async fn insert(&self, skill: &Skill) -> Result<(), SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(skills::table)
            .values(&skill_to_row(skill))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &SkillId) -> Result<Option<Skill>, SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        skills::table
            .find(*id.as_uuid())
            .select(SkillRow::as_select())
            .first::<SkillRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_skill)
            .transpose()
    }

    async fn find_many(&self, ids: &[SkillId]) -> Result<Vec<Skill>, SkillRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let ids: Vec<_> = ids.iter().map(|id| *id.as_uuid()).collect();
        skills::table
            .filter(skills::id.eq_any(ids))
            .select(SkillRow::as_select())
            .load::<SkillRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_skill)
            .collect()
    }

    async fn find_duplicate(
        &self,
        owner: &UserId,
        name: &str,
        skill_type: SkillType,
    ) -> Result<Option<Skill>, SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        // An ILIKE pattern without wildcards is a case-insensitive equality.
        skills::table
            .filter(skills::owner_id.eq(*owner.as_uuid()))
            .filter(skills::skill_type.eq(skill_type.as_str()))
            .filter(skills::name.ilike(escape_like(name.trim())))
            .select(SkillRow::as_select())
            .first::<SkillRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_skill)
            .transpose()
    }

    async fn update(&self, skill: &Skill) -> Result<(), SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = SkillChangeset {
            name: skill.name.as_ref(),
            description: skill.description.as_deref(),
            category: skill.category.as_deref(),
            level: skill.level.as_str(),
            moderation_state: skill.moderation.tag(),
            rejection_reason: skill.moderation.rejection_reason(),
            updated_at: skill.updated_at,
        };
        diesel::update(skills::table.find(*skill.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn delete(&self, id: &SkillId) -> Result<bool, SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(skills::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(removed > 0)
    }

    async fn search(
        &self,
        filter: &SkillFilter,
        page: PageParams,
    ) -> Result<Paginated<Skill>, SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;
        let items = filtered(filter)
            .select(SkillRow::as_select())
            .order_by((skills::created_at.desc(), skills::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(to_i64(page.offset()))
            .load::<SkillRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_skill)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, to_u64(total), page))
    }

    async fn list(&self, filter: &SkillFilter) -> Result<Vec<Skill>, SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        filtered(filter)
            .select(SkillRow::as_select())
            .order_by((skills::created_at.desc(), skills::id.desc()))
            .load::<SkillRow>(&mut conn)
            .await
            .map_err(diesel_error)?
            .into_iter()
            .map(row_to_skill)
            .collect()
    }

    async fn count(&self, filter: &SkillFilter) -> Result<u64, SkillRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let total = filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_u64(total))
    }
}
