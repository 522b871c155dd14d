//! Generic entity repository.
//!
//! One CRUD implementation parameterized by an entity descriptor (the
//! `Entity` trait), instantiated for Book, Author and Library. Per-entity
//! code is limited to the column lists of INSERT/UPDATE and the detailed
//! relation loading; everything else is shared.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, FromRow, SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    repository::associations::Association,
};

/// A relation field of a create/update payload: the association it targets
/// and the full desired id set.
pub struct RelationTarget<'a> {
    pub assoc: &'static Association,
    pub ids: &'a [i64],
}

/// Create/replace payload contract: field validation plus the declared
/// relation id lists the service reconciles after the scalar write.
pub trait EntityPayload: DeserializeOwned + Validate + Send + Sync + 'static {
    fn relations(&self) -> Vec<RelationTarget<'_>>;

    fn validate_payload(&self) -> AppResult<()> {
        Validate::validate(self)?;
        Ok(())
    }

    /// Rules that bind only when creating a new entity, on top of the field
    /// validation shared with updates.
    fn validate_create(&self) -> AppResult<()> {
        self.validate_payload()
    }
}

/// Entity descriptor: table metadata, scalar persistence and the
/// associations the entity owns.
#[async_trait]
pub trait Entity:
    Sized + Send + Sync + Unpin + Serialize + for<'r> FromRow<'r, SqliteRow> + 'static
{
    /// Display name used in messages and response envelopes ("Book").
    const NAME: &'static str;
    /// Entity table name.
    const TABLE: &'static str;
    /// Associations owned by this entity, in envelope order.
    const ASSOCIATIONS: &'static [&'static Association];

    type Create: EntityPayload;

    fn id(&self) -> i64;

    /// Insert the scalar columns, returning the assigned id.
    async fn insert(conn: &mut SqliteConnection, data: &Self::Create) -> AppResult<i64>;

    /// Full replace of the scalar columns.
    async fn replace(conn: &mut SqliteConnection, id: i64, data: &Self::Create) -> AppResult<()>;

    /// Related entities serialized per relation field, for detailed listings.
    async fn related_detailed(
        conn: &mut SqliteConnection,
        id: i64,
        out: &mut Map<String, Value>,
    ) -> AppResult<()>;
}

/// Fetch by id, or None.
pub async fn fetch_optional<E: Entity>(
    conn: &mut SqliteConnection,
    id: i64,
) -> AppResult<Option<E>> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", E::TABLE);
    let entity = sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(entity)
}

/// Fetch by id, failing with NotFound.
pub async fn fetch<E: Entity>(conn: &mut SqliteConnection, id: i64) -> AppResult<E> {
    fetch_optional::<E>(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", E::NAME)))
}

/// Pool-backed reads shared by every entity type.
pub struct EntityRepository<E> {
    pool: SqlitePool,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All rows, fully materialized, ordered by id.
    pub async fn list(&self) -> AppResult<Vec<E>> {
        let sql = format!("SELECT * FROM {} ORDER BY id", E::TABLE);
        let entities = sqlx::query_as::<_, E>(&sql).fetch_all(&self.pool).await?;
        Ok(entities)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// One page of rows. An out-of-range skip yields an empty page.
    pub async fn page(&self, skip: i64, limit: i64) -> AppResult<Vec<E>> {
        let sql = format!("SELECT * FROM {} ORDER BY id LIMIT ? OFFSET ?", E::TABLE);
        let entities = sqlx::query_as::<_, E>(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(entities)
    }

    pub async fn get(&self, id: i64) -> AppResult<E> {
        let mut conn = self.pool.acquire().await?;
        fetch::<E>(&mut conn, id).await
    }
}
