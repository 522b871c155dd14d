//! Generic entity service.
//!
//! Orchestrates the create/update flows: validate the payload, verify every
//! referenced id exists, persist the scalar row, then reconcile each
//! association to its target id set. Each operation runs inside one
//! transaction acquired from the pool and released unconditionally (commit
//! on success, rollback on drop).

use serde_json::{json, Map, Value};
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::{AppError, AppResult, BulkItemError},
    repository::{
        associations::Association,
        entity::{self, Entity, EntityPayload, EntityRepository},
    },
};

/// Entity plus its linked-id lists, serialized as
/// `{"<entity>": {...}, "<relation>_ids": [...]}`.
async fn envelope<E: Entity>(conn: &mut SqliteConnection, entity: &E) -> AppResult<Value> {
    let mut map = Map::new();
    map.insert(E::NAME.to_lowercase(), serde_json::to_value(entity)?);
    for assoc in E::ASSOCIATIONS {
        let ids = assoc.linked_ids(&mut *conn, entity.id()).await?;
        map.insert(assoc.ids_field.to_string(), serde_json::to_value(ids)?);
    }
    Ok(Value::Object(map))
}

pub struct EntityService<E: Entity> {
    repo: EntityRepository<E>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            repo: EntityRepository::new(pool),
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        self.repo.pool()
    }

    /// Flat listing, or a detailed one with related entities inlined.
    pub async fn list(&self, detailed: bool) -> AppResult<Value> {
        let entities = self.repo.list().await?;
        if !detailed {
            return Ok(serde_json::to_value(entities)?);
        }

        let mut conn = self.pool().acquire().await?;
        let mut rows = Vec::with_capacity(entities.len());
        for entity in &entities {
            let Value::Object(mut obj) = serde_json::to_value(entity)? else {
                return Err(AppError::Internal(
                    "entity did not serialize to an object".to_string(),
                ));
            };
            E::related_detailed(&mut conn, entity.id(), &mut obj).await?;
            rows.push(Value::Object(obj));
        }
        Ok(Value::Array(rows))
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repo.count().await
    }

    /// One page wrapped in the `{total, skip, limit, data}` envelope.
    /// A skip past the end yields an empty data page, not an error.
    pub async fn paginate(&self, skip: i64, limit: i64, detailed: bool) -> AppResult<Value> {
        if skip < 0 || limit < 0 {
            return Err(AppError::Validation(
                "skip and limit must be non-negative".to_string(),
            ));
        }

        let total = self.repo.count().await?;
        let entities = self.repo.page(skip, limit).await?;

        let data = if detailed {
            let mut conn = self.pool().acquire().await?;
            let mut rows = Vec::with_capacity(entities.len());
            for entity in &entities {
                rows.push(envelope(&mut conn, entity).await?);
            }
            Value::Array(rows)
        } else {
            serde_json::to_value(entities)?
        };

        Ok(json!({
            "total": total,
            "skip": skip,
            "limit": limit,
            "data": data,
        }))
    }

    pub async fn get(&self, id: i64) -> AppResult<Value> {
        let mut conn = self.pool().acquire().await?;
        let entity: E = entity::fetch(&mut conn, id).await?;
        envelope(&mut conn, &entity).await
    }

    /// Create one entity: referenced ids are checked before the owning row
    /// is persisted, then every relation is linked.
    pub async fn create(&self, data: E::Create) -> AppResult<Value> {
        data.validate_create()?;

        let mut tx = self.pool().begin().await?;
        for rel in data.relations() {
            for &id in rel.ids {
                rel.assoc.ensure_other_exists(&mut tx, id).await?;
            }
        }

        let id = E::insert(&mut tx, &data).await?;
        for rel in data.relations() {
            rel.assoc.reconcile(&mut tx, id, rel.ids).await?;
        }

        let entity: E = entity::fetch(&mut tx, id).await?;
        let body = envelope(&mut tx, &entity).await?;
        tx.commit().await?;

        tracing::debug!("created {} id={}", E::NAME, id);
        Ok(body)
    }

    /// Full replace of scalar fields plus reconciliation of every relation
    /// to the submitted target id set.
    pub async fn update(&self, id: i64, data: E::Create) -> AppResult<Value> {
        data.validate_payload()?;

        let mut tx = self.pool().begin().await?;
        let _existing: E = entity::fetch(&mut tx, id).await?;

        E::replace(&mut tx, id, &data).await?;
        for rel in data.relations() {
            rel.assoc.reconcile(&mut tx, id, rel.ids).await?;
        }

        let entity: E = entity::fetch(&mut tx, id).await?;
        let body = envelope(&mut tx, &entity).await?;
        tx.commit().await?;
        Ok(body)
    }

    /// Delete one entity and its join rows, returning the deleted row.
    pub async fn delete(&self, id: i64) -> AppResult<Value> {
        let mut tx = self.pool().begin().await?;
        let entity: E = entity::fetch(&mut tx, id).await?;

        for assoc in E::ASSOCIATIONS {
            assoc.unlink_all(&mut tx, id).await?;
        }
        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(serde_json::to_value(entity)?)
    }

    /// All-or-nothing batch create of scalar rows. Any failing item rolls
    /// back the whole batch and every failing index is reported.
    pub async fn bulk_create(&self, items: Vec<E::Create>) -> AppResult<Value> {
        let mut tx = self.pool().begin().await?;
        let mut created_ids = Vec::new();
        let mut errors = Vec::new();

        for (index, item) in items.iter().enumerate() {
            if let Err(e) = item.validate_payload() {
                errors.push(BulkItemError {
                    index,
                    error: e.to_string(),
                });
                continue;
            }
            match E::insert(&mut tx, item).await {
                Ok(id) => created_ids.push(id),
                Err(e) => errors.push(BulkItemError {
                    index,
                    error: e.to_string(),
                }),
            }
        }

        if !errors.is_empty() {
            tx.rollback().await?;
            return Err(AppError::BulkCreate(errors));
        }

        tx.commit().await?;
        Ok(json!({
            "created_count": created_ids.len(),
            "created_ids": created_ids,
            "message": format!("Successfully created {} {} entities", created_ids.len(), E::NAME),
        }))
    }

    /// Best-effort batch delete: each id is deleted independently, missing
    /// ids are reported, nothing aborts the rest.
    pub async fn bulk_delete(&self, ids: Vec<i64>) -> AppResult<Value> {
        let mut tx = self.pool().begin().await?;
        let mut deleted_count = 0u64;
        let mut not_found = Vec::new();

        for id in ids {
            match entity::fetch_optional::<E>(&mut tx, id).await? {
                Some(_) => {
                    for assoc in E::ASSOCIATIONS {
                        assoc.unlink_all(&mut tx, id).await?;
                    }
                    let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
                    sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
                    deleted_count += 1;
                }
                None => not_found.push(id),
            }
        }

        tx.commit().await?;
        Ok(json!({
            "deleted_count": deleted_count,
            "not_found": not_found,
            "message": format!("Successfully deleted {} {} entities", deleted_count, E::NAME),
        }))
    }

    /// Add a single link, rejecting an existing pair.
    pub async fn add_link(
        &self,
        assoc: &'static Association,
        owner_id: i64,
        other_id: i64,
    ) -> AppResult<Value> {
        let mut tx = self.pool().begin().await?;

        if !assoc.owner_exists(&mut tx, owner_id).await? {
            return Err(AppError::NotFound(format!("{} not found", assoc.owner_name)));
        }
        if !assoc.other_exists(&mut tx, other_id).await? {
            return Err(AppError::NotFound(format!("{} not found", assoc.other_name)));
        }
        if assoc.contains(&mut tx, owner_id, other_id).await? {
            return Err(AppError::Conflict("Relationship already exists".to_string()));
        }

        assoc.insert_pair(&mut tx, owner_id, other_id).await?;
        tx.commit().await?;

        Ok(json!({
            "message": format!("{} added to {} successfully", assoc.other_name, assoc.field),
        }))
    }

    /// Remove a single link, rejecting a missing pair.
    pub async fn remove_link(
        &self,
        assoc: &'static Association,
        owner_id: i64,
        other_id: i64,
    ) -> AppResult<Value> {
        let mut tx = self.pool().begin().await?;

        if !assoc.owner_exists(&mut tx, owner_id).await? {
            return Err(AppError::NotFound(format!("{} not found", assoc.owner_name)));
        }
        if !assoc.contains(&mut tx, owner_id, other_id).await? {
            return Err(AppError::NotFound("Relationship not found".to_string()));
        }

        assoc.delete_pair(&mut tx, owner_id, other_id).await?;
        tx.commit().await?;

        Ok(json!({
            "message": format!("{} removed from {} successfully", assoc.other_name, assoc.field),
        }))
    }

    /// Full related entities for one association of an owner.
    pub async fn list_linked<O: Entity>(
        &self,
        assoc: &'static Association,
        owner_id: i64,
    ) -> AppResult<Value> {
        let mut conn = self.pool().acquire().await?;

        if !assoc.owner_exists(&mut conn, owner_id).await? {
            return Err(AppError::NotFound(format!("{} not found", assoc.owner_name)));
        }

        let entities: Vec<O> = assoc.linked_entities(&mut conn, owner_id).await?;
        let mut map = Map::new();
        map.insert(assoc.owner_key.to_string(), json!(owner_id));
        map.insert(format!("{}_count", assoc.field), json!(entities.len()));
        map.insert(assoc.field.to_string(), serde_json::to_value(entities)?);
        Ok(Value::Object(map))
    }
}
