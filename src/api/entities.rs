//! Generic CRUD endpoints, instantiated per entity type in the router.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{error::AppResult, services::ServiceLookup, AppState};

use super::{ListParams, PageParams};

/// List all entities, flat or with related entities inlined.
pub async fn list<E: ServiceLookup>(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services).list(params.detailed).await?;
    Ok(Json(body))
}

/// Total entity count.
pub async fn count<E: ServiceLookup>(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let count = E::service(&state.services).count().await?;
    Ok(Json(json!({ "count": count })))
}

/// One page of entities in the `{total, skip, limit, data}` envelope.
pub async fn paginated<E: ServiceLookup>(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services)
        .paginate(params.skip, params.limit, params.detailed)
        .await?;
    Ok(Json(body))
}

/// Fetch one entity plus its linked-id lists.
pub async fn get<E: ServiceLookup>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services).get(id).await?;
    Ok(Json(body))
}

/// Create one entity, linking every submitted relation id.
pub async fn create<E: ServiceLookup>(
    State(state): State<AppState>,
    Json(data): Json<E::Create>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services).create(data).await?;
    Ok(Json(body))
}

/// Full update: scalar replace plus relation reconciliation.
pub async fn update<E: ServiceLookup>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<E::Create>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services).update(id, data).await?;
    Ok(Json(body))
}

/// Delete one entity, returning the deleted row.
pub async fn delete<E: ServiceLookup>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services).delete(id).await?;
    Ok(Json(body))
}

/// All-or-nothing bulk create.
pub async fn bulk_create<E: ServiceLookup>(
    State(state): State<AppState>,
    Json(items): Json<Vec<E::Create>>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services).bulk_create(items).await?;
    Ok(Json(body))
}

/// Best-effort bulk delete.
pub async fn bulk_delete<E: ServiceLookup>(
    State(state): State<AppState>,
    Json(ids): Json<Vec<i64>>,
) -> AppResult<Json<Value>> {
    let body = E::service(&state.services).bulk_delete(ids).await?;
    Ok(Json(body))
}
