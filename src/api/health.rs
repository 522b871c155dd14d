//! System endpoints: root, health check and statistics

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::AppResult, AppState};

/// Root endpoint - API information
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Biblio API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// Health check endpoint for monitoring
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.services.pool)
        .await
    {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!("Health check database ping failed: {}", e);
            "unreachable"
        }
    };

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "database": database,
    }))
}

/// Per-entity row counts
pub async fn statistics(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let book_count = state.services.books.count().await?;
    let author_count = state.services.authors.count().await?;
    let library_count = state.services.libraries.count().await?;

    Ok(Json(json!({
        "book_count": book_count,
        "author_count": author_count,
        "library_count": library_count,
        "total_entities": book_count + author_count + library_count,
    })))
}
