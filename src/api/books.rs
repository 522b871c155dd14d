//! Book method endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{error::AppResult, models::book::DecreaseStockBody, AppState};

/// Execute the decrease_stock method on a Book instance.
pub async fn decrease_stock(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Json(body): Json<DecreaseStockBody>,
) -> AppResult<Json<Value>> {
    state
        .services
        .books
        .decrease_stock(book_id, body.params.qty)
        .await?;

    Ok(Json(json!({
        "book_id": book_id,
        "method": "decrease_stock",
        "status": "executed",
        "result": null,
        "output": null,
    })))
}
