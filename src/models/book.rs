//! Book model and related types

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub pages: i64,
    pub stock: i64,
    pub price: f64,
    pub release: NaiveDate,
    pub time: NaiveTime,
}

/// Create/replace book request. Scalar fields plus the full target id set
/// for each relation; updates reconcile the join tables to these sets.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    pub title: String,
    #[validate(range(min = 11, message = "pages must be > 10"))]
    pub pages: i64,
    #[validate(range(min = 0, message = "stock must be non-negative"))]
    pub stock: i64,
    pub price: f64,
    pub release: NaiveDate,
    pub time: NaiveTime,
    pub authors: Vec<i64>,
    pub library: Vec<i64>,
}

/// Parameters for the decrease_stock method endpoint.
#[derive(Debug, Deserialize)]
pub struct DecreaseStockBody {
    pub params: DecreaseStockParams,
}

#[derive(Debug, Deserialize)]
pub struct DecreaseStockParams {
    pub qty: i64,
}
