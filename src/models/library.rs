//! Library model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full library model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Library {
    pub id: i64,
    pub name: String,
}

/// Create/replace library request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLibrary {
    pub name: String,
    pub books: Vec<i64>,
}
