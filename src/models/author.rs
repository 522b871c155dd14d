//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

/// Create/replace author request.
///
/// An author must reference at least one book at creation time; the rule is
/// enforced in the create flow, not here, so updates may reconcile the set
/// down to empty.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthor {
    pub name: String,
    pub books: Vec<i64>,
}
