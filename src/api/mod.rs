//! API handlers for Biblio REST endpoints

pub mod books;
pub mod entities;
pub mod health;
pub mod relationships;

use serde::Deserialize;

/// Query parameters for list endpoints.
#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub detailed: bool,
}

/// Query parameters for paginated endpoints.
#[derive(Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub detailed: bool,
}

fn default_limit() -> i64 {
    100
}
