//! Author entity descriptor.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqliteConnection;

use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, CreateAuthor},
    repository::{
        associations::AUTHOR_BOOKS,
        entity::{Entity, EntityPayload, RelationTarget},
    },
};

impl EntityPayload for CreateAuthor {
    fn relations(&self) -> Vec<RelationTarget<'_>> {
        vec![RelationTarget {
            assoc: &AUTHOR_BOOKS,
            ids: &self.books,
        }]
    }

    // New authors need at least one book; replacing an existing author may
    // reconcile the set down to empty.
    fn validate_create(&self) -> AppResult<()> {
        self.validate_payload()?;
        if self.books.is_empty() {
            return Err(AppError::Validation("At least 1 Book required".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Entity for Author {
    const NAME: &'static str = "Author";
    const TABLE: &'static str = "authors";
    const ASSOCIATIONS: &'static [&'static super::Association] = &[&AUTHOR_BOOKS];

    type Create = CreateAuthor;

    fn id(&self) -> i64 {
        self.id
    }

    async fn insert(conn: &mut SqliteConnection, data: &CreateAuthor) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>("INSERT INTO authors (name) VALUES (?) RETURNING id")
            .bind(&data.name)
            .fetch_one(&mut *conn)
            .await?;
        Ok(id)
    }

    async fn replace(conn: &mut SqliteConnection, id: i64, data: &CreateAuthor) -> AppResult<()> {
        sqlx::query("UPDATE authors SET name = ? WHERE id = ?")
            .bind(&data.name)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn related_detailed(
        conn: &mut SqliteConnection,
        id: i64,
        out: &mut Map<String, Value>,
    ) -> AppResult<()> {
        AUTHOR_BOOKS.linked_json::<Book>(&mut *conn, id, out).await
    }
}
