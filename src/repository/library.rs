//! Library entity descriptor.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqliteConnection;

use crate::{
    error::AppResult,
    models::{Book, CreateLibrary, Library},
    repository::{
        associations::LIBRARY_BOOKS,
        entity::{Entity, EntityPayload, RelationTarget},
    },
};

impl EntityPayload for CreateLibrary {
    fn relations(&self) -> Vec<RelationTarget<'_>> {
        vec![RelationTarget {
            assoc: &LIBRARY_BOOKS,
            ids: &self.books,
        }]
    }
}

#[async_trait]
impl Entity for Library {
    const NAME: &'static str = "Library";
    const TABLE: &'static str = "libraries";
    const ASSOCIATIONS: &'static [&'static super::Association] = &[&LIBRARY_BOOKS];

    type Create = CreateLibrary;

    fn id(&self) -> i64 {
        self.id
    }

    async fn insert(conn: &mut SqliteConnection, data: &CreateLibrary) -> AppResult<i64> {
        let id =
            sqlx::query_scalar::<_, i64>("INSERT INTO libraries (name) VALUES (?) RETURNING id")
                .bind(&data.name)
                .fetch_one(&mut *conn)
                .await?;
        Ok(id)
    }

    async fn replace(conn: &mut SqliteConnection, id: i64, data: &CreateLibrary) -> AppResult<()> {
        sqlx::query("UPDATE libraries SET name = ? WHERE id = ?")
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
        LIBRARY_BOOKS.linked_json::<Book>(&mut *conn, id, out).await
    }
}
