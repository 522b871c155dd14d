//! Book entity descriptor.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqliteConnection;

use crate::{
    error::AppResult,
    models::{Author, Book, CreateBook, Library},
    repository::{
        associations::{BOOK_AUTHORS, BOOK_LIBRARIES},
        entity::{Entity, EntityPayload, RelationTarget},
    },
};

impl EntityPayload for CreateBook {
    fn relations(&self) -> Vec<RelationTarget<'_>> {
        vec![
            RelationTarget {
                assoc: &BOOK_AUTHORS,
                ids: &self.authors,
            },
            RelationTarget {
                assoc: &BOOK_LIBRARIES,
                ids: &self.library,
            },
        ]
    }
}

#[async_trait]
impl Entity for Book {
    const NAME: &'static str = "Book";
    const TABLE: &'static str = "books";
    const ASSOCIATIONS: &'static [&'static super::Association] =
        &[&BOOK_AUTHORS, &BOOK_LIBRARIES];

    type Create = CreateBook;

    fn id(&self) -> i64 {
        self.id
    }

    async fn insert(conn: &mut SqliteConnection, data: &CreateBook) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO books (title, pages, stock, price, "release", "time")
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(data.pages)
        .bind(data.stock)
        .bind(data.price)
        .bind(data.release)
        .bind(data.time)
        .fetch_one(&mut *conn)
        .await?;
        Ok(id)
    }

    async fn replace(conn: &mut SqliteConnection, id: i64, data: &CreateBook) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE books
            SET title = ?, pages = ?, stock = ?, price = ?, "release" = ?, "time" = ?
            WHERE id = ?
            "#,
        )
        .bind(&data.title)
        .bind(data.pages)
        .bind(data.stock)
        .bind(data.price)
        .bind(data.release)
        .bind(data.time)
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
        BOOK_AUTHORS.linked_json::<Author>(&mut *conn, id, out).await?;
        BOOK_LIBRARIES.linked_json::<Library>(&mut *conn, id, out).await?;
        Ok(())
    }
}
