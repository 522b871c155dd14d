//! Many-to-many association bookkeeping.
//!
//! One `Association` descriptor per (join table, owner column, other column)
//! configuration; the two join tables in the schema yield four descriptors,
//! one per side. All link logic — delta reconciliation, single link
//! add/remove, listings — lives here and is shared by every entity.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use sqlx::SqliteConnection;

use crate::{
    error::{AppError, AppResult},
    repository::entity::Entity,
};

/// Descriptor for one side of a many-to-many association.
///
/// Column and key names are fixed at compile time; the SQL below is built
/// from these constants only, never from request input.
pub struct Association {
    /// Join table name.
    pub table: &'static str,
    /// Foreign-key column of the owning side.
    pub owner_column: &'static str,
    /// Foreign-key column of the other side.
    pub other_column: &'static str,
    /// Entity table of the owning side.
    pub owner_table: &'static str,
    /// Entity table of the other side.
    pub other_table: &'static str,
    /// Display name of the owning entity ("Book").
    pub owner_name: &'static str,
    /// Display name of the other entity ("Author").
    pub other_name: &'static str,
    /// JSON key for the owner id in relation listings ("book_id").
    pub owner_key: &'static str,
    /// Relation field name in payloads and detailed listings ("authors").
    pub field: &'static str,
    /// JSON key for the linked-id list in entity envelopes ("author_ids").
    pub ids_field: &'static str,
}

/// Book -> Author side of `book_authors`.
pub static BOOK_AUTHORS: Association = Association {
    table: "book_authors",
    owner_column: "book_id",
    other_column: "author_id",
    owner_table: "books",
    other_table: "authors",
    owner_name: "Book",
    other_name: "Author",
    owner_key: "book_id",
    field: "authors",
    ids_field: "author_ids",
};

/// Author -> Book side of `book_authors`.
pub static AUTHOR_BOOKS: Association = Association {
    table: "book_authors",
    owner_column: "author_id",
    other_column: "book_id",
    owner_table: "authors",
    other_table: "books",
    owner_name: "Author",
    other_name: "Book",
    owner_key: "author_id",
    field: "books",
    ids_field: "book_ids",
};

/// Book -> Library side of `book_libraries`.
pub static BOOK_LIBRARIES: Association = Association {
    table: "book_libraries",
    owner_column: "book_id",
    other_column: "library_id",
    owner_table: "books",
    other_table: "libraries",
    owner_name: "Book",
    other_name: "Library",
    owner_key: "book_id",
    field: "library",
    ids_field: "library_ids",
};

/// Library -> Book side of `book_libraries`.
pub static LIBRARY_BOOKS: Association = Association {
    table: "book_libraries",
    owner_column: "library_id",
    other_column: "book_id",
    owner_table: "libraries",
    other_table: "books",
    owner_name: "Library",
    other_name: "Book",
    owner_key: "library_id",
    field: "books",
    ids_field: "book_ids",
};

impl Association {
    /// All ids currently linked to the owner, ascending.
    pub async fn linked_ids(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
    ) -> AppResult<Vec<i64>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY {}",
            self.other_column, self.table, self.owner_column, self.other_column
        );
        let ids = sqlx::query_scalar::<_, i64>(&sql)
            .bind(owner_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(ids)
    }

    /// Whether the (owner, other) pair exists in the join table.
    pub async fn contains(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
        other_id: i64,
    ) -> AppResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ? AND {} = ?)",
            self.table, self.owner_column, self.other_column
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(owner_id)
            .bind(other_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }

    /// Whether the owning entity row exists.
    pub async fn owner_exists(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
    ) -> AppResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", self.owner_table);
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(owner_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }

    /// Whether the entity row on the other side exists.
    pub async fn other_exists(
        &self,
        conn: &mut SqliteConnection,
        other_id: i64,
    ) -> AppResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", self.other_table);
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(other_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }

    /// Fails with NotFound naming the missing id unless the referenced
    /// entity exists on the other side.
    pub async fn ensure_other_exists(
        &self,
        conn: &mut SqliteConnection,
        other_id: i64,
    ) -> AppResult<()> {
        if self.other_exists(&mut *conn, other_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "{} with ID {} not found",
                self.other_name, other_id
            )))
        }
    }

    /// Insert one join row. The composite primary key rejects duplicates;
    /// that surfaces as a Conflict via the sqlx error mapping.
    pub async fn insert_pair(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
        other_id: i64,
    ) -> AppResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES (?, ?)",
            self.table, self.owner_column, self.other_column
        );
        sqlx::query(&sql)
            .bind(owner_id)
            .bind(other_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Delete one join row, reporting whether it existed.
    pub async fn delete_pair(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
        other_id: i64,
    ) -> AppResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ? AND {} = ?",
            self.table, self.owner_column, self.other_column
        );
        let result = sqlx::query(&sql)
            .bind(owner_id)
            .bind(other_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every join row owned by `owner_id` (entity deletion cascade).
    pub async fn unlink_all(&self, conn: &mut SqliteConnection, owner_id: i64) -> AppResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", self.table, self.owner_column);
        sqlx::query(&sql).bind(owner_id).execute(&mut *conn).await?;
        Ok(())
    }

    /// Reconcile the owner's linked set to `target_ids`: compute the
    /// add/remove delta against the current join rows and apply it.
    /// Existing links in the target set are left untouched.
    ///
    /// Every id to be added is validated up front, so a missing referent
    /// aborts before any row is touched. The caller owns the transaction;
    /// nothing here commits.
    pub async fn reconcile(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
        target_ids: &[i64],
    ) -> AppResult<()> {
        let existing: BTreeSet<i64> = self.linked_ids(&mut *conn, owner_id).await?.into_iter().collect();
        let target: BTreeSet<i64> = target_ids.iter().copied().collect();

        let to_add: Vec<i64> = target.difference(&existing).copied().collect();
        for &id in &to_add {
            self.ensure_other_exists(&mut *conn, id).await?;
        }

        for &id in existing.difference(&target) {
            self.delete_pair(&mut *conn, owner_id, id).await?;
        }
        for &id in &to_add {
            self.insert_pair(&mut *conn, owner_id, id).await?;
        }

        Ok(())
    }

    /// Full entities linked to the owner, for detailed listings.
    pub async fn linked_entities<O: Entity>(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
    ) -> AppResult<Vec<O>> {
        let sql = format!(
            "SELECT o.* FROM {} o JOIN {} j ON j.{} = o.id WHERE j.{} = ? ORDER BY o.id",
            O::TABLE,
            self.table,
            self.other_column,
            self.owner_column
        );
        let entities = sqlx::query_as::<_, O>(&sql)
            .bind(owner_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(entities)
    }

    /// Linked entities serialized under the relation field name, used by
    /// detailed listings.
    pub async fn linked_json<O: Entity>(
        &self,
        conn: &mut SqliteConnection,
        owner_id: i64,
        out: &mut Map<String, Value>,
    ) -> AppResult<()> {
        let entities = self.linked_entities::<O>(&mut *conn, owner_id).await?;
        out.insert(self.field.to_string(), serde_json::to_value(entities)?);
        Ok(())
    }
}
