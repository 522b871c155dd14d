//! Relationship endpoints: single link add/remove and related-entity
//! listings. Thin wrappers binding each concrete route to its association
//! descriptor; the logic is shared in the entity service.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::{
    error::AppResult,
    models::{Author, Book, Library},
    repository::{AUTHOR_BOOKS, BOOK_AUTHORS, BOOK_LIBRARIES, LIBRARY_BOOKS},
    AppState,
};

// --- Book -> Author ---

pub async fn add_author_to_book(
    State(state): State<AppState>,
    Path((book_id, author_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .books
        .add_link(&BOOK_AUTHORS, book_id, author_id)
        .await?;
    Ok(Json(body))
}

pub async fn remove_author_from_book(
    State(state): State<AppState>,
    Path((book_id, author_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .books
        .remove_link(&BOOK_AUTHORS, book_id, author_id)
        .await?;
    Ok(Json(body))
}

pub async fn get_authors_of_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .books
        .list_linked::<Author>(&BOOK_AUTHORS, book_id)
        .await?;
    Ok(Json(body))
}

// --- Book -> Library ---

pub async fn add_library_to_book(
    State(state): State<AppState>,
    Path((book_id, library_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .books
        .add_link(&BOOK_LIBRARIES, book_id, library_id)
        .await?;
    Ok(Json(body))
}

pub async fn remove_library_from_book(
    State(state): State<AppState>,
    Path((book_id, library_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .books
        .remove_link(&BOOK_LIBRARIES, book_id, library_id)
        .await?;
    Ok(Json(body))
}

pub async fn get_libraries_of_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .books
        .list_linked::<Library>(&BOOK_LIBRARIES, book_id)
        .await?;
    Ok(Json(body))
}

// --- Author -> Book ---

pub async fn add_book_to_author(
    State(state): State<AppState>,
    Path((author_id, book_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .authors
        .add_link(&AUTHOR_BOOKS, author_id, book_id)
        .await?;
    Ok(Json(body))
}

pub async fn remove_book_from_author(
    State(state): State<AppState>,
    Path((author_id, book_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .authors
        .remove_link(&AUTHOR_BOOKS, author_id, book_id)
        .await?;
    Ok(Json(body))
}

pub async fn get_books_of_author(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .authors
        .list_linked::<Book>(&AUTHOR_BOOKS, author_id)
        .await?;
    Ok(Json(body))
}

// --- Library -> Book ---

pub async fn add_book_to_library(
    State(state): State<AppState>,
    Path((library_id, book_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .libraries
        .add_link(&LIBRARY_BOOKS, library_id, book_id)
        .await?;
    Ok(Json(body))
}

pub async fn remove_book_from_library(
    State(state): State<AppState>,
    Path((library_id, book_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .libraries
        .remove_link(&LIBRARY_BOOKS, library_id, book_id)
        .await?;
    Ok(Json(body))
}

pub async fn get_books_of_library(
    State(state): State<AppState>,
    Path(library_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let body = state
        .services
        .libraries
        .list_linked::<Book>(&LIBRARY_BOOKS, library_id)
        .await?;
    Ok(Json(body))
}
