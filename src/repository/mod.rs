//! Repository layer for database operations

pub mod associations;
mod author;
mod book;
pub mod entity;
mod library;

pub use associations::{Association, AUTHOR_BOOKS, BOOK_AUTHORS, BOOK_LIBRARIES, LIBRARY_BOOKS};
pub use entity::{Entity, EntityPayload, EntityRepository, RelationTarget};
