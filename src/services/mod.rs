//! Business logic services

mod books;
pub mod entities;

pub use entities::EntityService;

use sqlx::SqlitePool;

use crate::models::{Author, Book, Library};
use crate::repository::Entity;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub pool: SqlitePool,
    pub books: EntityService<Book>,
    pub authors: EntityService<Author>,
    pub libraries: EntityService<Library>,
}

impl Services {
    /// Create all services with the given database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            books: EntityService::new(pool.clone()),
            authors: EntityService::new(pool.clone()),
            libraries: EntityService::new(pool.clone()),
            pool,
        }
    }
}

/// Lookup of the service instance for an entity type, used by the generic
/// API handlers.
pub trait ServiceLookup: Entity {
    fn service(services: &Services) -> &EntityService<Self>;
}

impl ServiceLookup for Book {
    fn service(services: &Services) -> &EntityService<Book> {
        &services.books
    }
}

impl ServiceLookup for Author {
    fn service(services: &Services) -> &EntityService<Author> {
        &services.authors
    }
}

impl ServiceLookup for Library {
    fn service(services: &Services) -> &EntityService<Library> {
        &services.libraries
    }
}
