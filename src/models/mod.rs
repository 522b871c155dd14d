//! Data models for Biblio

pub mod author;
pub mod book;
pub mod library;

// Re-export commonly used types
pub use author::{Author, CreateAuthor};
pub use book::{Book, CreateBook};
pub use library::{CreateLibrary, Library};
