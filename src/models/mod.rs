//! Data models for the catalog

pub mod author;
pub mod book;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorInput, AuthorOrder, AuthorPatch};
pub use book::{Book, BookInput, BookOrder, BookPatch};
pub use user::{Actor, Permission, UserClaims};
