//! Repository layer for catalog persistence
//!
//! Entities stay plain records; everything that touches storage goes through
//! [`AuthorStore`] and [`BookStore`]. Two implementations exist: [`PgRepository`]
//! over PostgreSQL and [`memory::MemoryRepository`] for tests and throwaway runs.

pub mod authors;
pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{Author, AuthorInput, AuthorOrder, Book, BookInput, BookOrder},
};

/// Shared handle on the configured store
pub type Repository = Arc<dyn CatalogStore>;

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn list_authors(&self, order: AuthorOrder) -> AppResult<Vec<Author>>;

    /// `NotFound` when no author has this id
    async fn get_author(&self, id: i32) -> AppResult<Author>;

    async fn create_author(&self, data: &AuthorInput) -> AppResult<Author>;

    /// Overwrite every column of an existing author
    async fn update_author(&self, id: i32, data: &AuthorInput) -> AppResult<Author>;

    /// Fails with `Conflict` while books still reference the author
    async fn delete_author(&self, id: i32) -> AppResult<()>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list_books(&self, order: BookOrder) -> AppResult<Vec<Book>>;

    /// `NotFound` when no book has this id
    async fn get_book(&self, id: i32) -> AppResult<Book>;

    /// Books whose author reference equals `author_id`, by id
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;

    /// Rejects a dangling author reference as a field error on `author`
    async fn create_book(&self, data: &BookInput) -> AppResult<Book>;

    async fn update_book(&self, id: i32, data: &BookInput) -> AppResult<Book>;

    async fn delete_book(&self, id: i32) -> AppResult<()>;
}

/// Full storage interface used by the services
#[async_trait]
pub trait CatalogStore: AuthorStore + BookStore {
    /// Connectivity check for readiness probes
    async fn ping(&self) -> AppResult<()>;
}

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgRepository {
    pub pool: Pool<Postgres>,
}

impl PgRepository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Message for a relation that points at nothing
pub fn missing_author_message(author_id: i32) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", author_id)
}

/// Translate a foreign key violation into the caller-facing error, leaving
/// every other database error untouched.
fn map_foreign_key(error: sqlx::Error, on_violation: impl FnOnce() -> AppError) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            on_violation()
        }
        _ => AppError::Database(error),
    }
}

fn dangling_author(author_id: i32) -> AppError {
    AppError::Validation(FieldErrors::single("author", missing_author_message(author_id)))
}

#[cfg(test)]
mockall::mock! {
    pub Store {}

    #[async_trait]
    impl AuthorStore for Store {
        async fn list_authors(&self, order: AuthorOrder) -> AppResult<Vec<Author>>;
        async fn get_author(&self, id: i32) -> AppResult<Author>;
        async fn create_author(&self, data: &AuthorInput) -> AppResult<Author>;
        async fn update_author(&self, id: i32, data: &AuthorInput) -> AppResult<Author>;
        async fn delete_author(&self, id: i32) -> AppResult<()>;
    }

    #[async_trait]
    impl BookStore for Store {
        async fn list_books(&self, order: BookOrder) -> AppResult<Vec<Book>>;
        async fn get_book(&self, id: i32) -> AppResult<Book>;
        async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
        async fn create_book(&self, data: &BookInput) -> AppResult<Book>;
        async fn update_book(&self, id: i32, data: &BookInput) -> AppResult<Book>;
        async fn delete_book(&self, id: i32) -> AppResult<()>;
    }

    #[async_trait]
    impl CatalogStore for Store {
        async fn ping(&self) -> AppResult<()>;
    }
}
