//! Catalog management service

use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorInput, AuthorOrder, AuthorPatch, Book, BookInput, BookOrder, BookPatch,
    },
    repository::{AuthorStore, BookStore, CatalogStore, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Storage connectivity check
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, order: AuthorOrder) -> AppResult<Vec<Author>> {
        self.repository.list_authors(order).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.get_author(id).await
    }

    /// Author together with every book that references it
    pub async fn get_author_with_books(&self, id: i32) -> AppResult<(Author, Vec<Book>)> {
        let author = self.repository.get_author(id).await?;
        let books = self.repository.books_by_author(id).await?;
        Ok((author, books))
    }

    pub async fn create_author(&self, data: &AuthorInput) -> AppResult<Author> {
        data.check().map_err(AppError::Validation)?;
        let author = self.repository.create_author(data).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    /// Apply the fields present in `patch`; absent fields keep their stored value
    pub async fn update_author(&self, id: i32, patch: &AuthorPatch) -> AppResult<Author> {
        let current = self.repository.get_author(id).await?;
        let merged = patch.apply_to(&current);
        merged.check().map_err(AppError::Validation)?;
        let author = self.repository.update_author(id, &merged).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    /// Authors that still have books cannot be deleted
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.get_author(id).await?;
        let books = self.repository.books_by_author(id).await?;
        if !books.is_empty() {
            return Err(AppError::Conflict(format!(
                "Author {} still has {} book(s); delete or reassign them first",
                id,
                books.len()
            )));
        }
        self.repository.delete_author(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, order: BookOrder) -> AppResult<Vec<Book>> {
        self.repository.list_books(order).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.get_book(id).await
    }

    /// Book ids grouped by author id, each group in id order
    pub async fn book_ids_by_author(&self) -> AppResult<HashMap<i32, Vec<i32>>> {
        let books = self.repository.list_books(BookOrder::Id).await?;
        let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
        for book in books {
            grouped.entry(book.author_id).or_default().push(book.id);
        }
        Ok(grouped)
    }

    pub async fn create_book(&self, data: &BookInput) -> AppResult<Book> {
        data.check().map_err(AppError::Validation)?;
        let book = self.repository.create_book(data).await?;
        tracing::info!(book_id = book.id, author_id = book.author_id, "Book created");
        Ok(book)
    }

    /// Apply the fields present in `patch`; absent fields keep their stored value
    pub async fn update_book(&self, id: i32, patch: &BookPatch) -> AppResult<Book> {
        let current = self.repository.get_book(id).await?;
        let merged = patch.apply_to(&current);
        merged.check().map_err(AppError::Validation)?;
        let book = self.repository.update_book(id, &merged).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.delete_book(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;

    use super::*;
    use crate::repository::MockStore;

    fn lovelace() -> Author {
        Author {
            id: 1,
            last_name: Some("Lovelace".to_string()),
            first_name: "Ada".to_string(),
            birth_year: Some(1815),
        }
    }

    fn notes() -> Book {
        Book {
            id: 1,
            title: "Notes".to_string(),
            pub_year: Some(1843),
            isbn: None,
            rating: None,
            notes: None,
            author_id: 1,
        }
    }

    #[tokio::test]
    async fn test_delete_author_with_books_is_refused() {
        let mut store = MockStore::new();
        store
            .expect_get_author()
            .with(eq(1))
            .returning(|_| Ok(lovelace()));
        store
            .expect_books_by_author()
            .with(eq(1))
            .returning(|_| Ok(vec![notes()]));
        store.expect_delete_author().never();

        let service = CatalogService::new(Arc::new(store));
        let result = service.delete_author(1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_author_writes_merged_record() {
        let mut store = MockStore::new();
        store.expect_get_author().returning(|_| Ok(lovelace()));
        store
            .expect_update_author()
            .withf(|id, data| {
                *id == 1
                    && data.first_name == "Ada"
                    && data.last_name.as_deref() == Some("Lovelace")
                    && data.birth_year == Some(1816)
            })
            .times(1)
            .returning(|id, data| {
                Ok(Author {
                    id,
                    last_name: data.last_name.clone(),
                    first_name: data.first_name.clone(),
                    birth_year: data.birth_year,
                })
            });

        let service = CatalogService::new(Arc::new(store));
        let patch = AuthorPatch {
            birth_year: Some(Some(1816)),
            ..Default::default()
        };
        let updated = tokio_test::assert_ok!(service.update_author(1, &patch).await);
        assert_eq!(updated.birth_year, Some(1816));
    }

    #[tokio::test]
    async fn test_invalid_create_never_reaches_storage() {
        let mut store = MockStore::new();
        store.expect_create_book().never();

        let service = CatalogService::new(Arc::new(store));
        let input = BookInput {
            title: String::new(),
            pub_year: None,
            isbn: None,
            rating: None,
            notes: None,
            author_id: 1,
        };
        let result = service.create_book(&input).await;
        assert!(matches!(result, Err(AppError::Validation(ref f)) if f.contains("title")));
    }

    #[tokio::test]
    async fn test_book_ids_grouped_by_author() {
        let mut store = MockStore::new();
        store
            .expect_list_books()
            .with(eq(BookOrder::Id))
            .returning(|_| {
                let mut second = notes();
                second.id = 2;
                second.author_id = 7;
                let mut third = notes();
                third.id = 3;
                Ok(vec![notes(), second, third])
            });

        let service = CatalogService::new(Arc::new(store));
        let grouped = service.book_ids_by_author().await.unwrap();
        assert_eq!(grouped[&1], vec![1, 3]);
        assert_eq!(grouped[&7], vec![2]);
    }
}
