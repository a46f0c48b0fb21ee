//! In-memory store with the same observable behaviour as PostgreSQL:
//! sequential ids from 1, identical orderings, and the same referential checks.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{dangling_author, AuthorStore, BookStore, CatalogStore};
use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorInput, AuthorOrder, Book, BookInput, BookOrder},
};

#[derive(Default)]
struct Tables {
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, Book>,
    last_author_id: i32,
    last_book_id: i32,
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorStore for MemoryRepository {
    async fn list_authors(&self, order: AuthorOrder) -> AppResult<Vec<Author>> {
        let tables = self.tables.read().await;
        let mut authors: Vec<Author> = tables.authors.values().cloned().collect();
        if order == AuthorOrder::Name {
            authors.sort_by(|a, b| {
                (a.last_name.is_none(), &a.last_name, &a.first_name, a.id).cmp(&(
                    b.last_name.is_none(),
                    &b.last_name,
                    &b.first_name,
                    b.id,
                ))
            });
        }
        Ok(authors)
    }

    async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.tables
            .read()
            .await
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn create_author(&self, data: &AuthorInput) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        tables.last_author_id += 1;
        let author = Author {
            id: tables.last_author_id,
            last_name: data.last_name.clone(),
            first_name: data.first_name.clone(),
            birth_year: data.birth_year,
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update_author(&self, id: i32, data: &AuthorInput) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let author = tables
            .authors
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
        author.last_name = data.last_name.clone();
        author.first_name = data.first_name.clone();
        author.birth_year = data.birth_year;
        Ok(author.clone())
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&id) {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        if tables.books.values().any(|b| b.author_id == id) {
            return Err(AppError::Conflict(format!("Author {} still has books", id)));
        }
        tables.authors.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryRepository {
    async fn list_books(&self, order: BookOrder) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        let mut books: Vec<Book> = tables.books.values().cloned().collect();
        if order == BookOrder::RatingDesc {
            books.sort_by_key(|b| (b.rating.is_none(), Reverse(b.rating), b.id));
        }
        Ok(books)
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.tables
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|b| b.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn create_book(&self, data: &BookInput) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&data.author_id) {
            return Err(dangling_author(data.author_id));
        }
        tables.last_book_id += 1;
        let book = Book {
            id: tables.last_book_id,
            title: data.title.clone(),
            pub_year: data.pub_year,
            isbn: data.isbn.clone(),
            rating: data.rating,
            notes: data.notes.clone(),
            author_id: data.author_id,
        };
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: i32, data: &BookInput) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        if !tables.authors.contains_key(&data.author_id) {
            return Err(dangling_author(data.author_id));
        }
        let book = Book {
            id,
            title: data.title.clone(),
            pub_year: data.pub_year,
            isbn: data.isbn.clone(),
            rating: data.rating,
            notes: data.notes.clone(),
            author_id: data.author_id,
        };
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.tables
            .write()
            .await
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }
}

#[async_trait]
impl CatalogStore for MemoryRepository {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(last: Option<&str>, first: &str) -> AuthorInput {
        AuthorInput {
            last_name: last.map(str::to_string),
            first_name: first.to_string(),
            birth_year: None,
        }
    }

    fn book(title: &str, rating: Option<i16>, author_id: i32) -> BookInput {
        BookInput {
            title: title.to_string(),
            pub_year: None,
            isbn: None,
            rating,
            notes: None,
            author_id,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_not_reused() {
        let repo = MemoryRepository::new();
        let first = repo.create_author(&author(None, "Homer")).await.unwrap();
        assert_eq!(first.id, 1);
        repo.delete_author(1).await.unwrap();
        let second = repo.create_author(&author(None, "Hesiod")).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_author_name_ordering() {
        let repo = MemoryRepository::new();
        repo.create_author(&author(Some("Woolf"), "Virginia")).await.unwrap();
        repo.create_author(&author(None, "Homer")).await.unwrap();
        repo.create_author(&author(Some("Austen"), "Jane")).await.unwrap();
        repo.create_author(&author(Some("Austen"), "Cassandra")).await.unwrap();

        let names: Vec<String> = repo
            .list_authors(AuthorOrder::Name)
            .await
            .unwrap()
            .iter()
            .map(Author::display_name)
            .collect();
        assert_eq!(names, vec!["Austen, Cassandra", "Austen, Jane", "Woolf, Virginia", "Homer"]);

        let ids: Vec<i32> = repo
            .list_authors(AuthorOrder::Id)
            .await
            .unwrap()
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_book_rating_ordering_puts_unrated_last() {
        let repo = MemoryRepository::new();
        repo.create_author(&author(None, "Anon")).await.unwrap();
        repo.create_book(&book("Unrated", None, 1)).await.unwrap();
        repo.create_book(&book("Good", Some(3), 1)).await.unwrap();
        repo.create_book(&book("Best", Some(5), 1)).await.unwrap();
        repo.create_book(&book("Also good", Some(3), 1)).await.unwrap();

        let titles: Vec<String> = repo
            .list_books(BookOrder::RatingDesc)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Best", "Good", "Also good", "Unrated"]);
    }

    #[tokio::test]
    async fn test_dangling_author_is_rejected() {
        let repo = MemoryRepository::new();
        let err = repo.create_book(&book("Orphan", None, 9)).await.unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.contains("author")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(repo.list_books(BookOrder::Id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_author_delete_is_restricted_by_books() {
        let repo = MemoryRepository::new();
        repo.create_author(&author(Some("Lovelace"), "Ada")).await.unwrap();
        repo.create_book(&book("Notes", None, 1)).await.unwrap();

        assert!(matches!(repo.delete_author(1).await, Err(AppError::Conflict(_))));
        repo.delete_book(1).await.unwrap();
        repo.delete_author(1).await.unwrap();
        assert!(matches!(repo.get_author(1).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_books_by_author() {
        let repo = MemoryRepository::new();
        repo.create_author(&author(None, "A")).await.unwrap();
        repo.create_author(&author(None, "B")).await.unwrap();
        repo.create_book(&book("a1", None, 1)).await.unwrap();
        repo.create_book(&book("b1", None, 2)).await.unwrap();
        repo.create_book(&book("a2", None, 1)).await.unwrap();

        let ids: Vec<i32> = repo
            .books_by_author(1)
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
