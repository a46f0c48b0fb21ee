//! Book queries on PostgreSQL

use async_trait::async_trait;

use super::{dangling_author, map_foreign_key, BookStore, PgRepository};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput, BookOrder},
};

const BOOK_COLUMNS: &str = "id, title, pub_year, isbn, rating, notes, author_id";

#[async_trait]
impl BookStore for PgRepository {
    async fn list_books(&self, order: BookOrder) -> AppResult<Vec<Book>> {
        let order_by = match order {
            BookOrder::Id => "id",
            BookOrder::RatingDesc => "rating DESC NULLS LAST, id ASC",
        };
        let query = format!("SELECT {} FROM books ORDER BY {}", BOOK_COLUMNS, order_by);
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let query = format!(
            "SELECT {} FROM books WHERE author_id = $1 ORDER BY id",
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_book(&self, data: &BookInput) -> AppResult<Book> {
        let query = format!(
            r#"
            INSERT INTO books (title, pub_year, isbn, rating, notes, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&query)
            .bind(&data.title)
            .bind(data.pub_year)
            .bind(&data.isbn)
            .bind(data.rating)
            .bind(&data.notes)
            .bind(data.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_foreign_key(e, || dangling_author(data.author_id)))?;
        Ok(row)
    }

    async fn update_book(&self, id: i32, data: &BookInput) -> AppResult<Book> {
        let query = format!(
            r#"
            UPDATE books
            SET title = $2, pub_year = $3, isbn = $4, rating = $5, notes = $6, author_id = $7
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(&data.title)
            .bind(data.pub_year)
            .bind(&data.isbn)
            .bind(data.rating)
            .bind(&data.notes)
            .bind(data.author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_foreign_key(e, || dangling_author(data.author_id)))?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
