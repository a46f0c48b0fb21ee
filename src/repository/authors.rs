//! Author queries on PostgreSQL

use async_trait::async_trait;

use super::{map_foreign_key, AuthorStore, PgRepository};
use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorInput, AuthorOrder},
};

#[async_trait]
impl AuthorStore for PgRepository {
    async fn list_authors(&self, order: AuthorOrder) -> AppResult<Vec<Author>> {
        let query = match order {
            AuthorOrder::Id => "SELECT id, last_name, first_name, birth_year FROM authors ORDER BY id",
            AuthorOrder::Name => {
                r#"
                SELECT id, last_name, first_name, birth_year FROM authors
                ORDER BY last_name ASC NULLS LAST, first_name ASC, id ASC
                "#
            }
        };
        let rows = sqlx::query_as::<_, Author>(query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_author(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "SELECT id, last_name, first_name, birth_year FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn create_author(&self, data: &AuthorInput) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (last_name, first_name, birth_year)
            VALUES ($1, $2, $3)
            RETURNING id, last_name, first_name, birth_year
            "#,
        )
        .bind(&data.last_name)
        .bind(&data.first_name)
        .bind(data.birth_year)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_author(&self, id: i32, data: &AuthorInput) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors SET last_name = $2, first_name = $3, birth_year = $4
            WHERE id = $1
            RETURNING id, last_name, first_name, birth_year
            "#,
        )
        .bind(id)
        .bind(&data.last_name)
        .bind(&data.first_name)
        .bind(data.birth_year)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_foreign_key(e, || {
                    AppError::Conflict(format!("Author {} still has books", id))
                })
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
