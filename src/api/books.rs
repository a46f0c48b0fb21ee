//! Book resource endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    api::JsonBody,
    error::{AppError, AppResult},
    models::{BookInput, BookOrder},
    serializers::{
        book::{book_input, book_patch},
        BookResource,
    },
    AppState,
};

/// List books, best rated first
#[utoipa::path(
    get,
    path = "/api/books/",
    tag = "books",
    responses(
        (status = 200, description = "Books by rating, unrated last", body = Vec<BookResource>)
    )
)]
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<BookResource>>> {
    let books = state.services.catalog.list_books(BookOrder::RatingDesc).await?;
    Ok(Json(books.iter().map(|b| state.representation.book(b)).collect()))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/books/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = BookResource),
        (status = 400, description = "Field errors, including an unknown author"),
        (status = 403, description = "Not authenticated")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<BookResource>)> {
    let input = book_input(&body).map_err(AppError::Validation)?;
    let book = state.services.catalog.create_book(&input).await?;
    Ok((StatusCode::CREATED, Json(state.representation.book(&book))))
}

/// Get a book
#[utoipa::path(
    get,
    path = "/api/books/{id}/",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = BookResource),
        (status = 404, description = "Book not found", body = crate::error::NotFoundResponse)
    )
)]
pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<BookResource>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(state.representation.book(&book)))
}

/// Replace a book. With plain relations, absent fields are kept.
#[utoipa::path(
    put,
    path = "/api/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = BookResource),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Book not found", body = crate::error::NotFoundResponse)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<BookResource>> {
    let complete = state.representation.put_requires_complete();
    save(&state, id, &body, complete).await
}

/// Update the fields present in the body
#[utoipa::path(
    patch,
    path = "/api/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = BookResource),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Book not found", body = crate::error::NotFoundResponse)
    )
)]
pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<BookResource>> {
    save(&state, id, &body, false).await
}

async fn save(state: &AppState, id: i32, body: &Value, complete: bool) -> AppResult<Json<BookResource>> {
    state.services.catalog.get_book(id).await?;
    let patch = book_patch(body, complete).map_err(AppError::Validation)?;
    let book = state.services.catalog.update_book(id, &patch).await?;
    Ok(Json(state.representation.book(&book)))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books/{id}/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Book not found", body = crate::error::NotFoundResponse)
    )
)]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
