//! Author resource endpoints
//!
//! Relations are rendered in the configured style. Reads are open; every
//! write needs an authenticated caller (declared in the routing table).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    api::JsonBody,
    error::{AppError, AppResult},
    models::{Author, AuthorInput, AuthorOrder},
    serializers::{
        author::{author_input, author_patch},
        AuthorResource,
    },
    AppState,
};

/// Representation of `author` with the books currently referencing it
async fn represent(state: &AppState, author: &Author) -> AppResult<AuthorResource> {
    let books = state.services.catalog.get_author_with_books(author.id).await?.1;
    let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
    Ok(state.representation.author(author, &ids))
}

/// List authors by name
#[utoipa::path(
    get,
    path = "/api/authors/",
    tag = "authors",
    responses(
        (status = 200, description = "Authors by last name, then first name", body = Vec<AuthorResource>)
    )
)]
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<AuthorResource>>> {
    let authors = state.services.catalog.list_authors(AuthorOrder::Name).await?;
    let books = state.services.catalog.book_ids_by_author().await?;

    Ok(Json(
        authors
            .iter()
            .map(|a| {
                state
                    .representation
                    .author(a, books.get(&a.id).map(Vec::as_slice).unwrap_or_default())
            })
            .collect(),
    ))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/api/authors/",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = AuthorResource),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Not authenticated")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<AuthorResource>)> {
    let input = author_input(&body).map_err(AppError::Validation)?;
    let author = state.services.catalog.create_author(&input).await?;
    Ok((StatusCode::CREATED, Json(state.representation.author(&author, &[]))))
}

/// Get an author and their books
#[utoipa::path(
    get,
    path = "/api/authors/{id}/",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author", body = AuthorResource),
        (status = 404, description = "Author not found", body = crate::error::NotFoundResponse)
    )
)]
pub async fn retrieve(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<AuthorResource>> {
    let (author, books) = state.services.catalog.get_author_with_books(id).await?;
    let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
    Ok(Json(state.representation.author(&author, &ids)))
}

/// Replace an author. With plain relations, absent fields are kept.
#[utoipa::path(
    put,
    path = "/api/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = AuthorResource),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Author not found", body = crate::error::NotFoundResponse)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<AuthorResource>> {
    let complete = state.representation.put_requires_complete();
    save(&state, id, &body, complete).await
}

/// Update the fields present in the body
#[utoipa::path(
    patch,
    path = "/api/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = AuthorResource),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Author not found", body = crate::error::NotFoundResponse)
    )
)]
pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<AuthorResource>> {
    save(&state, id, &body, false).await
}

async fn save(state: &AppState, id: i32, body: &Value, complete: bool) -> AppResult<Json<AuthorResource>> {
    // 404 wins over field errors
    state.services.catalog.get_author(id).await?;
    let patch = author_patch(body, complete).map_err(AppError::Validation)?;
    let author = state.services.catalog.update_author(id, &patch).await?;
    Ok(Json(represent(state, &author).await?))
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/api/authors/{id}/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Author not found", body = crate::error::NotFoundResponse),
        (status = 409, description = "Author still has books", body = crate::error::ErrorResponse)
    )
)]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
