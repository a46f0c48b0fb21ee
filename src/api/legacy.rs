//! Hand-written author endpoints
//!
//! The earlier JSON surface: plain ids for relations, PUT applies only the
//! fields present, and a missing author answers 404 with an empty body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    api::JsonBody,
    error::{AppError, AppResult},
    models::{AuthorInput, AuthorOrder},
    serializers::{author::{author_input, author_patch}, AuthorResource, Representation},
    AppState,
};

/// Empty 404 in place of the usual `{"detail": ...}` body
fn bare_not_found(result: AppResult<Response>) -> AppResult<Response> {
    match result {
        Err(AppError::NotFound(_)) => Ok(StatusCode::NOT_FOUND.into_response()),
        other => other,
    }
}

/// All authors with the ids of their books
#[utoipa::path(
    get,
    path = "/api/legacy/authors/",
    tag = "legacy",
    responses(
        (status = 200, description = "Authors by name", body = Vec<AuthorResource>)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<AuthorResource>>> {
    let repr = Representation::plain();
    let authors = state.services.catalog.list_authors(AuthorOrder::Name).await?;
    let books = state.services.catalog.book_ids_by_author().await?;

    Ok(Json(
        authors
            .iter()
            .map(|a| repr.author(a, books.get(&a.id).map(Vec::as_slice).unwrap_or_default()))
            .collect(),
    ))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/api/legacy/authors/",
    tag = "legacy",
    security(("bearer_auth" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = AuthorResource),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Missing add_author permission")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<AuthorResource>)> {
    let input = author_input(&body).map_err(AppError::Validation)?;
    let author = state.services.catalog.create_author(&input).await?;
    Ok((StatusCode::CREATED, Json(Representation::plain().author(&author, &[]))))
}

/// Get one author
#[utoipa::path(
    get,
    path = "/api/legacy/authors/{id}/",
    tag = "legacy",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author", body = AuthorResource),
        (status = 404, description = "No such author, empty body")
    )
)]
pub async fn get_author(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Response> {
    bare_not_found(async {
        let (author, books) = state.services.catalog.get_author_with_books(id).await?;
        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        Ok::<_, AppError>(Json(Representation::plain().author(&author, &ids)).into_response())
    }
    .await)
}

/// Update the fields present in the body
#[utoipa::path(
    put,
    path = "/api/legacy/authors/{id}/",
    tag = "legacy",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = AuthorResource),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Missing change_author permission"),
        (status = 404, description = "No such author, empty body")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody,
) -> AppResult<Response> {
    bare_not_found(async {
        state.services.catalog.get_author(id).await?;
        let patch = author_patch(&body, false).map_err(AppError::Validation)?;
        let author = state.services.catalog.update_author(id, &patch).await?;
        let (_, books) = state.services.catalog.get_author_with_books(author.id).await?;
        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        Ok::<_, AppError>(Json(Representation::plain().author(&author, &ids)).into_response())
    }
    .await)
}

/// Delete an author without books
#[utoipa::path(
    delete,
    path = "/api/legacy/authors/{id}/",
    tag = "legacy",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Missing delete_author permission"),
        (status = 404, description = "No such author, empty body"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn delete_author(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Response> {
    bare_not_found(async {
        state.services.catalog.delete_author(id).await?;
        Ok::<_, AppError>(StatusCode::NO_CONTENT.into_response())
    }
    .await)
}
