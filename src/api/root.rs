//! API root

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

/// Collection URLs served by the resource router
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiRoot {
    pub authors: String,
    pub books: String,
}

/// Entry point listing the resource collections
#[utoipa::path(
    get,
    path = "/api/",
    tag = "api",
    responses(
        (status = 200, description = "Collection URLs", body = ApiRoot)
    )
)]
pub async fn api_root(State(state): State<AppState>) -> Json<ApiRoot> {
    Json(ApiRoot {
        authors: state.representation.collection_url("authors"),
        books: state.representation.collection_url("books"),
    })
}
