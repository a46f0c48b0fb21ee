//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, legacy, root};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.3.0",
        description = "Books and authors of the library catalog",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        // Resources
        root::api_root,
        authors::list,
        authors::create,
        authors::retrieve,
        authors::update,
        authors::partial_update,
        authors::destroy,
        books::list,
        books::create,
        books::retrieve,
        books::update,
        books::partial_update,
        books::destroy,
        // Hand-written author endpoints
        legacy::list_authors,
        legacy::create_author,
        legacy::get_author,
        legacy::update_author,
        legacy::delete_author,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::LoginResponse,
            root::ApiRoot,
            crate::serializers::Link,
            crate::serializers::AuthorResource,
            crate::serializers::BookResource,
            crate::models::AuthorInput,
            crate::models::BookInput,
            health::HealthResponse,
            crate::error::ErrorResponse,
            crate::error::NotFoundResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "api", description = "API root"),
        (name = "authors", description = "Author resources"),
        (name = "books", description = "Book resources"),
        (name = "legacy", description = "Hand-written author endpoints")
    )
)]
pub struct ApiDoc;

/// Declares the `bearer_auth` scheme referenced by secured operations
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
