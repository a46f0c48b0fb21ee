//! HTTP surface of the catalog server
//!
//! The routing table lives here. Every mutation declares what it requires
//! ([`Requirement`]) next to its route, and [`authorize`] enforces it before
//! the handler runs. The caller is resolved once per request by
//! [`resolve_actor`] from a bearer token or the `catalog_token` cookie.

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;
pub mod legacy;
pub mod openapi;
pub mod pages;
pub mod root;
pub mod session;

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put, MethodRouter},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use serde_json::Value;

use crate::{
    error::{AppError, FieldErrors},
    models::{Actor, Permission},
    serializers::NON_FIELD_ERRORS,
    AppState,
};

/// Cookie carrying the signed token for the HTML surface
pub const TOKEN_COOKIE: &str = "catalog_token";

/// What a route demands of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Permission(Permission),
}

impl Requirement {
    pub fn check(&self, actor: &Actor) -> Result<(), AppError> {
        match self {
            Requirement::Authenticated => actor.require_authenticated(),
            Requirement::Permission(permission) => actor.require(*permission),
        }
    }
}

/// JSON request body; an unreadable one answers 400 with a field-error object
pub struct JsonBody(pub Value);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Validation(FieldErrors::single(
                NON_FIELD_ERRORS,
                format!("JSON parse error - {}", rejection.body_text()),
            ))),
        }
    }
}

/// Resolve the caller and store it in the request extensions
pub async fn resolve_actor(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    let token = bearer.or_else(|| {
        CookieJar::from_headers(request.headers())
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    });

    let actor = token
        .and_then(|token| state.services.auth.resolve(&token))
        .map(Actor::User)
        .unwrap_or(Actor::Anonymous);

    request.extensions_mut().insert(actor);
    next.run(request).await
}

/// Reject the request unless the resolved caller meets `requirement`
pub async fn authorize(
    State(requirement): State<Requirement>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = request
        .extensions()
        .get::<Actor>()
        .cloned()
        .unwrap_or(Actor::Anonymous);

    if let Err(e) = requirement.check(&actor) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            user = actor.username().unwrap_or("anonymous"),
            "Request rejected: {}",
            e
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Attach `requirement` to the methods registered so far on `route`
fn gated(route: MethodRouter<AppState>, requirement: Requirement) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(requirement, authorize))
}

/// Full application router: pages, JSON endpoints, documentation
pub fn router(state: AppState) -> Router {
    use Permission::*;
    use Requirement::{Authenticated, Permission as Perm};

    let pages = Router::new()
        .route("/", get(pages::index))
        .route("/books/", get(pages::book_list))
        .route("/books/", gated(post(pages::book_create), Perm(AddBook)))
        .route("/books/:id", get(pages::book_detail))
        .route("/books/:id", gated(delete(pages::book_delete), Perm(DeleteBook)))
        .route("/authors/", get(pages::author_list))
        .route("/authors/", gated(post(pages::author_create), Perm(AddAuthor)))
        .route("/authors/:id", get(pages::author_detail))
        .layer(middleware::from_fn(session::ensure_session));

    let legacy = Router::new()
        .route("/api/legacy/authors/", get(legacy::list_authors))
        .route("/api/legacy/authors/", gated(post(legacy::create_author), Perm(AddAuthor)))
        .route("/api/legacy/authors/:id/", get(legacy::get_author))
        .route("/api/legacy/authors/:id/", gated(put(legacy::update_author), Perm(ChangeAuthor)))
        .route("/api/legacy/authors/:id/", gated(delete(legacy::delete_author), Perm(DeleteAuthor)));

    let viewsets = Router::new()
        .route("/api/", get(root::api_root))
        .route("/api/authors/", get(authors::list))
        .route("/api/authors/", gated(post(authors::create), Authenticated))
        .route("/api/authors/:id/", get(authors::retrieve))
        .route(
            "/api/authors/:id/",
            gated(
                put(authors::update)
                    .patch(authors::partial_update)
                    .delete(authors::destroy),
                Authenticated,
            ),
        )
        .route("/api/books/", get(books::list))
        .route("/api/books/", gated(post(books::create), Authenticated))
        .route("/api/books/:id/", get(books::retrieve))
        .route(
            "/api/books/:id/",
            gated(
                put(books::update)
                    .patch(books::partial_update)
                    .delete(books::destroy),
                Authenticated,
            ),
        );

    let operational = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(pages)
        .merge(legacy)
        .merge(viewsets)
        .merge(operational)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_actor))
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
