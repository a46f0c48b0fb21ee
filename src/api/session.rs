//! Browser session identity for the HTML pages
//!
//! Each browser gets a random `catalog_session` cookie the first time it
//! reaches a page. The id only keys the one-time notice slot; it carries no
//! credentials.

use axum::{
    extract::Request,
    http::{header::SET_COOKIE, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "catalog_session";

/// Session id of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session(pub String);

impl Session {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Make sure the request has a session, issuing a cookie when it is new
pub async fn ensure_session(mut request: Request, next: Next) -> Response {
    let existing = CookieJar::from_headers(request.headers())
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| Uuid::parse_str(value).is_ok());

    let (session, issued) = match existing {
        Some(id) => (Session(id), false),
        None => (Session(Uuid::new_v4().to_string()), true),
    };
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;
    if issued {
        let cookie = Cookie::build((SESSION_COOKIE, session.0))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid session cookie: {}", e),
        }
    }
    response
}
