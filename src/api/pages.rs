//! Server-rendered pages
//!
//! List pages carry an inline create form. A failed submission re-renders
//! the list with the submitted values and the field errors (HTTP 400).

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::Serialize;
use serde_json::json;
use tera::{Context, Tera};

use super::session::Session;
use crate::{
    error::{AppError, AppResult, FieldErrors},
    forms::{AuthorForm, BookForm, FormData},
    models::{Author, AuthorOrder, Book, BookOrder},
    services::notices::LAST_DELETED_BOOK,
    AppState,
};

/// Build the template engine from the templates compiled into the binary
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("macros.html", include_str!("../../templates/macros.html")),
        ("book_list.html", include_str!("../../templates/book_list.html")),
        ("book_detail.html", include_str!("../../templates/book_detail.html")),
        ("author_list.html", include_str!("../../templates/author_list.html")),
        ("author_detail.html", include_str!("../../templates/author_detail.html")),
    ])?;
    Ok(tera)
}

/// Book as listed on a page, with its author's display name
#[derive(Debug, Serialize)]
struct BookRow<'a> {
    id: i32,
    title: &'a str,
    pub_year: Option<i32>,
    isbn: Option<&'a str>,
    rating: Option<i16>,
    notes: Option<&'a str>,
    author_id: i32,
    author: String,
}

impl<'a> BookRow<'a> {
    fn new(book: &'a Book, authors: &HashMap<i32, String>) -> Self {
        Self {
            id: book.id,
            title: &book.title,
            pub_year: book.pub_year,
            isbn: book.isbn.as_deref(),
            rating: book.rating,
            notes: book.notes.as_deref(),
            author_id: book.author_id,
            author: authors.get(&book.author_id).cloned().unwrap_or_default(),
        }
    }
}

fn render(state: &AppState, template: &str, context: &Context) -> AppResult<Html<String>> {
    Ok(Html(state.templates.render(template, context)?))
}

pub async fn index() -> Redirect {
    Redirect::to("/books/")
}

// =========================================================================
// Books
// =========================================================================

async fn book_list_page(
    state: &AppState,
    form: &BookForm,
    errors: &FieldErrors,
    notice: Option<String>,
) -> AppResult<Html<String>> {
    let books = state.services.catalog.list_books(BookOrder::Id).await?;
    let authors = state.services.catalog.list_authors(AuthorOrder::Name).await?;
    let names: HashMap<i32, String> = authors.iter().map(|a| (a.id, a.display_name())).collect();

    let mut context = Context::new();
    context.insert(
        "books",
        &books.iter().map(|b| BookRow::new(b, &names)).collect::<Vec<_>>(),
    );
    context.insert("fields", &form.fields(errors, &authors));
    context.insert("notice", &notice);
    render(state, "book_list.html", &context)
}

/// `GET /books/`: list, create form and the pending deletion notice
pub async fn book_list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Html<String>> {
    let notice = state
        .services
        .notices
        .take_once(session.id(), LAST_DELETED_BOOK)
        .await?;
    book_list_page(&state, &BookForm::blank(), &FieldErrors::new(), notice).await
}

/// `POST /books/`
pub async fn book_create(
    State(state): State<AppState>,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let form = BookForm::bind(data);
    let result = match form.clean() {
        Ok(input) => state.services.catalog.create_book(&input).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    match result {
        Ok(_) => Ok(Redirect::to("/books/").into_response()),
        Err(AppError::Validation(errors)) => {
            let page = book_list_page(&state, &form, &errors, None).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// `GET /books/:id`
pub async fn book_detail(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Html<String>> {
    let book = state.services.catalog.get_book(id).await?;
    let author = state.services.catalog.get_author(book.author_id).await?;
    let names = HashMap::from([(author.id, author.display_name())]);

    let mut context = Context::new();
    context.insert("book", &BookRow::new(&book, &names));
    render(&state, "book_detail.html", &context)
}

/// `DELETE /books/:id`: leaves a one-time notice for the next list render
pub async fn book_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    let book = state.services.catalog.get_book(id).await?;
    state
        .services
        .notices
        .set(session.id(), LAST_DELETED_BOOK, &book.deletion_notice())
        .await?;
    if let Err(e) = state.services.catalog.delete_book(id).await {
        // the book is still there, so its notice must not be shown
        state
            .services
            .notices
            .take_once(session.id(), LAST_DELETED_BOOK)
            .await?;
        return Err(e);
    }
    Ok(Json(json!({})))
}

// =========================================================================
// Authors
// =========================================================================

async fn author_list_page(state: &AppState, form: &AuthorForm, errors: &FieldErrors) -> AppResult<Html<String>> {
    let authors = state.services.catalog.list_authors(AuthorOrder::Id).await?;

    let mut context = Context::new();
    context.insert("authors", &authors);
    context.insert("fields", &form.fields(errors));
    render(state, "author_list.html", &context)
}

/// `GET /authors/`
pub async fn author_list(State(state): State<AppState>) -> AppResult<Html<String>> {
    author_list_page(&state, &AuthorForm::blank(), &FieldErrors::new()).await
}

/// `POST /authors/`
pub async fn author_create(
    State(state): State<AppState>,
    Form(data): Form<FormData>,
) -> AppResult<Response> {
    let form = AuthorForm::bind(data);
    let result = match form.clean() {
        Ok(input) => state.services.catalog.create_author(&input).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    match result {
        Ok(_) => Ok(Redirect::to("/authors/").into_response()),
        Err(AppError::Validation(errors)) => {
            let page = author_list_page(&state, &form, &errors).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e),
    }
}

/// `GET /authors/:id`: the author and every book referencing them
pub async fn author_detail(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Html<String>> {
    let (author, books): (Author, Vec<Book>) = state.services.catalog.get_author_with_books(id).await?;
    let names = HashMap::from([(author.id, author.display_name())]);

    let mut context = Context::new();
    context.insert("author", &author);
    context.insert("display_name", &author.display_name());
    context.insert(
        "books",
        &books.iter().map(|b| BookRow::new(b, &names)).collect::<Vec<_>>(),
    );
    render(&state, "author_detail.html", &context)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        repository::MockStore,
        services::notices::{MemoryNotices, NoticeStore},
    };

    #[test]
    fn test_templates_parse() {
        let tera = load_templates().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&"book_list.html"));
        assert!(names.contains(&"author_detail.html"));
    }

    #[test]
    fn test_book_list_renders_notice_and_fields() {
        let tera = load_templates().unwrap();
        let authors = vec![Author {
            id: 1,
            last_name: Some("Lovelace".to_string()),
            first_name: "Ada".to_string(),
            birth_year: Some(1815),
        }];
        let mut context = Context::new();
        context.insert("books", &Vec::<String>::new());
        context.insert("fields", &BookForm::blank().fields(&FieldErrors::new(), &authors));
        context.insert("notice", &Some("Notes (1)"));

        let html = tera.render("book_list.html", &context).unwrap();
        assert!(html.contains("Notes (1)"));
        assert!(html.contains(r#"aria-describedby="help_block_title""#));
        assert!(html.contains(r#"class="form-control""#));
        assert!(html.contains("Lovelace, Ada"));
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_no_notice() {
        let mut store = MockStore::new();
        store.expect_get_book().returning(|id| {
            Ok(Book {
                id,
                title: "Notes".to_string(),
                pub_year: Some(1843),
                isbn: None,
                rating: None,
                notes: None,
                author_id: 1,
            })
        });
        store
            .expect_delete_book()
            .returning(|_| Err(AppError::Internal("connection reset".into())));

        let notices = Arc::new(MemoryNotices::new(60));
        let state = AppState::new(AppConfig::default(), Arc::new(store), notices.clone()).unwrap();
        let session = Session("s1".to_string());

        let result = book_delete(State(state), Extension(session), Path(1)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(notices.take_once("s1", LAST_DELETED_BOOK).await.unwrap(), None);
    }
}
