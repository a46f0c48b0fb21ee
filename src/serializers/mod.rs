//! JSON representations and input parsing for the REST surfaces
//!
//! [`Representation`] turns records into response bodies in the configured
//! relationship style. The `author` and `book` submodules parse request
//! bodies into typed inputs, collecting every problem as a field error.

pub mod author;
pub mod book;

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::{
    config::RepresentationStyle,
    error::FieldErrors,
    models::{Author, Book},
};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_INTEGER: &str = "A valid integer is required.";
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// A relation rendered either as a hyperlink or as a primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Link {
    Url(String),
    Id(i32),
}

/// Author response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub id: i32,
    pub last_name: Option<String>,
    pub first_name: String,
    pub birth_year: Option<i32>,
    pub books: Vec<Link>,
}

/// Book response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub id: i32,
    pub author: Link,
    pub title: String,
    pub pub_year: Option<i32>,
    pub isbn: Option<String>,
    pub rating: Option<i16>,
    pub notes: Option<String>,
}

/// Relationship exposure strategy shared by every JSON resource
#[derive(Debug, Clone)]
pub struct Representation {
    style: RepresentationStyle,
    base_url: String,
}

impl Representation {
    pub fn new(style: RepresentationStyle, public_url: &str) -> Self {
        Self {
            style,
            base_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Plain-id representation, as used by the hand-written endpoints
    pub fn plain() -> Self {
        Self::new(RepresentationStyle::Plain, "")
    }

    pub fn style(&self) -> RepresentationStyle {
        self.style
    }

    /// Whether PUT must carry every required field. Plain resources treat a
    /// PUT like a PATCH.
    pub fn put_requires_complete(&self) -> bool {
        self.style == RepresentationStyle::Hyperlinked
    }

    /// Absolute URL of a collection, e.g. `books` → `<base>/api/books/`
    pub fn collection_url(&self, resource: &str) -> String {
        format!("{}/api/{}/", self.base_url, resource)
    }

    pub fn author_url(&self, id: i32) -> String {
        format!("{}/api/authors/{}/", self.base_url, id)
    }

    pub fn book_url(&self, id: i32) -> String {
        format!("{}/api/books/{}/", self.base_url, id)
    }

    fn self_link(&self, url: String) -> Option<String> {
        match self.style {
            RepresentationStyle::Hyperlinked => Some(url),
            RepresentationStyle::Plain => None,
        }
    }

    fn author_link(&self, id: i32) -> Link {
        match self.style {
            RepresentationStyle::Hyperlinked => Link::Url(self.author_url(id)),
            RepresentationStyle::Plain => Link::Id(id),
        }
    }

    fn book_link(&self, id: i32) -> Link {
        match self.style {
            RepresentationStyle::Hyperlinked => Link::Url(self.book_url(id)),
            RepresentationStyle::Plain => Link::Id(id),
        }
    }

    /// `book_ids` are the ids of the books referencing this author
    pub fn author(&self, author: &Author, book_ids: &[i32]) -> AuthorResource {
        AuthorResource {
            url: self.self_link(self.author_url(author.id)),
            id: author.id,
            last_name: author.last_name.clone(),
            first_name: author.first_name.clone(),
            birth_year: author.birth_year,
            books: book_ids.iter().map(|id| self.book_link(*id)).collect(),
        }
    }

    pub fn book(&self, book: &Book) -> BookResource {
        BookResource {
            url: self.self_link(self.book_url(book.id)),
            id: book.id,
            author: self.author_link(book.author_id),
            title: book.title.clone(),
            pub_year: book.pub_year,
            isbn: book.isbn.clone(),
            rating: book.rating,
            notes: book.notes.clone(),
        }
    }
}

// =========================================================================
// Input helpers
// =========================================================================

/// The request body as an object, or a non-field error
pub(crate) fn object(body: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    body.as_object().ok_or_else(|| {
        let kind = match body {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "str",
            Value::Array(_) => "list",
            Value::Object(_) => "dict",
        };
        FieldErrors::single(
            NON_FIELD_ERRORS,
            format!("Invalid data. Expected a dictionary, but got {}.", kind),
        )
    })
}

/// Optional text: absent → `None`, null or blank → `Some(None)`
pub(crate) fn optional_text(
    map: &Map<String, Value>,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<Option<String>> {
    match map.get(name)? {
        Value::Null => Some(None),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => Some(Some(s.trim().to_string())),
        Value::Number(n) => Some(Some(n.to_string())),
        _ => {
            errors.add(name, NOT_A_STRING);
            None
        }
    }
}

/// Text that may not be null or blank once present; reported missing when
/// `required` and absent.
pub(crate) fn required_text(
    map: &Map<String, Value>,
    name: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    match map.get(name) {
        None => {
            if required {
                errors.add(name, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(name, NOT_NULL);
            None
        }
        Some(_) => match optional_text(map, name, errors) {
            Some(Some(text)) => Some(text),
            Some(None) => {
                errors.add(name, NOT_BLANK);
                None
            }
            None => None,
        },
    }
}

/// Optional integer: absent → `None`, null or empty string → `Some(None)`.
/// Numeric strings are accepted.
pub(crate) fn optional_integer<T>(
    map: &Map<String, Value>,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<Option<T>>
where
    T: TryFrom<i64> + Bounded,
{
    let raw = match map.get(name)? {
        Value::Null => return Some(None),
        Value::String(s) if s.trim().is_empty() => return Some(None),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    };
    let Some(raw) = raw else {
        errors.add(name, NOT_AN_INTEGER);
        return None;
    };
    match T::try_from(raw) {
        Ok(value) => Some(Some(value)),
        Err(_) if raw < 0 => {
            errors.add(
                name,
                format!("Ensure this value is greater than or equal to {}.", T::MIN_VALUE),
            );
            None
        }
        Err(_) => {
            errors.add(
                name,
                format!("Ensure this value is less than or equal to {}.", T::MAX_VALUE),
            );
            None
        }
    }
}

/// Integer widths accepted from JSON
pub(crate) trait Bounded {
    const MIN_VALUE: i64;
    const MAX_VALUE: i64;
}

impl Bounded for i32 {
    const MIN_VALUE: i64 = i32::MIN as i64;
    const MAX_VALUE: i64 = i32::MAX as i64;
}

impl Bounded for i16 {
    const MIN_VALUE: i64 = i16::MIN as i64;
    const MAX_VALUE: i64 = i16::MAX as i64;
}

/// Primary key of a related author, given as an id, a numeric string or a
/// hyperlink ending in `/authors/<id>/`
pub(crate) fn author_reference(
    map: &Map<String, Value>,
    name: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<i32> {
    match map.get(name) {
        None => {
            if required {
                errors.add(name, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(name, NOT_NULL);
            None
        }
        Some(Value::Number(n)) => match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(id) => Some(id),
            None => {
                errors.add(name, format!("Incorrect type. Expected pk value, received {}.", n));
                None
            }
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            if let Ok(id) = s.parse::<i32>() {
                return Some(id);
            }
            match parse_author_hyperlink(s) {
                Some(id) => Some(id),
                None => {
                    errors.add(name, "Invalid hyperlink - No URL match.");
                    None
                }
            }
        }
        Some(_) => {
            errors.add(name, "Incorrect type. Expected URL string or pk value.");
            None
        }
    }
}

fn parse_author_hyperlink(url: &str) -> Option<i32> {
    let mut segments = url.trim_end_matches('/').rsplit('/');
    let id = segments.next()?.parse::<i32>().ok()?;
    (segments.next()? == "authors").then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lovelace() -> Author {
        Author {
            id: 1,
            last_name: Some("Lovelace".to_string()),
            first_name: "Ada".to_string(),
            birth_year: Some(1815),
        }
    }

    fn notes() -> Book {
        Book {
            id: 3,
            title: "Notes".to_string(),
            pub_year: Some(1843),
            isbn: None,
            rating: Some(5),
            notes: None,
            author_id: 1,
        }
    }

    #[test]
    fn test_hyperlinked_author() {
        let repr = Representation::new(RepresentationStyle::Hyperlinked, "http://catalog.test/");
        let body = serde_json::to_value(repr.author(&lovelace(), &[3])).unwrap();
        assert_eq!(
            body,
            json!({
                "url": "http://catalog.test/api/authors/1/",
                "id": 1,
                "last_name": "Lovelace",
                "first_name": "Ada",
                "birth_year": 1815,
                "books": ["http://catalog.test/api/books/3/"],
            })
        );
    }

    #[test]
    fn test_plain_book_exposes_author_id() {
        let body = serde_json::to_value(Representation::plain().book(&notes())).unwrap();
        assert_eq!(
            body,
            json!({
                "id": 3,
                "author": 1,
                "title": "Notes",
                "pub_year": 1843,
                "isbn": null,
                "rating": 5,
                "notes": null,
            })
        );
    }

    #[test]
    fn test_hyperlinked_book_links_author() {
        let repr = Representation::new(RepresentationStyle::Hyperlinked, "http://catalog.test");
        let resource = repr.book(&notes());
        assert_eq!(resource.url.as_deref(), Some("http://catalog.test/api/books/3/"));
        assert_eq!(resource.author, Link::Url("http://catalog.test/api/authors/1/".to_string()));
    }

    #[test]
    fn test_object_rejects_non_objects() {
        let errors = object(&json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.get(NON_FIELD_ERRORS).unwrap()[0],
            "Invalid data. Expected a dictionary, but got list."
        );
    }

    #[test]
    fn test_author_reference_forms() {
        let mut errors = FieldErrors::new();
        let map = json!({
            "a": 4,
            "b": "5",
            "c": "http://catalog.test/api/authors/6/",
            "d": "http://catalog.test/api/books/6/",
        });
        let map = map.as_object().unwrap();
        assert_eq!(author_reference(map, "a", true, &mut errors), Some(4));
        assert_eq!(author_reference(map, "b", true, &mut errors), Some(5));
        assert_eq!(author_reference(map, "c", true, &mut errors), Some(6));
        assert!(errors.is_empty());
        assert_eq!(author_reference(map, "d", true, &mut errors), None);
        assert_eq!(author_reference(map, "missing", true, &mut errors), None);
        assert!(errors.contains("d"));
        assert_eq!(errors.get("missing").unwrap(), &vec![REQUIRED.to_string()]);
    }

    #[test]
    fn test_optional_integer_bounds() {
        let mut errors = FieldErrors::new();
        let map = json!({"ok": "1843", "null": null, "big": 40000, "bad": "soon"});
        let map = map.as_object().unwrap();
        assert_eq!(optional_integer::<i32>(map, "ok", &mut errors), Some(Some(1843)));
        assert_eq!(optional_integer::<i32>(map, "null", &mut errors), Some(None));
        assert_eq!(optional_integer::<i32>(map, "absent", &mut errors), None);
        assert!(errors.is_empty());

        assert_eq!(optional_integer::<i16>(map, "big", &mut errors), None);
        assert_eq!(optional_integer::<i32>(map, "bad", &mut errors), None);
        assert_eq!(
            errors.get("big").unwrap()[0],
            "Ensure this value is less than or equal to 32767."
        );
        assert_eq!(errors.get("bad").unwrap()[0], NOT_AN_INTEGER);
    }
}
