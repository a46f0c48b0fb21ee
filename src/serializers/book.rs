//! Book request bodies

use serde_json::Value;

use super::{author_reference, object, optional_integer, optional_text, required_text};
use crate::{
    error::FieldErrors,
    models::{BookInput, BookPatch},
};

/// Fields present in `body`. With `complete`, `title` and `author` must be
/// present. `author` accepts a primary key or an author hyperlink.
pub fn book_patch(body: &Value, complete: bool) -> Result<BookPatch, FieldErrors> {
    let map = object(body)?;
    let mut errors = FieldErrors::new();

    let patch = BookPatch {
        title: required_text(map, "title", complete, &mut errors),
        pub_year: optional_integer::<i32>(map, "pub_year", &mut errors),
        isbn: optional_text(map, "isbn", &mut errors),
        rating: optional_integer::<i16>(map, "rating", &mut errors),
        notes: optional_text(map, "notes", &mut errors),
        author_id: author_reference(map, "author", complete, &mut errors),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

/// Complete, constraint-checked input for a create
pub fn book_input(body: &Value) -> Result<BookInput, FieldErrors> {
    let patch = book_patch(body, true)?;
    let input = BookInput {
        title: patch.title.unwrap_or_default(),
        pub_year: patch.pub_year.flatten(),
        isbn: patch.isbn.flatten(),
        rating: patch.rating.flatten(),
        notes: patch.notes.flatten(),
        author_id: patch.author_id.unwrap_or_default(),
    };
    input.check()?;
    Ok(input)
}
