//! Book creation form
//!
//! Every rendered field carries the `form-control` class and points
//! `aria-describedby` at its help block.

use super::{
    finish, optional_int, optional_text, required_text, Choice, FieldSpec, FormData,
    RenderedField, Widget, REQUIRED,
};
use crate::{
    error::FieldErrors,
    models::{Author, BookInput},
};

const TITLE: FieldSpec = FieldSpec { name: "title", label: "Title", required: true };
const PUB_YEAR: FieldSpec = FieldSpec { name: "pub_year", label: "Publication Year", required: false };
const ISBN: FieldSpec = FieldSpec { name: "isbn", label: "ISBN", required: false };
const RATING: FieldSpec = FieldSpec { name: "rating", label: "Rating", required: false };
const NOTES: FieldSpec = FieldSpec { name: "notes", label: "Notes", required: false };
const AUTHOR: FieldSpec = FieldSpec { name: "author", label: "Author", required: true };

pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Debug, Clone, Default)]
pub struct BookForm {
    data: FormData,
}

impl BookForm {
    /// Unbound form, rendered empty
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn bind(data: FormData) -> Self {
        Self { data }
    }

    /// Validated input, or every field error found. Whether the chosen author
    /// exists is left to the store.
    pub fn clean(&self) -> Result<BookInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let author_id = match self.data.get(AUTHOR.name).map(|v| v.trim()) {
            None | Some("") => {
                errors.add(AUTHOR.name, REQUIRED);
                0
            }
            Some(raw) => raw.parse::<i32>().unwrap_or_else(|_| {
                errors.add(AUTHOR.name, INVALID_CHOICE);
                0
            }),
        };
        let input = BookInput {
            title: required_text(&self.data, TITLE.name, &mut errors),
            pub_year: optional_int(&self.data, PUB_YEAR.name, &mut errors),
            isbn: optional_text(&self.data, ISBN.name),
            rating: optional_int(&self.data, RATING.name, &mut errors),
            notes: optional_text(&self.data, NOTES.name),
            author_id,
        };
        finish(errors, input, BookInput::check)
    }

    /// Field descriptions; `authors` populates the author select
    pub fn fields(&self, errors: &FieldErrors, authors: &[Author]) -> Vec<RenderedField> {
        let choices = authors
            .iter()
            .map(|a| Choice {
                value: a.id.to_string(),
                label: a.display_name(),
            })
            .collect();

        let mut fields = vec![
            TITLE.render(Widget::Text { max_length: Some(200) }, &self.data, errors),
            PUB_YEAR.render(Widget::Number, &self.data, errors),
            ISBN.render(Widget::Text { max_length: Some(20) }, &self.data, errors),
            RATING.render(Widget::Number, &self.data, errors),
            NOTES.render(Widget::Textarea, &self.data, errors),
            AUTHOR.render(Widget::Select { choices }, &self.data, errors),
        ];
        for field in &mut fields {
            field.attrs.insert("class".to_string(), "form-control".to_string());
            field
                .attrs
                .insert("aria-describedby".to_string(), format!("help_block_{}", field.name));
        }
        fields
    }
}
