//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::FieldErrors;

/// Book record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub pub_year: Option<i32>,
    pub isbn: Option<String>,
    /// Reader rating, 0 to 5
    pub rating: Option<i16>,
    pub notes: Option<String>,
    pub author_id: i32,
}

impl Book {
    /// Confirmation text shown after the book has been deleted
    pub fn deletion_notice(&self) -> String {
        format!("{} ({})", self.title, self.id)
    }
}

/// Complete, validated field set written on create and update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Ensure this field is not blank and has no more than 200 characters."
    ))]
    pub title: String,
    pub pub_year: Option<i32>,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub isbn: Option<String>,
    #[validate(range(min = 0, max = 5, message = "Ensure this value is between 0 and 5."))]
    pub rating: Option<i16>,
    pub notes: Option<String>,
    #[serde(rename = "author")]
    pub author_id: i32,
}

impl BookInput {
    /// Run constraint validation, reporting failures per field
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// Fields present in an update request. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub pub_year: Option<Option<i32>>,
    pub isbn: Option<Option<String>>,
    pub rating: Option<Option<i16>>,
    pub notes: Option<Option<String>>,
    pub author_id: Option<i32>,
}

impl BookPatch {
    /// Overlay the present fields on `current`; absent fields keep their value
    pub fn apply_to(&self, current: &Book) -> BookInput {
        BookInput {
            title: self.title.clone().unwrap_or_else(|| current.title.clone()),
            pub_year: self.pub_year.unwrap_or(current.pub_year),
            isbn: self.isbn.clone().unwrap_or_else(|| current.isbn.clone()),
            rating: self.rating.unwrap_or(current.rating),
            notes: self.notes.clone().unwrap_or_else(|| current.notes.clone()),
            author_id: self.author_id.unwrap_or(current.author_id),
        }
    }
}

/// Sort order for book listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOrder {
    /// Storage order (id ascending)
    Id,
    /// Highest rating first; unrated books last
    RatingDesc,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> Book {
        Book {
            id: 1,
            title: "Notes".to_string(),
            pub_year: Some(1843),
            isbn: None,
            rating: Some(5),
            notes: None,
            author_id: 1,
        }
    }

    #[test]
    fn test_deletion_notice() {
        assert_eq!(notes().deletion_notice(), "Notes (1)");
    }

    #[test]
    fn test_patch_overlay() {
        let patch = BookPatch {
            rating: Some(None),
            notes: Some(Some("Sketch of the Analytical Engine".to_string())),
            ..Default::default()
        };
        let merged = patch.apply_to(&notes());
        assert_eq!(merged.title, "Notes");
        assert_eq!(merged.pub_year, Some(1843));
        assert_eq!(merged.rating, None);
        assert_eq!(merged.notes.as_deref(), Some("Sketch of the Analytical Engine"));
        assert_eq!(merged.author_id, 1);
    }

    #[test]
    fn test_check_rating_range_and_title() {
        let mut input = notes_input();
        input.rating = Some(9);
        input.title = String::new();
        let errors = input.check().unwrap_err();
        assert!(errors.contains("rating"));
        assert!(errors.contains("title"));
        assert!(notes_input().check().is_ok());
    }

    fn notes_input() -> BookInput {
        BookPatch::default().apply_to(&notes())
    }
}
