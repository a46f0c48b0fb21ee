//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::FieldErrors;

/// Author record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub last_name: Option<String>,
    pub first_name: String,
    pub birth_year: Option<i32>,
}

impl Author {
    /// "Last, First" when a last name is known, otherwise the first name alone
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{}, {}", last, self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// Complete, validated field set written on create and update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate, ToSchema)]
pub struct AuthorInput {
    #[validate(length(max = 64, message = "Ensure this field has no more than 64 characters."))]
    pub last_name: Option<String>,
    #[validate(length(
        min = 1,
        max = 64,
        message = "Ensure this field is not blank and has no more than 64 characters."
    ))]
    pub first_name: String,
    pub birth_year: Option<i32>,
}

impl AuthorInput {
    /// Run constraint validation, reporting failures per field
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// Fields present in an update request. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPatch {
    pub last_name: Option<Option<String>>,
    pub first_name: Option<String>,
    pub birth_year: Option<Option<i32>>,
}

impl AuthorPatch {
    /// Overlay the present fields on `current`; absent fields keep their value
    pub fn apply_to(&self, current: &Author) -> AuthorInput {
        AuthorInput {
            last_name: self
                .last_name
                .clone()
                .unwrap_or_else(|| current.last_name.clone()),
            first_name: self
                .first_name
                .clone()
                .unwrap_or_else(|| current.first_name.clone()),
            birth_year: self.birth_year.unwrap_or(current.birth_year),
        }
    }
}

/// Sort order for author listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorOrder {
    /// Storage order (id ascending)
    Id,
    /// Last name, then first name; authors without a last name sort last
    Name,
}
