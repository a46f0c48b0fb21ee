//! HTML form binding and validation
//!
//! Forms receive the raw URL-encoded values of a submission, convert them to
//! typed inputs and report per-field errors. They also describe their fields
//! for the page templates, pre-filled with whatever was submitted.

pub mod author;
pub mod book;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{error::FieldErrors, serializers::Bounded};

pub use author::AuthorForm;
pub use book::BookForm;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_AN_INTEGER: &str = "Enter a whole number.";

/// Raw submitted values, keyed by field name
pub type FormData = HashMap<String, String>;

/// Widget used to render a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Widget {
    Text { max_length: Option<usize> },
    Number,
    Textarea,
    Select { choices: Vec<Choice> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Field description handed to the templates
#[derive(Debug, Clone, Serialize)]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub widget: Widget,
    pub required: bool,
    pub value: String,
    pub errors: Vec<String>,
    /// Extra HTML attributes placed on the input element
    pub attrs: BTreeMap<String, String>,
}

/// Static description of one form field
pub(crate) struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
}

impl FieldSpec {
    pub(crate) fn render(&self, widget: Widget, data: &FormData, errors: &FieldErrors) -> RenderedField {
        RenderedField {
            name: self.name.to_string(),
            label: self.label.to_string(),
            widget,
            required: self.required,
            value: data.get(self.name).cloned().unwrap_or_default(),
            errors: errors.get(self.name).cloned().unwrap_or_default(),
            attrs: BTreeMap::new(),
        }
    }
}

/// Trimmed value, `None` when missing or blank
fn submitted<'a>(data: &'a FormData, name: &str) -> Option<&'a str> {
    data.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub(crate) fn required_text(data: &FormData, name: &str, errors: &mut FieldErrors) -> String {
    match submitted(data, name) {
        Some(value) => value.to_string(),
        None => {
            errors.add(name, REQUIRED);
            String::new()
        }
    }
}

pub(crate) fn optional_text(data: &FormData, name: &str) -> Option<String> {
    submitted(data, name).map(str::to_string)
}

/// Optional whole number, parsed wide then narrowed to the column's width
pub(crate) fn optional_int<T>(data: &FormData, name: &str, errors: &mut FieldErrors) -> Option<T>
where
    T: TryFrom<i64> + Bounded,
{
    let value = submitted(data, name)?;
    let Ok(raw) = value.parse::<i64>() else {
        errors.add(name, NOT_AN_INTEGER);
        return None;
    };
    match T::try_from(raw) {
        Ok(n) => Some(n),
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

/// Merge constraint failures from a typed input into the conversion errors
pub(crate) fn finish<T>(
    mut errors: FieldErrors,
    input: T,
    check: impl FnOnce(&T) -> Result<(), FieldErrors>,
) -> Result<T, FieldErrors> {
    if let Err(constraints) = check(&input) {
        for (field, messages) in constraints.iter() {
            if errors.contains(field) {
                continue;
            }
            for message in messages {
                errors.add(field, message.clone());
            }
        }
    }
    if errors.is_empty() {
        Ok(input)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
pub(crate) fn data(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
