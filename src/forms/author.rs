//! Author creation form

use super::{finish, optional_int, optional_text, required_text, FieldSpec, FormData, RenderedField, Widget};
use crate::{error::FieldErrors, models::AuthorInput};

const LAST_NAME: FieldSpec = FieldSpec { name: "last_name", label: "Last Name", required: false };
const FIRST_NAME: FieldSpec = FieldSpec { name: "first_name", label: "First Name", required: true };
const BIRTH_YEAR: FieldSpec = FieldSpec { name: "birth_year", label: "Birth Year", required: false };

#[derive(Debug, Clone, Default)]
pub struct AuthorForm {
    data: FormData,
}

impl AuthorForm {
    /// Unbound form, rendered empty
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn bind(data: FormData) -> Self {
        Self { data }
    }

    /// Validated input, or every field error found
    pub fn clean(&self) -> Result<AuthorInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = AuthorInput {
            last_name: optional_text(&self.data, LAST_NAME.name),
            first_name: required_text(&self.data, FIRST_NAME.name, &mut errors),
            birth_year: optional_int(&self.data, BIRTH_YEAR.name, &mut errors),
        };
        finish(errors, input, AuthorInput::check)
    }

    pub fn fields(&self, errors: &FieldErrors) -> Vec<RenderedField> {
        vec![
            LAST_NAME.render(Widget::Text { max_length: Some(64) }, &self.data, errors),
            FIRST_NAME.render(Widget::Text { max_length: Some(64) }, &self.data, errors),
            BIRTH_YEAR.render(Widget::Number, &self.data, errors),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{data, NOT_AN_INTEGER, REQUIRED};

    #[test]
    fn test_clean_valid_submission() {
        let form = AuthorForm::bind(data(&[
            ("last_name", " Lovelace "),
            ("first_name", "Ada"),
            ("birth_year", "1815"),
        ]));
        let input = form.clean().unwrap();
        assert_eq!(input.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(input.first_name, "Ada");
        assert_eq!(input.birth_year, Some(1815));
    }

    #[test]
    fn test_optional_fields_may_be_blank() {
        let form = AuthorForm::bind(data(&[("first_name", "Homer"), ("last_name", ""), ("birth_year", "")]));
        let input = form.clean().unwrap();
        assert_eq!(input.last_name, None);
        assert_eq!(input.birth_year, None);
    }

    #[test]
    fn test_errors_are_reported_per_field() {
        let long = "x".repeat(65);
        let form = AuthorForm::bind(data(&[
            ("last_name", long.as_str()),
            ("birth_year", "eighteen-fifteen"),
        ]));
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("first_name").unwrap(), &vec![REQUIRED.to_string()]);
        assert_eq!(errors.get("birth_year").unwrap(), &vec![NOT_AN_INTEGER.to_string()]);
        assert!(errors.contains("last_name"));
    }

    #[test]
    fn test_rendered_fields_keep_submitted_values() {
        let form = AuthorForm::bind(data(&[("first_name", "Ada"), ("birth_year", "abc")]));
        let errors = form.clean().unwrap_err();
        let fields = form.fields(&errors);

        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["last_name", "first_name", "birth_year"]);
        assert_eq!(fields[1].value, "Ada");
        assert_eq!(fields[2].value, "abc");
        assert_eq!(fields[2].errors, vec![NOT_AN_INTEGER.to_string()]);
    }
}
