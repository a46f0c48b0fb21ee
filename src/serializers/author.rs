//! Author request bodies

use serde_json::Value;

use super::{object, optional_integer, optional_text, required_text};
use crate::{
    error::FieldErrors,
    models::{AuthorInput, AuthorPatch},
};

/// Fields present in `body`. With `complete`, required fields must be present;
/// otherwise only what is present is checked. `url`, `id` and `books` are
/// read-only and ignored.
pub fn author_patch(body: &Value, complete: bool) -> Result<AuthorPatch, FieldErrors> {
    let map = object(body)?;
    let mut errors = FieldErrors::new();

    let patch = AuthorPatch {
        last_name: optional_text(map, "last_name", &mut errors),
        first_name: required_text(map, "first_name", complete, &mut errors),
        birth_year: optional_integer::<i32>(map, "birth_year", &mut errors),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

/// Complete, constraint-checked input for a create
pub fn author_input(body: &Value) -> Result<AuthorInput, FieldErrors> {
    let patch = author_patch(body, true)?;
    let input = AuthorInput {
        last_name: patch.last_name.flatten(),
        first_name: patch.first_name.unwrap_or_default(),
        birth_year: patch.birth_year.flatten(),
    };
    input.check()?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::{NOT_AN_INTEGER, NOT_BLANK, REQUIRED};
    use serde_json::json;

    #[test]
    fn test_create_input() {
        let input = author_input(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "birth_year": 1815,
            "books": ["ignored"],
        }))
        .unwrap();
        assert_eq!(
            input,
            AuthorInput {
                last_name: Some("Lovelace".to_string()),
                first_name: "Ada".to_string(),
                birth_year: Some(1815),
            }
        );
    }

    #[test]
    fn test_create_requires_first_name() {
        let errors = author_input(&json!({"last_name": "Lovelace"})).unwrap_err();
        assert_eq!(errors.get("first_name").unwrap(), &vec![REQUIRED.to_string()]);

        let errors = author_input(&json!({"first_name": "  "})).unwrap_err();
        assert_eq!(errors.get("first_name").unwrap(), &vec![NOT_BLANK.to_string()]);
    }

    #[test]
    fn test_create_length_limit() {
        let errors = author_input(&json!({"first_name": "x".repeat(65)})).unwrap_err();
        assert!(errors.contains("first_name"));
    }

    #[test]
    fn test_partial_patch_only_carries_present_fields() {
        let patch = author_patch(&json!({"birth_year": 1816}), false).unwrap();
        assert_eq!(
            patch,
            AuthorPatch {
                birth_year: Some(Some(1816)),
                ..Default::default()
            }
        );

        let patch = author_patch(&json!({"last_name": null}), false).unwrap();
        assert_eq!(patch.last_name, Some(None));
    }

    #[test]
    fn test_complete_patch_requires_first_name() {
        let errors = author_patch(&json!({"birth_year": 1816}), true).unwrap_err();
        assert!(errors.contains("first_name"));
    }

    #[test]
    fn test_type_errors() {
        let errors = author_patch(&json!({"birth_year": "soon", "last_name": []}), false).unwrap_err();
        assert_eq!(errors.get("birth_year").unwrap(), &vec![NOT_AN_INTEGER.to_string()]);
        assert!(errors.contains("last_name"));
    }
}
