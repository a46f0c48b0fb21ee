//! Actors, permissions and token claims

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Capabilities an actor may hold.
///
/// The canonical spelling is the bare codename (`add_book`); the older
/// `can_add_book` spelling is still accepted when reading configuration and
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    #[serde(rename = "add_book", alias = "can_add_book")]
    AddBook,
    #[serde(rename = "change_book", alias = "can_change_book")]
    ChangeBook,
    #[serde(rename = "delete_book", alias = "can_delete_book")]
    DeleteBook,
    #[serde(rename = "add_author", alias = "can_add_author")]
    AddAuthor,
    #[serde(rename = "change_author", alias = "can_change_author")]
    ChangeAuthor,
    #[serde(rename = "delete_author", alias = "can_delete_author")]
    DeleteAuthor,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AddBook => "add_book",
            Permission::ChangeBook => "change_book",
            Permission::DeleteBook => "delete_book",
            Permission::AddAuthor => "add_author",
            Permission::ChangeAuthor => "change_author",
            Permission::DeleteAuthor => "delete_author",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codename = s.trim().to_lowercase();
        match codename.strip_prefix("can_").unwrap_or(&codename) {
            "add_book" => Ok(Permission::AddBook),
            "change_book" => Ok(Permission::ChangeBook),
            "delete_book" => Ok(Permission::DeleteBook),
            "add_author" => Ok(Permission::AddAuthor),
            "change_author" => Ok(Permission::ChangeAuthor),
            "delete_author" => Ok(Permission::DeleteAuthor),
            _ => Err(format!("Unknown permission: {}", s)),
        }
    }
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Claims for `username` valid for `hours` from now
    pub fn new(username: &str, permissions: Vec<Permission>, hours: u64) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: username.to_string(),
            permissions,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(hours as i64)).timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// The caller of a request, resolved once by the authorization stage
#[derive(Debug, Clone)]
pub enum Actor {
    Anonymous,
    User(UserClaims),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Actor::User(claims) => Some(claims.sub.as_str()),
            Actor::Anonymous => None,
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        match self {
            Actor::User(claims) => claims.has(permission),
            Actor::Anonymous => false,
        }
    }

    pub fn require_authenticated(&self) -> Result<(), AppError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Authentication credentials were not provided.".to_string(),
            ))
        }
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Permission {} required",
                permission
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_permission_spellings() {
        assert_eq!("add_book".parse::<Permission>(), Ok(Permission::AddBook));
        assert_eq!("can_add_book".parse::<Permission>(), Ok(Permission::AddBook));
        assert_eq!("DELETE_AUTHOR".parse::<Permission>(), Ok(Permission::DeleteAuthor));
        assert!("publish_book".parse::<Permission>().is_err());

        let legacy: Permission = serde_json::from_str("\"can_delete_book\"").unwrap();
        assert_eq!(legacy, Permission::DeleteBook);
        assert_eq!(serde_json::to_string(&legacy).unwrap(), "\"delete_book\"");
    }

    #[test]
    fn test_token_round_trip_keeps_permissions() {
        let claims = UserClaims::new("ada", vec![Permission::AddBook], 1);
        let token = claims.create_token(SECRET).unwrap();
        let decoded = UserClaims::from_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, "ada");
        assert!(decoded.has(Permission::AddBook));
        assert!(!decoded.has(Permission::DeleteBook));
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_actor_requirements() {
        let anonymous = Actor::Anonymous;
        assert!(anonymous.require_authenticated().is_err());
        assert!(anonymous.require(Permission::AddAuthor).is_err());

        let user = Actor::User(UserClaims::new("ada", vec![Permission::AddAuthor], 1));
        assert!(user.require_authenticated().is_ok());
        assert!(user.require(Permission::AddAuthor).is_ok());
        assert!(matches!(
            user.require(Permission::DeleteBook),
            Err(AppError::Authorization(_))
        ));
    }
}
