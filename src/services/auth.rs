//! Authentication against the configured accounts

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::UserClaims,
};

/// Issued token and its lifetime
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Verify credentials and sign a token carrying the account's permissions
    pub fn login(&self, username: &str, password: &str) -> AppResult<IssuedToken> {
        let account = self
            .config
            .accounts
            .iter()
            .find(|a| a.username == username)
            .ok_or_else(|| {
                tracing::warn!(username, "Login attempt for unknown account");
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !verify_password(password, &account.password_hash)? {
            tracing::warn!(username, "Login attempt with wrong password");
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let claims = UserClaims::new(
            &account.username,
            account.permissions.clone(),
            self.config.jwt_expiration_hours,
        );
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        tracing::info!(username, "User logged in");
        Ok(IssuedToken {
            token,
            expires_in: self.config.jwt_expiration_hours * 3600,
        })
    }

    /// Claims of a valid token, `None` for anything else
    pub fn resolve(&self, token: &str) -> Option<UserClaims> {
        match UserClaims::from_token(token, &self.config.jwt_secret) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Rejected token: {}", e);
                None
            }
        }
    }
}

/// Argon2 PHC string for `password`, as expected in `auth.accounts`
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash in configuration: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
