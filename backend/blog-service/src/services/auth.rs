/// Account service - signup and login issuing JWT pairs
use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::forms::{LoginForm, SignupForm};
use crate::models::{Author, NewUser};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use crypto_core::jwt::{self, TokenResponse};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Checked on unknown usernames so that both login failures cost one Argon2 run
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("yatube-unknown-user").ok());

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: Author,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn BlogRepository>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    pub async fn signup(&self, form: SignupForm) -> Result<AuthResponse> {
        ensure_signing_key()?;
        let form = form.clean()?;

        if self.repo.find_user_by_username(&form.username).await?.is_some() {
            return Err(username_taken());
        }

        let user = self
            .repo
            .create_user(NewUser {
                password_hash: hash_password(&form.password)?,
                username: form.username,
                email: form.email,
                first_name: form.first_name,
                last_name: form.last_name,
            })
            .await
            .map_err(|err| match err {
                // lost a race with a concurrent signup
                AppError::Conflict(_) => username_taken(),
                other => other,
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "user signed up");

        Ok(AuthResponse {
            tokens: jwt::generate_token_pair(user.id, &user.username)?,
            user: Author::from(&user),
        })
    }

    pub async fn login(&self, form: LoginForm) -> Result<AuthResponse> {
        ensure_signing_key()?;
        let form = form.clean()?;

        let user = match self.repo.find_user_by_username(&form.username).await? {
            Some(user) => user,
            None => {
                if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
                    let _ = verify_password(&form.password, hash);
                }
                tracing::info!(username = %form.username, "login for unknown user");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&form.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "login with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(AuthResponse {
            tokens: jwt::generate_token_pair(user.id, &user.username)?,
            user: Author::from(&user),
        })
    }
}

/// Validation-only deployments (public key but no private key) cannot issue tokens
fn ensure_signing_key() -> Result<()> {
    if jwt::can_issue_tokens() {
        Ok(())
    } else {
        Err(AppError::ServiceUnavailable(
            "Token signing is not configured".to_string(),
        ))
    }
}

fn username_taken() -> AppError {
    AppError::Conflict("A user with that username already exists.".to_string())
}

/// Hash a password with Argon2id and a random salt (PHC string)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Constant-time check of `password` against a stored PHC hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
