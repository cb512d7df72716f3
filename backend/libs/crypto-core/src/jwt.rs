/// JWT issuing and validation for Yatube services
///
/// Tokens are signed with RS256 only. Keys are loaded once at startup and
/// kept in process-wide storage; services that only check tokens initialize
/// with the public key alone.
///
/// ## Usage
///
/// ```rust,ignore
/// use crypto_core::jwt;
///
/// jwt::initialize_jwt_keys(&private_pem, &public_pem)?;
/// let pair = jwt::generate_token_pair(user_id, "leo")?;
/// let claims = jwt::validate_access_token(&pair.access_token)?;
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// "access" or "refresh"
    pub token_type: String,
    pub username: String,
}

impl Claims {
    fn new(user_id: Uuid, username: &str, token_type: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            token_type: token_type.to_string(),
            username: username.to_string(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

// ============================================================================
// Key Storage
// ============================================================================

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize signing and verification keys from PEM strings.
///
/// Can only succeed once per process.
pub fn initialize_jwt_keys(private_key_pem: &str, public_key_pem: &str) -> Result<()> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA private key: {e}"))?;
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

    JWT_ENCODING_KEY
        .set(encoding_key)
        .map_err(|_| anyhow!("JWT encoding key already initialized"))?;
    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| anyhow!("JWT decoding key already initialized"))?;

    Ok(())
}

/// Initialize the verification key only. Token generation will fail.
pub fn initialize_jwt_validation_only(public_key_pem: &str) -> Result<()> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| anyhow!("JWT decoding key already initialized"))?;

    Ok(())
}

/// Whether this process can issue tokens
pub fn can_issue_tokens() -> bool {
    JWT_ENCODING_KEY.get().is_some()
}

fn get_encoding_key() -> Result<&'static EncodingKey> {
    JWT_ENCODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT signing key not initialized"))
}

fn get_decoding_key() -> Result<&'static DecodingKey> {
    JWT_DECODING_KEY
        .get()
        .ok_or_else(|| anyhow!("JWT verification key not initialized"))
}

// ============================================================================
// Token Generation
// ============================================================================

fn encode_claims(claims: &Claims) -> Result<String> {
    encode(&Header::new(JWT_ALGORITHM), claims, get_encoding_key()?)
        .map_err(|e| anyhow!("Failed to sign {} token: {e}", claims.token_type))
}

pub fn generate_access_token(user_id: Uuid, username: &str) -> Result<String> {
    encode_claims(&Claims::new(
        user_id,
        username,
        ACCESS_TOKEN_TYPE,
        Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS),
    ))
}

pub fn generate_refresh_token(user_id: Uuid, username: &str) -> Result<String> {
    encode_claims(&Claims::new(
        user_id,
        username,
        REFRESH_TOKEN_TYPE,
        Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
    ))
}

pub fn generate_token_pair(user_id: Uuid, username: &str) -> Result<TokenResponse> {
    Ok(TokenResponse {
        access_token: generate_access_token(user_id, username)?,
        refresh_token: generate_refresh_token(user_id, username)?,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_EXPIRY_HOURS * 3600,
    })
}

// ============================================================================
// Token Validation
// ============================================================================

/// Verify signature and expiry, returning the decoded claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;

    decode::<Claims>(token, get_decoding_key()?, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))
}

/// Like [`validate_token`], but refresh tokens are rejected.
pub fn validate_access_token(token: &str) -> Result<Claims> {
    let data = validate_token(token)?;
    if data.claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(anyhow!(
            "Expected an access token, got '{}'",
            data.claims.token_type
        ));
    }
    Ok(data.claims)
}

// ============================================================================
// Tests
// ============================================================================
