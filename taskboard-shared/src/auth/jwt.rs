/// Identity token generation and validation
///
/// The identity token is a stateless, HS256-signed JWT carrying the user's
/// id, role, and email. It is issued at signup (7-day expiry) and login
/// (1-day expiry), travels in an HTTP-only cookie, and is verified by
/// signature and expiry on every authenticated request — nothing is stored
/// server-side.
///
/// There is deliberately no revocation list: logout overwrites the cookie
/// on the client, and a replayed token stays valid until natural expiry.
/// Callers only see [`create_token`]/[`validate_token`], so a blacklist can
/// be added behind this boundary later without touching them.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{create_token, validate_token, Claims, TokenLifetime};
/// use taskboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(
///     Uuid::new_v4(),
///     UserRole::User,
///     "ada@example.com".to_string(),
///     TokenLifetime::Login,
/// );
/// let secret = "a-secret-key-at-least-32-bytes-long!";
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, claims.sub);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

const ISSUER: &str = "taskboard";

/// Error type for identity token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer, or format failure
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Expiry policy for an issued token
///
/// Signup hands out the longer-lived token; an explicit login the shorter
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLifetime {
    /// Issued at signup (7 days)
    Signup,

    /// Issued at login (1 day)
    Login,
}

impl TokenLifetime {
    /// Duration until expiry for this policy
    pub fn duration(&self) -> Duration {
        match self {
            TokenLifetime::Signup => Duration::days(7),
            TokenLifetime::Login => Duration::days(1),
        }
    }
}

/// Identity token claims
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`) plus the role and email the
/// authorization layer needs. Role is captured at issuance time; a later
/// role change does not invalidate tokens already in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Role at issuance time
    pub role: UserRole,

    /// Email at issuance time
    pub email: String,
}

impl Claims {
    /// Creates claims expiring per the given lifetime policy
    pub fn new(user_id: Uuid, role: UserRole, email: String, lifetime: TokenLifetime) -> Self {
        let now = Utc::now();
        let expiration = now + lifetime.duration();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            role,
            email,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, the expiry, and that the issuer is "taskboard".
///
/// # Errors
///
/// Returns `JwtError::Expired` for an expired token and `JwtError::Invalid`
/// for every other failure (bad signature, wrong issuer, malformed token).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
