/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Signup (account creation, sets the identity cookie)
/// - Login (credential check, sets the identity cookie)
/// - Logout (expires the identity cookie)
///
/// # Endpoints
///
/// - `POST /signup` - Create account and set identity cookie
/// - `POST /login` - Login and set identity cookie
/// - `POST /logout` - Expire identity cookie
///
/// Tokens are stateless; logout works by instructing the client to drop the
/// cookie. A token replayed directly stays valid until its natural expiry.

use crate::{
    app::{AppState, IDENTITY_COOKIE},
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        jwt::{self, TokenLifetime},
        password,
    },
    models::user::{CreateUser, User, UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional role; defaults to USER
    pub role: Option<UserRole>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Sanitized user payload, never carries the password hash
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The identity token, also set as a cookie
    pub token: String,

    /// The authenticated user
    pub user: UserResponse,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Builds the HTTP-only identity cookie carrying a signed token
fn identity_cookie(token: String, lifetime: TokenLifetime) -> Cookie<'static> {
    Cookie::build((IDENTITY_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(lifetime.duration().num_seconds()))
        .build()
}

/// Builds an immediately-expired identity cookie
fn expired_identity_cookie() -> Cookie<'static> {
    Cookie::build((IDENTITY_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Signup handler
///
/// Creates a new user account, signs a long-lived identity token, and sets
/// it as an HTTP-only cookie.
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Field validation or password strength failed
/// - `409 Conflict`: Email already exists
/// - `500 Internal Server Error`: Server error
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(CookieJar, Json<UserResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationFailed(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role.unwrap_or(UserRole::User),
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id, user.role, user.email.clone(), TokenLifetime::Signup);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User account created");

    let jar = jar.add(identity_cookie(token, TokenLifetime::Signup));
    Ok((jar, Json(UserResponse::from(&user))))
}

/// Login handler
///
/// Verifies credentials, signs a session-length identity token, sets it as
/// an HTTP-only cookie, and also returns it in the body.
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Field validation failed
/// - `401 Unauthorized`: Invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    req.validate()?;

    // Same message for unknown email and bad password
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(user.id, user.role, user.email.clone(), TokenLifetime::Login);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::debug!(user_id = %user.id, "User logged in");

    let jar = jar.add(identity_cookie(token.clone(), TokenLifetime::Login));
    Ok((
        jar,
        Json(LoginResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// Logout handler
///
/// Expires the identity cookie. Stateless tokens cannot be revoked
/// server-side, so this only instructs the client to drop its copy.
///
/// # Endpoint
///
/// ```text
/// POST /logout
/// ```
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.add(expired_identity_cookie());
    (
        jar,
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_cookie_attributes() {
        let cookie = identity_cookie("abc".to_string(), TokenLifetime::Login);

        assert_eq!(cookie.name(), IDENTITY_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(24 * 60 * 60))
        );
    }

    #[test]
    fn test_signup_cookie_outlives_login_cookie() {
        let signup = identity_cookie("a".to_string(), TokenLifetime::Signup);
        let login = identity_cookie("b".to_string(), TokenLifetime::Login);

        assert!(signup.max_age().unwrap() > login.max_age().unwrap());
    }

    #[test]
    fn test_expired_cookie_clears_value() {
        let cookie = expired_identity_cookie();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn test_signup_request_rejects_bad_email() {
        let req = SignupRequest {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "SecureP@ss123".to_string(),
            role: None,
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_signup_request_accepts_valid_input() {
        let req = SignupRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "SecureP@ss123".to_string(),
            role: None,
        };

        assert!(req.validate().is_ok());
    }
}
