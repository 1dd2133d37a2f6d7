/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and signup strength validation
/// - [`jwt`]: stateless signed identity tokens (HS256)
/// - [`policy`]: pure allow/deny decisions over task ownership data
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{create_token, Claims, TokenLifetime};
/// use taskboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(
///     Uuid::new_v4(),
///     UserRole::User,
///     "user@example.com".to_string(),
///     TokenLifetime::Login,
/// );
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
pub mod policy;
