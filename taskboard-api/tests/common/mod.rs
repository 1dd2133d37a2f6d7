/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - Identity token and cookie helpers
/// - API client helpers
///
/// Integration tests need a live PostgreSQL instance; they skip themselves
/// when `DATABASE_URL` is not set so the unit suite stays runnable anywhere.

use axum::body::Body;
use axum::http::{Request, Response};
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState, IDENTITY_COOKIE};
use taskboard_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskboard_shared::auth::jwt::{create_token, Claims, TokenLifetime};
use taskboard_shared::db::run_migrations;
use taskboard_shared::models::user::{CreateUser, User, UserRole};
use tower::Service as _;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub token: String,
    created_users: Vec<Uuid>,
}

impl TestContext {
    /// Creates a new test context, or `None` when no test database is
    /// configured
    pub async fn try_new() -> anyhow::Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping integration test");
            return Ok(None);
        };

        let db = PgPool::connect(&url).await?;
        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        let user = create_test_user(&db, UserRole::User).await?;
        let token = issue_token(&user)?;

        Ok(Some(TestContext {
            db,
            app,
            created_users: vec![user.id],
            user,
            token,
        }))
    }

    /// Creates an extra user in the same database, tracked for cleanup
    pub async fn create_user(&mut self, role: UserRole) -> anyhow::Result<User> {
        let user = create_test_user(&self.db, role).await?;
        self.created_users.push(user.id);
        Ok(user)
    }

    /// Returns the identity cookie header value for the context user
    pub fn cookie_header(&self) -> String {
        format!("{}={}", IDENTITY_COOKIE, self.token)
    }

    /// Returns the identity cookie header value for another user
    pub fn cookie_header_for(&self, user: &User) -> anyhow::Result<String> {
        Ok(format!("{}={}", IDENTITY_COOKIE, issue_token(user)?))
    }

    /// Sends a request through the router
    pub async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        self.app.call(request).await.expect("router is infallible")
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Tasks cascade to notifications; notifications may also reference
        // the users directly
        sqlx::query("DELETE FROM notifications WHERE user_id = ANY($1)")
            .bind(&self.created_users)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE created_by_id = ANY($1) OR assigned_to_id = ANY($1)")
            .bind(&self.created_users)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&self.created_users)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Signs an identity token for a user, the same way login does
pub fn issue_token(user: &User) -> anyhow::Result<String> {
    let claims = Claims::new(user.id, user.role, user.email.clone(), TokenLifetime::Login);
    Ok(create_token(&claims, TEST_JWT_SECRET)?)
}

async fn create_test_user(db: &PgPool, role: UserRole) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            name: "Test User".to_string(),
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: "not-a-real-hash".to_string(),
            role,
        },
    )
    .await?;
    Ok(user)
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Skips the test when `TestContext::try_new` yields no context
#[macro_export]
macro_rules! require_context {
    () => {
        match common::TestContext::try_new().await.unwrap() {
            Some(ctx) => ctx,
            None => return,
        }
    };
}
