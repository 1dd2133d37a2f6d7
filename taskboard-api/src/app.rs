/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware. Authentication rides in an HTTP-only cookie; the
/// auth layer validates it and injects an [`AuthContext`] into request
/// extensions for the handlers.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::app::{build_router, AppState};
/// use taskboard_api::config::Config;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use taskboard_shared::auth::{jwt, policy::AuthContext};

use crate::{config::Config, realtime::ChannelRegistry};

/// Name of the identity cookie
pub const IDENTITY_COOKIE: &str = "token";

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; `Arc` and the pool's
/// internal sharing keep that cheap. All components receive their store
/// handle through this state — no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Realtime channel registry (live connections per user)
    pub channels: ChannelRegistry,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            channels: ChannelRegistry::new(),
        }
    }

    /// Gets the secret used to sign identity tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router
///
/// # Routes
///
/// ```text
/// /
/// ├── GET  /health                     # liveness + DB connectivity (public)
/// ├── POST /signup                     # create account, set cookie (public)
/// ├── POST /login                      # verify credentials, set cookie (public)
/// ├── POST /logout                     # expire cookie (public)
/// ├── GET  /ws                         # realtime channel, join-by-message (public)
/// ├── GET  /get-task                   # caller's tasks (auth)
/// ├── POST /create-task                # create + assignment notification (auth)
/// ├── PUT  /update/:id                 # partial update (auth + policy)
/// ├── DELETE /delete/:id               # delete (auth + policy)
/// ├── GET  /dashboard-tasks            # three concurrent queries (auth)
/// ├── GET  /users                      # assignment picker summaries (auth)
/// ├── GET  /notifications              # caller's notifications (auth)
/// └── PUT  /notifications/:id/read     # mark read (auth)
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::{realtime, routes};

    // Public surface: no cookie required
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/ws", get(realtime::ws_handler));

    // Everything else requires a valid identity cookie
    let protected_routes = Router::new()
        .route("/get-task", get(routes::tasks::list_tasks))
        .route("/create-task", post(routes::tasks::create_task))
        .route("/update/:id", put(routes::tasks::update_task))
        .route("/delete/:id", delete(routes::tasks::delete_task))
        .route("/dashboard-tasks", get(routes::tasks::dashboard_tasks))
        .route("/users", get(routes::users::list_users))
        .route("/notifications", get(routes::notifications::list_notifications))
        .route(
            "/notifications/:id/read",
            put(routes::notifications::mark_notification_read),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            cookie_auth_layer,
        ));

    let cors = build_cors(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Configures CORS from the allowed-origins list
fn build_cors(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Cookie authentication middleware
///
/// Reads the identity cookie, validates signature and expiry, and injects
/// [`AuthContext`] into request extensions. Absence of the cookie is
/// `Unauthorized`; a present but invalid/expired token is `InvalidToken`
/// (both 401).
async fn cookie_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let jar = CookieJar::from_headers(req.headers());

    let token = jar
        .get(IDENTITY_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authentication cookie".to_string())
        })?;

    let claims = jwt::validate_token(&token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    Ok(next.run(req).await)
}
