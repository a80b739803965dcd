/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use feedline_api::{app::AppState, config::Config};
/// use feedline_shared::db::memory::MemoryStorage;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStorage::new()), config)?;
/// let app = feedline_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use feedline_shared::{
    auth::{
        credentials::CredentialStore, middleware::authenticate_headers, token::TokenAuthenticator,
    },
    db::storage::Storage,
    graph::FollowGraph,
    timeline::TimelineComposer,
    tweets::TweetStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every component shares the same storage backend behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (PostgreSQL or in-memory)
    pub storage: Arc<dyn Storage>,

    /// Registration and password verification
    pub credentials: CredentialStore,

    /// Token issuing and validation
    pub tokens: Arc<TokenAuthenticator>,

    /// Follow edges
    pub graph: FollowGraph,

    /// Tweet posting and streams
    pub tweets: TweetStore,

    /// Timeline composition
    pub timeline: TimelineComposer,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state over `storage`
    ///
    /// # Errors
    ///
    /// Fails if the configured password parameters are rejected by Argon2.
    pub fn new(storage: Arc<dyn Storage>, config: Config) -> anyhow::Result<Self> {
        let credentials = CredentialStore::new(storage.clone(), config.password.into())?;
        let tokens = TokenAuthenticator::new(config.jwt.secret.as_bytes());

        Ok(Self {
            credentials,
            tokens: Arc::new(tokens),
            graph: FollowGraph::new(storage.clone()),
            tweets: TweetStore::new(storage.clone()),
            timeline: TimelineComposer::new(storage.clone()),
            storage,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /ping                  # Liveness (public)
/// ├── GET  /health                # Health check (public)
/// ├── POST /sign-up               # Register (public)
/// ├── POST /login                 # Issue token (public)
/// ├── GET  /timeline/:user_id     # Any user's timeline (public)
/// ├── GET  /users/:user_id        # Public profile (public)
/// ├── GET  /users/:user_id/tweets # One author's tweets (public)
/// ├── POST /tweet                 # Post (token)
/// ├── POST /follow                # Follow (token)
/// ├── POST /unfollow              # Unfollow (token)
/// └── GET  /timeline              # Caller's timeline (token)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (token routes only)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Public routes
    let public_routes = Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/health", get(routes::health::health_check))
        .route("/sign-up", post(routes::auth::sign_up))
        .route("/login", post(routes::auth::login))
        .route("/timeline/:user_id", get(routes::timeline::user_timeline))
        .route("/users/:user_id", get(routes::users::get_profile))
        .route("/users/:user_id/tweets", get(routes::users::list_tweets));

    // Routes that require a token
    let authenticated_routes = Router::new()
        .route("/tweet", post(routes::tweets::post_tweet))
        .route("/follow", post(routes::follows::follow))
        .route("/unfollow", post(routes::follows::unfollow))
        .route("/timeline", get(routes::timeline::own_timeline))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.is_empty() {
        // Any origin
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Token authentication middleware layer
///
/// Validates the token in the `Authorization` header (`Bearer <token>` or
/// the bare token), then injects an `AuthContext` into request extensions.
async fn token_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate_headers(&state.tokens, req.headers()).map_err(|e| {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            reason = %e,
            "Rejected unauthenticated request"
        );
        ApiError::from(e)
    })?;

    // Insert into request extensions
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
