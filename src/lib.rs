//! Event planner backend: accounts, events, invitations, attendance, tasks and search.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod policy;
pub mod repositories;
pub mod schema;
pub mod search;
pub mod services;
pub mod telemetry;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use std::time::Duration;

use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use auth::password::PasswordPolicy;
use middleware::{identity::require_identity, request_id::request_id_middleware};
use services::{EventService, SearchService, UserService};

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub users: UserService,
    pub events: EventService,
    pub search: SearchService,
}

impl AppState {
    pub fn new(db_pool: DbPool, config: &Config) -> Self {
        let password_policy = PasswordPolicy::new(config.security.min_password_length);

        Self {
            users: UserService::new(
                db_pool.clone(),
                password_policy,
                config.security.password_hash_cost,
            ),
            events: EventService::new(db_pool.clone()),
            search: SearchService::new(db_pool.clone()),
            db_pool,
        }
    }
}

pub fn create_router(state: AppState, config: &config::Config) -> Router {
    let cors = build_cors_layer(config);
    let body_limit = RequestBodyLimitLayer::new(config.server.max_body_size);

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::ready_check))
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/search", get(handlers::search::search))
        .with_state(state.clone());

    let event_routes = Router::new()
        .route("/events", post(handlers::events::create_event))
        .route("/events/organized", get(handlers::events::list_organized))
        .route("/events/invited", get(handlers::events::list_invited))
        .route("/events/{id}", delete(handlers::events::delete_event))
        .route("/events/{id}/invite", post(handlers::events::invite))
        .route("/events/{id}/attendees", get(handlers::events::list_attendees))
        .route("/events/{id}/attendance", put(handlers::events::set_attendance))
        .route("/events/{id}/accept", put(handlers::events::accept_invite))
        .route("/events/{id}/tasks", post(handlers::events::create_task))
        .route_layer(axum_middleware::from_fn(require_identity))
        .with_state(state);

    Router::new()
        .merge(openapi::swagger_router())
        .merge(public_routes)
        .merge(event_routes)
        .fallback(fallback_handler)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(timeout)
        .layer(body_limit)
        .layer(cors)
}

async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not found", "code": "NOT_FOUND"})),
    )
}

fn build_cors_layer(config: &config::Config) -> CorsLayer {
    use axum::http::header::HeaderName;
    use axum::http::{HeaderValue, Method};

    let is_wildcard_origin = config.cors.allowed_origins.is_empty()
        || config.cors.allowed_origins.iter().any(|o| o == "*");

    let methods: Vec<Method> = config
        .cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = config
        .cors
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = match (is_wildcard_origin, config.cors.allow_credentials) {
        // Credentials cannot be combined with `*`, so echo the caller's origin.
        (true, true) => CorsLayer::new().allow_origin(tower_http::cors::AllowOrigin::mirror_request()),
        (true, false) => CorsLayer::new().allow_origin(Any),
        (false, _) => CorsLayer::new().allow_origin(origins),
    };

    cors.allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.cors.allow_credentials)
        .max_age(Duration::from_secs(config.cors.max_age_secs))
}

/// Sets `statement_timeout` once when the pool opens a connection; it holds for the session.
#[derive(Debug, Clone, Copy)]
struct StatementTimeout {
    millis: u64,
}

impl CustomizeConnection<PgConnection, r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        diesel::sql_query(format!("SET statement_timeout = {}", self.millis))
            .execute(conn)
            .map(|_| ())
            .map_err(r2d2::Error::QueryError)
    }
}

fn pool_builder(config: &config::Config) -> r2d2::Builder<ConnectionManager<PgConnection>> {
    r2d2::Pool::builder()
        .max_size(config.database.max_connections)
        .min_idle(Some(config.database.min_connections))
        .connection_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.database.idle_timeout_secs)))
        .connection_customizer(Box::new(StatementTimeout {
            millis: config.database.statement_timeout_ms,
        }))
}

/// Builds the pool and opens `min_connections` eagerly, failing if the database is unreachable.
pub fn create_db_pool(config: &config::Config) -> Result<DbPool, r2d2::PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(&config.database.url);
    pool_builder(config).build(manager)
}

/// Builds the pool without connecting. Connections are opened on first use.
pub fn create_lazy_db_pool(config: &config::Config) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(&config.database.url);
    pool_builder(config).build_unchecked(manager)
}

pub fn init_tracing(config: &config::Config) {
    telemetry::init_telemetry(config);
}

pub use config::Config;
