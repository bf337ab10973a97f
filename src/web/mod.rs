//! HTTP surface.
//!
//! JSON design/order API plus the form login, all behind the access-control
//! middleware in [`guard`].

pub mod design;
pub mod error;
pub mod guard;
pub mod login;
pub mod orders;

pub use error::ApiError;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::security::{AccessPolicy, SessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub sessions: SessionStore,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(conn: Connection, config: &Config) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            sessions: SessionStore::new(config.session_ttl()),
            policy: Arc::new(AccessPolicy::default()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/design", post(design::post_taco))
        .route("/design/recent", get(design::recent_tacos))
        .route("/ingredients", get(design::all_ingredients))
        .route("/orders", post(orders::post_order))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(home))
        .route("/login", get(login::login_form).post(login::login))
        .route("/logout", post(login::logout))
        .merge(api)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    guard::enforce_access,
                )),
        )
        .with_state(state)
}

/// 302 Found to `location`
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// GET / - banner
async fn home() -> &'static str {
    "Taco Cloud"
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
