//! HTTP API server with observability for the conference backend.
//!
//! Provides REST endpoints for conferences, profiles, sessions and the
//! derived caches, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    use routes::{conference, profile, session};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/conference", post(conference::create))
        .route("/conference/announcement", get(conference::announcement))
        .route("/conference/{key}", get(conference::get).put(conference::update))
        .route(
            "/conference/{key}/registration",
            post(conference::register).delete(conference::unregister),
        )
        .route(
            "/conference/{key}/sessions",
            get(session::by_conference).post(session::create),
        )
        .route(
            "/conference/{key}/sessions/type/{type}",
            get(session::by_conference_and_type),
        )
        .route("/conferences/query", post(conference::query))
        .route("/conferences/created", get(conference::created))
        .route("/conferences/attending", get(conference::attending))
        .route("/conferences/topics", get(conference::matching_topics))
        .route("/profile", get(profile::get).post(profile::save))
        .route(
            "/profile/topics/{topic}",
            post(profile::add_topic).delete(profile::remove_topic),
        )
        .route("/wishlist", get(session::wishlist))
        .route(
            "/wishlist/{key}",
            post(session::add_to_wishlist).delete(session::remove_from_wishlist),
        )
        .route("/sessions/speaker/{speaker}", get(session::by_speaker))
        .route("/sessions/finished", get(session::finished))
        .route(
            "/sessions/non-workshops-before-seven",
            get(session::non_workshops_before_seven),
        )
        .route("/speaker/featured", get(session::featured_speaker))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
