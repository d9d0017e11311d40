//! Pet-friendly place map.
//!
//! # General Infrastructure
//! - A map frontend talks to this server; this server talks to the hosted
//!   place store (PostgREST rows, GoTrue identities)
//! - The store is never exposed to the frontend directly, so the anon key
//!   and the row shapes stay a backend concern
//! - Submitted places carry no coordinates; an external automation job
//!   geocodes pending rows out-of-band and the map picks them up on the
//!   next refresh
//!
//! # Auth
//! - Sign-in is a magic link: the identity service emails a one-time URL
//!   and nothing is authenticated at that point
//! - When the user comes back with the link's access token, the session
//!   switches to signed-in and stays until sign-out
//!
//! # Configuration
//! - `PETMAP_STORE_URL` and `PETMAP_STORE_ANON_KEY` point at the store; a
//!   missing value is logged at startup and requests fail until it is set
//! - `PETMAP_PORT` defaults to 3000

use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod markers;
pub mod routes;
pub mod session;
pub mod state;

use routes::{
    login_handler, logout_handler, markers_handler, places_handler, refresh_handler,
    session_handler, submit_handler, user_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/places", get(places_handler))
        .route("/places/refresh", post(refresh_handler))
        .route("/markers", get(markers_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/session", post(session_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/user", get(user_handler))
        .route("/submissions", post(submit_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
