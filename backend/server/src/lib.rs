//! Backend of a small symptom checker.
//!
//! A client sends free text describing how it feels, the server asks Gemini to
//! explain it in simple terms and appends which of the clinic's doctors to see.
//! Accounts are plain email/password with a one hour session token.
//!
//!
//!
//! # General Infrastructure
//! - Browser pages (or the `client` crate) talk to this server over JSON
//! - Server is stateless apart from the user store, any number of requests run concurrently
//! - Gemini and the user store are the only things a request waits on
//!
//!
//!
//! # Routes
//!
//! | Route | Body | Success |
//! |---|---|---|
//! | `POST /api/auth/signup` | `{name, email, password}` | 201 `{message}` |
//! | `POST /api/auth/login` | `{email, password}` | 200 `{message, token, user}` |
//! | `POST /api/chat` | `{symptom}` | 200 `{response}` |
//!
//! Auth failures answer `{message}`, chat failures answer `{error}`. See [`error::AppError`].
//!
//!
//!
//! # Notes
//!
//! ## Gaps
//! - No timeout on the Gemini call, a hung upstream holds its request open
//! - A missing `GEMINI_API_KEY` only shows up as failed chats, a missing `JWT_SECRET` as failed logins
//! - Redis being down only fails signups and logins, chat keeps working
//! - Tokens cannot be revoked, they simply expire
//!
//!
//!
//! # Setup
//!
//! Variables can also live in a `.env` file in the working directory.
//!
//! Run against a local Redis.
//! ```sh
//! REDIS_URL=redis://127.0.0.1/ JWT_SECRET=dev GEMINI_API_KEY=... cargo run
//! ```
//!
//! Log everything.
//! ```sh
//! RUST_LOG=debug cargo run
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::post,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use config::load_env_file;

pub mod auth;
pub mod chat;
pub mod config;
pub mod database;
pub mod doctors;
pub mod error;
pub mod gemini;
pub mod routes;
pub mod state;
pub mod user;
pub mod utils;

use routes::{chat_handler, login_handler, signup_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/chat", post(chat_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    load_env_file();

    info!("Initializing state...");
    let state = AppState::new().expect("Failed to initialize state");

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutting down...");
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
