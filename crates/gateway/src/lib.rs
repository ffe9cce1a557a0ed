//! Gateway: HTTP surface for Vermietertools authentication.
//!
//! Lifecycle:
//! 1. Open the SQLite database and run migrations
//! 2. Wire the stores into an `AuthService` held by `AppState`
//! 3. Serve the auth API, the gated pages, and `/health`
//! 4. Drain on Ctrl-C / SIGTERM and close the pool
//!
//! Session resolution happens once per request in `auth_middleware`; handlers
//! read the caller through the `CurrentIdentity` extractor.

pub mod api_error;
pub mod auth_middleware;
pub mod auth_routes;
pub mod pages;
pub mod server;
pub mod state;

pub use {
    auth_middleware::{CurrentIdentity, SESSION_COOKIE},
    server::{build_app, open_database, start_server},
    state::{AppState, CookiePolicy},
};
