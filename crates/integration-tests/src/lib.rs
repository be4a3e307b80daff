//! Integration tests for Tradepost.
//!
//! The tests in `tests/` drive a running site over HTTP with `reqwest` and
//! assert on the rendered HTML. They are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the site against a scratch database
//! TRADEPOST_DATABASE_URL=sqlite://it.db?mode=rwc cargo run -p tradepost-site
//!
//! # Run integration tests
//! cargo test -p tradepost-integration-tests -- --ignored
//! ```
//!
//! `TRADEPOST_BASE_URL` points the tests at a non-default host.

use reqwest::Client;
use uuid::Uuid;

/// Base URL for the site (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("TRADEPOST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A client with a cookie store, so the session survives across requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email so repeated runs don't collide on the unique constraint.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@tradepost.test", Uuid::new_v4())
}

/// Register a fresh account and leave the client logged in.
///
/// # Panics
///
/// Panics if the register request fails or is rejected.
pub async fn register(client: &Client, username: &str, email: &str, password: &str) {
    let base_url = base_url();
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&[
            ("username", username),
            ("email", email),
            ("password", password),
            ("password_confirm", password),
        ])
        .send()
        .await
        .expect("Failed to register");

    assert!(
        resp.status().is_success() || resp.status().is_redirection(),
        "register rejected: {}",
        resp.status()
    );
}
