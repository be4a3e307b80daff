//! Integration tests for registration, login, and sessions.
//!
//! These tests require a running site (`cargo run -p tradepost-site`) against
//! a scratch database. Run with `cargo test -- --ignored`.

use reqwest::StatusCode;

use tradepost_integration_tests::{base_url, client, register, unique_email};

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_health() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach health endpoint");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_register_login_logout() {
    let client = client();
    let base_url = base_url();
    let email = unique_email("walk");

    register(&client, "walker", &email, "hunter2hunter2").await;

    // Registration leaves us logged in
    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read dashboard");
    assert!(body.contains("walker"));
    assert!(body.contains(&email));

    // Logout drops the session; dashboard now bounces to the login page
    let resp = client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert!(resp.status().is_success() || resp.status().is_redirection());

    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to load dashboard after logout");
    assert!(resp.url().path().starts_with("/auth/login"));

    // And log back in
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", "hunter2hunter2")])
        .send()
        .await
        .expect("Failed to login");
    assert!(resp.status().is_success() || resp.status().is_redirection());

    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to load dashboard after login");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_login_wrong_password() {
    let client = client();
    let base_url = base_url();
    let email = unique_email("wrongpw");

    register(&client, "wrongpw", &email, "hunter2hunter2").await;
    client
        .post(format!("{base_url}/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", "not-the-password")])
        .send()
        .await
        .expect("Failed to post login");

    // Bounced back to the login page with a flash, not logged in
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("flash-error"));

    let resp = client
        .get(format!("{base_url}/dashboard"))
        .send()
        .await
        .expect("Failed to load dashboard");
    assert!(resp.url().path().starts_with("/auth/login"));
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_register_duplicate_email() {
    let first = client();
    let base_url = base_url();
    let email = unique_email("dup");

    register(&first, "original", &email, "hunter2hunter2").await;

    let second = client();
    let resp = second
        .post(format!("{base_url}/auth/register"))
        .form(&[
            ("username", "copycat"),
            ("email", email.as_str()),
            ("password", "hunter2hunter2"),
            ("password_confirm", "hunter2hunter2"),
        ])
        .send()
        .await
        .expect("Failed to post register");

    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("flash-error"));
}
