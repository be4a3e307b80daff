//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Browse listings (search + category filter)
//! GET  /health                 - Health check
//!
//! # Listings
//! GET  /listings               - Browse listings (same as /)
//! GET  /listings/new           - New listing form
//! POST /listings               - Create listing (multipart, optional image)
//! GET  /listings/{id}          - Listing detail
//! GET  /listings/{id}/edit     - Edit listing form
//! POST /listings/{id}          - Update listing (multipart)
//! POST /listings/{id}/delete   - Delete listing
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart page with live total
//! POST /cart/add               - Add listing to cart
//! POST /cart/update            - Set entry quantity (0 removes)
//! POST /cart/remove            - Remove entry
//! POST /cart/clear             - Empty the cart
//! POST /cart/checkout          - Convert cart into a purchase
//!
//! # Purchases (requires auth)
//! GET  /purchases              - Purchase history
//! GET  /purchases/{id}         - Purchase details (line items)
//! GET  /sales                  - Items sold by the current user
//!
//! # Dashboard (requires auth)
//! GET  /dashboard              - Own listings + profile form
//! POST /dashboard/profile      - Update display name
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod listings;
pub mod purchases;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the listing routes router.
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listings::index).post(listings::create))
        .route("/new", get(listings::new))
        .route("/{id}", get(listings::show).post(listings::update))
        .route("/{id}/edit", get(listings::edit))
        .route("/{id}/delete", post(listings::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create the purchase routes router.
pub fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(purchases::history))
        .route("/{id}", get(purchases::details))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/profile", post(dashboard::update_profile))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page is the listing index
        .route("/", get(listings::index))
        .nest("/listings", listing_routes())
        .nest("/cart", cart_routes())
        .nest("/purchases", purchase_routes())
        .route("/sales", get(purchases::sales))
        .nest("/dashboard", dashboard_routes())
        .nest("/auth", auth_routes())
}
