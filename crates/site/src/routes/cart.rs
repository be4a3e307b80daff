//! Cart route handlers. All cart routes require a logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use tradepost_core::{CartEntryId, ListingId, Price};

use crate::db::{CartRepository, PurchaseRepository, StoreError};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CartItemWithListing, CurrentUser, Flash};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub listing_id: i64,
    /// Defaults to 1 when the form omits it.
    pub quantity: Option<i64>,
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub entry_id: i64,
    pub quantity: i64,
}

/// Entry removal form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub entry_id: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub items: Vec<CartItemWithListing>,
    pub total: Price,
}

// =============================================================================
// Handlers
// =============================================================================

/// Cart page with live prices and total.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
) -> Result<CartTemplate> {
    let cart = CartRepository::new(state.pool());

    let items = cart.items(current_user.id).await?;
    let total = cart.total(current_user.id).await?;

    Ok(CartTemplate {
        current_user: Some(current_user),
        flash: Flash::take(&session).await,
        items,
        total,
    })
}

/// Add a listing to the cart. Repeated adds merge additively.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    Form(form): Form<AddForm>,
) -> Result<Response> {
    let cart = CartRepository::new(state.pool());
    let quantity = form.quantity.unwrap_or(1);

    match cart
        .add_item(current_user.id, ListingId::new(form.listing_id), quantity)
        .await
    {
        Ok(()) => {
            let _ = Flash::success("Added to cart").set(&session).await;
        }
        Err(StoreError::InvalidOperation(msg)) => {
            let _ = Flash::error(msg).set(&session).await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/cart").into_response())
}

/// Set an entry's quantity. Zero removes the entry.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    Form(form): Form<UpdateForm>,
) -> Result<Response> {
    let cart = CartRepository::new(state.pool());

    cart.set_quantity(
        current_user.id,
        CartEntryId::new(form.entry_id),
        form.quantity,
    )
    .await?;

    Ok(Redirect::to("/cart").into_response())
}

/// Remove an entry from the cart.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    Form(form): Form<RemoveForm>,
) -> Result<Response> {
    let cart = CartRepository::new(state.pool());

    cart.remove_item(current_user.id, CartEntryId::new(form.entry_id))
        .await?;

    Ok(Redirect::to("/cart").into_response())
}

/// Empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
) -> Result<Response> {
    let cart = CartRepository::new(state.pool());
    cart.clear(current_user.id).await?;

    Ok(Redirect::to("/cart").into_response())
}

/// Convert the cart into a purchase.
///
/// On success redirects to the new purchase's detail page. An empty cart or
/// a cart holding a since-deleted listing redirects back with an error flash
/// and leaves the cart untouched.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
) -> Result<Response> {
    let purchases = PurchaseRepository::new(state.pool());

    match purchases.checkout(current_user.id).await {
        Ok(purchase_id) => {
            tracing::info!(user_id = %current_user.id, purchase_id = %purchase_id, "checkout completed");
            let _ = Flash::success("Purchase completed").set(&session).await;
            Ok(Redirect::to(&format!("/purchases/{purchase_id}")).into_response())
        }
        Err(StoreError::EmptyCart) => {
            let _ = Flash::error("Your cart is empty").set(&session).await;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(StoreError::CheckoutFailed(msg)) => {
            tracing::warn!(user_id = %current_user.id, "checkout failed: {msg}");
            let _ = Flash::error(format!("Checkout failed: {msg}"))
                .set(&session)
                .await;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(e) => Err(e.into()),
    }
}
