//! Purchase history and seller sales route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;

use tradepost_core::PurchaseId;

use crate::db::PurchaseRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Flash, PurchaseSummary, PurchaseWithItems, SaleWithBuyer};
use crate::state::AppState;

/// Purchase history page template.
#[derive(Template, WebTemplate)]
#[template(path = "purchases/history.html")]
pub struct HistoryTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub purchases: Vec<PurchaseSummary>,
}

/// Purchase detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "purchases/details.html")]
pub struct DetailsTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub purchase: PurchaseWithItems,
}

/// Seller sales page template.
#[derive(Template, WebTemplate)]
#[template(path = "purchases/sales.html")]
pub struct SalesTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub sales: Vec<SaleWithBuyer>,
}

/// The current user's purchases, newest first.
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
) -> Result<HistoryTemplate> {
    let purchases = PurchaseRepository::new(state.pool());
    let list = purchases.history(current_user.id).await?;

    Ok(HistoryTemplate {
        current_user: Some(current_user),
        flash: Flash::take(&session).await,
        purchases: list,
    })
}

/// One purchase with its snapshotted line items.
///
/// Another user's purchase responds with 404, not 403, so purchase IDs leak
/// nothing about other accounts.
pub async fn details(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    Path(id): Path<i64>,
) -> Result<DetailsTemplate> {
    let purchases = PurchaseRepository::new(state.pool());
    let purchase = purchases
        .details(PurchaseId::new(id), current_user.id)
        .await?;

    Ok(DetailsTemplate {
        current_user: Some(current_user),
        flash: Flash::take(&session).await,
        purchase,
    })
}

/// Line items other users bought from the current user, newest first.
pub async fn sales(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
) -> Result<SalesTemplate> {
    let purchases = PurchaseRepository::new(state.pool());
    let list = purchases.seller_sales(current_user.id).await?;

    Ok(SalesTemplate {
        current_user: Some(current_user),
        flash: Flash::take(&session).await,
        sales: list,
    })
}
