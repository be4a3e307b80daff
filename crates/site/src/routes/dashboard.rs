//! Dashboard route handlers: the user's own listings and profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, Flash, ListingFilter, ListingSummary, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: String,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub user: User,
    pub listings: Vec<ListingSummary>,
}

/// The user's own listings plus the profile form.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
) -> Result<DashboardTemplate> {
    let auth = AuthService::new(state.pool());
    let catalog = CatalogRepository::new(state.pool());

    let user = auth.get_user(current_user.id).await?;
    let listings = catalog
        .find(&ListingFilter {
            seller: Some(current_user.id),
            ..ListingFilter::default()
        })
        .await?;

    Ok(DashboardTemplate {
        current_user: Some(current_user),
        flash: Flash::take(&session).await,
        user,
        listings,
    })
}

/// Update the user's display name.
///
/// The session copy of the username is refreshed so the header reflects the
/// change immediately.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());

    match auth.update_profile(current_user.id, &form.username).await {
        Ok(()) => {
            let refreshed = CurrentUser {
                id: current_user.id,
                username: form.username.trim().to_owned(),
            };
            if let Err(e) = set_current_user(&session, &refreshed).await {
                tracing::error!("Failed to refresh session username: {}", e);
            }
            let _ = Flash::success("Profile updated").set(&session).await;
        }
        Err(AuthError::InvalidUsername(msg)) => {
            let _ = Flash::error(msg).set(&session).await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/dashboard").into_response())
}
