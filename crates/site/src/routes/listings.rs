//! Listing route handlers.
//!
//! Browsing is public; creating, editing, and deleting require a logged-in
//! user and are scoped to the listing's seller.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use tradepost_core::{CategoryId, ListingId, Price};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Category, CurrentUser, Flash, ListingFilter, ListingSummary, NewListing};
use crate::services::uploads::UploadService;
use crate::state::AppState;

// =============================================================================
// Query and Form Types
// =============================================================================

/// Browse query parameters.
///
/// `category` arrives as a string because the "All categories" option
/// submits an empty value, which must not fail deserialization.
#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    /// Free-text search over title and description.
    pub q: Option<String>,
    /// Category filter.
    pub category: Option<String>,
}

impl BrowseQuery {
    fn category_id(&self) -> Option<CategoryId> {
        self.category
            .as_deref()
            .and_then(|c| c.parse::<i64>().ok())
            .map(CategoryId::new)
    }
}

/// Parsed multipart form for creating or updating a listing.
struct ListingForm {
    title: String,
    description: String,
    price: Price,
    category_id: CategoryId,
    /// Uploaded image, if a file was provided.
    image: Option<(String, Vec<u8>)>,
}

impl ListingForm {
    /// Read and validate a listing form from a multipart body.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut title = None;
        let mut description = None;
        let mut price = None;
        let mut category_id = None;
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };
            match name.as_str() {
                "title" => title = Some(read_text(field).await?),
                "description" => description = Some(read_text(field).await?),
                "price" => price = Some(read_text(field).await?),
                "category_id" => category_id = Some(read_text(field).await?),
                "image" => {
                    let filename = field.file_name().map(ToOwned::to_owned);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    // An empty file input still submits a field; skip it
                    if let Some(filename) = filename
                        && !bytes.is_empty()
                    {
                        image = Some((filename, bytes.to_vec()));
                    }
                }
                _ => {}
            }
        }

        let title = title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("title is required".to_owned()))?;
        let description = description.unwrap_or_default().trim().to_owned();
        let price = price
            .as_deref()
            .map(Price::parse)
            .transpose()
            .map_err(|e| AppError::BadRequest(format!("invalid price: {e}")))?
            .ok_or_else(|| AppError::BadRequest("price is required".to_owned()))?;
        let category_id = category_id
            .as_deref()
            .map(str::parse::<i64>)
            .transpose()
            .map_err(|_| AppError::BadRequest("invalid category".to_owned()))?
            .map(CategoryId::new)
            .ok_or_else(|| AppError::BadRequest("category is required".to_owned()))?;

        Ok(Self {
            title,
            description,
            price,
            category_id,
            image,
        })
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// =============================================================================
// Templates
// =============================================================================

/// Listing browse page template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/index.html")]
pub struct IndexTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub listings: Vec<ListingSummary>,
    pub categories: Vec<Category>,
    pub search: String,
    pub selected_category: Option<CategoryId>,
}

impl IndexTemplate {
    /// Whether `id` is the currently selected category filter.
    ///
    /// Takes a reference because template expressions are passed by
    /// reference inside `{% for %}` loops.
    fn is_selected(&self, id: &CategoryId) -> bool {
        self.selected_category.as_ref() == Some(id)
    }
}

/// Listing detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/show.html")]
pub struct ShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub listing: ListingSummary,
    pub is_owner: bool,
}

/// Listing create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/form.html")]
pub struct FormTemplate {
    pub current_user: Option<CurrentUser>,
    pub flash: Option<Flash>,
    pub categories: Vec<Category>,
    /// Existing listing when editing, `None` when creating.
    pub listing: Option<ListingSummary>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Browse listings with optional search and category filter.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
    Query(query): Query<BrowseQuery>,
) -> Result<IndexTemplate> {
    let catalog = CatalogRepository::new(state.pool());

    let filter = ListingFilter {
        search: query.q.clone(),
        category: query.category_id(),
        seller: None,
    };
    let listings = catalog.find(&filter).await?;
    let categories = catalog.categories().await?;

    Ok(IndexTemplate {
        current_user,
        flash: Flash::take(&session).await,
        listings,
        categories,
        search: query.q.unwrap_or_default(),
        selected_category: filter.category,
    })
}

/// Listing detail page.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(current_user): OptionalAuth,
    session: Session,
    Path(id): Path<i64>,
) -> Result<ShowTemplate> {
    let catalog = CatalogRepository::new(state.pool());

    let listing = catalog
        .get(ListingId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("listing {id}")))?;

    let is_owner = current_user
        .as_ref()
        .is_some_and(|u| u.id == listing.seller_id);

    Ok(ShowTemplate {
        current_user,
        flash: Flash::take(&session).await,
        listing,
        is_owner,
    })
}

/// New listing form.
pub async fn new(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
) -> Result<FormTemplate> {
    let catalog = CatalogRepository::new(state.pool());
    let categories = catalog.categories().await?;

    Ok(FormTemplate {
        current_user: Some(current_user),
        flash: Flash::take(&session).await,
        categories,
        listing: None,
    })
}

/// Create a listing from a multipart form.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let form = ListingForm::from_multipart(multipart).await?;

    let image_ref = match form.image {
        Some((filename, bytes)) => {
            let uploads = UploadService::new(&state.config().upload_dir);
            Some(uploads.save(&filename, &bytes).await?)
        }
        None => None,
    };

    let catalog = CatalogRepository::new(state.pool());
    let id = catalog
        .create(
            current_user.id,
            &NewListing {
                title: form.title,
                description: form.description,
                price: form.price,
                category_id: form.category_id,
                image_ref,
            },
        )
        .await?;

    tracing::info!(listing_id = %id, seller_id = %current_user.id, "listing created");
    let _ = Flash::success("Listing created").set(&session).await;
    Ok(Redirect::to(&format!("/listings/{id}")).into_response())
}

/// Edit listing form. Only the seller may open it.
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    Path(id): Path<i64>,
) -> Result<FormTemplate> {
    let catalog = CatalogRepository::new(state.pool());

    let listing = catalog
        .get(ListingId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("listing {id}")))?;
    if listing.seller_id != current_user.id {
        return Err(AppError::Store(crate::db::StoreError::Forbidden));
    }

    let categories = catalog.categories().await?;

    Ok(FormTemplate {
        current_user: Some(current_user),
        flash: Flash::take(&session).await,
        categories,
        listing: Some(listing),
    })
}

/// Update a listing from a multipart form. Only the seller may do this.
///
/// Ownership is checked before any file is written, so a non-owner's POST
/// leaves no trace in the upload directory. When a new image is uploaded
/// the old one is removed from disk after the update succeeds; if the
/// update fails the new file is removed again.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response> {
    let form = ListingForm::from_multipart(multipart).await?;
    let id = ListingId::new(id);

    let catalog = CatalogRepository::new(state.pool());
    let uploads = UploadService::new(&state.config().upload_dir);

    let existing = catalog
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("listing {id}")))?;
    if existing.seller_id != current_user.id {
        return Err(AppError::Store(crate::db::StoreError::Forbidden));
    }
    let previous_image = existing.image_ref;

    let image_ref = match form.image {
        Some((filename, bytes)) => Some(uploads.save(&filename, &bytes).await?),
        None => None,
    };
    let replaced_image = image_ref.is_some();

    let result = catalog
        .update(
            current_user.id,
            id,
            &NewListing {
                title: form.title,
                description: form.description,
                price: form.price,
                category_id: form.category_id,
                image_ref: image_ref.clone(),
            },
        )
        .await;

    if let Err(e) = result {
        // Don't leave the just-saved file orphaned
        if let Some(new_image) = image_ref {
            let _ = uploads.delete(&new_image).await;
        }
        return Err(e.into());
    }

    if replaced_image
        && let Some(old) = previous_image
        && let Err(e) = uploads.delete(&old).await
    {
        tracing::warn!("Failed to remove replaced image {old}: {e}");
    }

    let _ = Flash::success("Listing updated").set(&session).await;
    Ok(Redirect::to(&format!("/listings/{id}")).into_response())
}

/// Delete a listing. Only the seller may do this.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Response> {
    let catalog = CatalogRepository::new(state.pool());

    let image_ref = catalog.delete(current_user.id, ListingId::new(id)).await?;

    if let Some(image_ref) = image_ref {
        let uploads = UploadService::new(&state.config().upload_dir);
        if let Err(e) = uploads.delete(&image_ref).await {
            tracing::warn!("Failed to remove image {image_ref}: {e}");
        }
    }

    tracing::info!(listing_id = id, seller_id = %current_user.id, "listing deleted");
    let _ = Flash::success("Listing deleted").set(&session).await;
    Ok(Redirect::to("/dashboard").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn index_template(selected_category: Option<CategoryId>) -> IndexTemplate {
        IndexTemplate {
            current_user: None,
            flash: None,
            listings: Vec::new(),
            categories: vec![
                Category {
                    id: CategoryId::new(1),
                    name: "Electronics".to_owned(),
                },
                Category {
                    id: CategoryId::new(2),
                    name: "Books".to_owned(),
                },
            ],
            search: String::new(),
            selected_category,
        }
    }

    #[test]
    fn test_index_marks_selected_category() {
        let html = index_template(Some(CategoryId::new(2))).render().unwrap();

        assert!(html.contains(r#"value="2" selected"#));
        assert!(!html.contains(r#"value="1" selected"#));
    }

    #[test]
    fn test_index_without_category_filter() {
        let html = index_template(None).render().unwrap();

        assert!(!html.contains(" selected"));
        assert!(html.contains("Electronics"));
        assert!(html.contains("Books"));
    }
}
